//! Backend rows and auth session models

use super::card::Card;
use crate::config::Config;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Authenticated user as returned by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> &str {
        self.user.email.as_deref().unwrap_or("")
    }

    /// Whether the access token has passed its expiry, with a small margin
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(30) >= self.expires_at
    }

    fn session_path() -> Option<PathBuf> {
        Config::config_dir().map(|dir| dir.join("session.json"))
    }

    /// Load the persisted session, if any
    pub fn load() -> Option<Session> {
        let path = Self::session_path()?;
        let contents = fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Persist the session so the next launch can restore it
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Config::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let path = Self::session_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine session path"))?;
        self.save_to(&path)
    }

    /// Write the session to `path`, readable by the owner only
    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        write_private(path, serde_json::to_string_pretty(self)?.as_bytes())
    }

    /// Forget the persisted session
    pub fn clear_saved() {
        if let Some(path) = Self::session_path() {
            let _ = fs::remove_file(path);
        }
    }
}

/// Create or truncate `path` with mode 0600
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    fs::write(path, contents)?;
    Ok(())
}

/// Token response from the password grant and from sign-up
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    pub user: User,
}

impl TokenResponse {
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: now + Duration::seconds(self.expires_in),
            user: self.user,
        }
    }
}

/// Insert payload for `favorites`
#[derive(Debug, Serialize)]
pub struct NewFavorite<'a> {
    pub user_id: &'a str,
    pub card_id: &'a str,
    pub card_data: &'a Card,
}

/// A `collections` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Collection {
    pub fn description_or_default(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => "No description",
        }
    }

    pub fn formatted_created(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }
}

/// Insert payload for `collections`
#[derive(Debug, Serialize)]
pub struct NewCollection<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

/// A `collection_cards` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    pub collection_id: String,
    pub card_id: String,
    pub card_data: Card,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

/// Insert payload for `collection_cards`
#[derive(Debug, Serialize)]
pub struct NewCollectionEntry<'a> {
    pub collection_id: &'a str,
    pub card_id: &'a str,
    pub card_data: &'a Card,
    pub quantity: u32,
}
