//! Supabase backend client
//!
//! Auth goes through the GoTrue endpoints under `/auth/v1`; rows live in
//! three PostgREST tables under `/rest/v1`. Every row request carries the
//! project's anon key as `apikey` and the user's access token as the bearer,
//! so row-level security scopes reads and writes to the signed-in user.

use super::error::BackendError;
use crate::config::BackendConfig;
use crate::model::account::{
    Collection, CollectionEntry, NewCollection, NewCollectionEntry, NewFavorite, Session,
    TokenResponse, User,
};
use crate::model::card::Card;
use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Auth and row storage for favorites and collections
pub trait Backend: Send + Sync {
    /// Register a new account; `None` when the account still needs email
    /// confirmation before it can sign in
    fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, BackendError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;
    fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError>;
    fn sign_out(&self, session: &Session) -> Result<(), BackendError>;
    fn get_user(&self, session: &Session) -> Result<User, BackendError>;

    fn list_favorite_ids(&self, session: &Session) -> Result<Vec<String>, BackendError>;
    /// Favorited cards, most recently favorited first
    fn list_favorite_cards(&self, session: &Session) -> Result<Vec<Card>, BackendError>;
    fn add_favorite(&self, session: &Session, card: &Card) -> Result<(), BackendError>;
    fn remove_favorite(&self, session: &Session, card_id: &str) -> Result<(), BackendError>;

    /// The user's collections, newest first
    fn list_collections(&self, session: &Session) -> Result<Vec<Collection>, BackendError>;
    fn create_collection(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> Result<Collection, BackendError>;
    /// Delete a collection; its entries are removed by the backend with it
    fn delete_collection(&self, session: &Session, collection_id: &str)
        -> Result<(), BackendError>;

    fn list_collection_entries(
        &self,
        session: &Session,
        collection_id: &str,
    ) -> Result<Vec<CollectionEntry>, BackendError>;
    fn find_collection_entry(
        &self,
        session: &Session,
        collection_id: &str,
        card_id: &str,
    ) -> Result<Option<CollectionEntry>, BackendError>;
    fn insert_collection_entry(
        &self,
        session: &Session,
        collection_id: &str,
        card: &Card,
        quantity: u32,
    ) -> Result<CollectionEntry, BackendError>;
    /// Set an entry's quantity; `Rejected` when no entry was updated
    fn update_entry_quantity(
        &self,
        session: &Session,
        entry_id: &str,
        quantity: u32,
    ) -> Result<(), BackendError>;
    fn remove_collection_entry(&self, session: &Session, entry_id: &str)
        -> Result<(), BackendError>;
}

#[derive(Deserialize)]
struct CardDataRow {
    card_data: Card,
}

#[derive(Deserialize)]
struct CardIdRow {
    card_id: String,
}

/// HTTP client for a Supabase project
pub struct SupabaseClient {
    client: Client,
    config: BackendConfig,
}

impl SupabaseClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, path)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    /// Attach `apikey` and a bearer (user token, or the anon key)
    fn authorize(&self, request: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
        let token = session
            .map(|s| s.access_token.as_str())
            .unwrap_or(self.config.anon_key.as_str());
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
    }

    fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(rejection(status.as_u16(), &body))
        }
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let body = self.send(request)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn select<T: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let request = self.client.get(self.table_url(table)).query(query);
        self.send_json(self.authorize(request, Some(session)))
    }

    fn insert<T: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        row: &impl serde::Serialize,
    ) -> Result<T, BackendError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let rows: Vec<T> = self.send_json(self.authorize(request, Some(session)))?;
        rows.into_iter().next().ok_or_else(|| BackendError::Rejected {
            status: 200,
            message: format!("insert into {} returned no row", table),
        })
    }

    fn delete(
        &self,
        session: &Session,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<(), BackendError> {
        let request = self.client.delete(self.table_url(table)).query(query);
        self.send(self.authorize(request, Some(session)))?;
        Ok(())
    }

    fn token_grant(&self, grant_type: &str, body: Value) -> Result<Session, BackendError> {
        let request = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let token: TokenResponse = self.send_json(self.authorize(request, None))?;
        Ok(token.into_session(Utc::now()))
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Build a `Rejected` error from an error body
///
/// GoTrue and PostgREST disagree on field names, so take the first one
/// present.
fn rejection(status: u16, body: &str) -> BackendError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string());

    BackendError::Rejected { status, message }
}

/// Sign-up answers with a session when the project auto-confirms, and with
/// the bare user otherwise
fn parse_sign_up(body: &str) -> Result<Option<Session>, BackendError> {
    let value: Value = serde_json::from_str(body)?;
    if value.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(value)?;
        Ok(Some(token.into_session(Utc::now())))
    } else {
        Ok(None)
    }
}

impl Backend for SupabaseClient {
    fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, BackendError> {
        let request = self
            .client
            .post(self.auth_url("signup"))
            .json(&json!({ "email": email, "password": password }));
        let body = self.send(self.authorize(request, None))?;
        parse_sign_up(&body)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
    }

    fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
    }

    fn sign_out(&self, session: &Session) -> Result<(), BackendError> {
        let request = self.client.post(self.auth_url("logout"));
        self.send(self.authorize(request, Some(session)))?;
        Ok(())
    }

    fn get_user(&self, session: &Session) -> Result<User, BackendError> {
        let request = self.client.get(self.auth_url("user"));
        self.send_json(self.authorize(request, Some(session)))
    }

    fn list_favorite_ids(&self, session: &Session) -> Result<Vec<String>, BackendError> {
        let rows: Vec<CardIdRow> = self.select(
            session,
            "favorites",
            &[
                ("select", "card_id".to_string()),
                ("user_id", eq(session.user_id())),
            ],
        )?;
        Ok(rows.into_iter().map(|r| r.card_id).collect())
    }

    fn list_favorite_cards(&self, session: &Session) -> Result<Vec<Card>, BackendError> {
        let rows: Vec<CardDataRow> = self.select(
            session,
            "favorites",
            &[
                ("select", "card_data".to_string()),
                ("user_id", eq(session.user_id())),
                ("order", "created_at.desc".to_string()),
            ],
        )?;
        Ok(rows.into_iter().map(|r| r.card_data).collect())
    }

    fn add_favorite(&self, session: &Session, card: &Card) -> Result<(), BackendError> {
        let row = NewFavorite {
            user_id: session.user_id(),
            card_id: &card.id,
            card_data: card,
        };
        let _: Value = self.insert(session, "favorites", &row)?;
        Ok(())
    }

    fn remove_favorite(&self, session: &Session, card_id: &str) -> Result<(), BackendError> {
        self.delete(
            session,
            "favorites",
            &[("user_id", eq(session.user_id())), ("card_id", eq(card_id))],
        )
    }

    fn list_collections(&self, session: &Session) -> Result<Vec<Collection>, BackendError> {
        self.select(
            session,
            "collections",
            &[
                ("select", "*".to_string()),
                ("user_id", eq(session.user_id())),
                ("order", "created_at.desc".to_string()),
            ],
        )
    }

    fn create_collection(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> Result<Collection, BackendError> {
        let row = NewCollection {
            user_id: session.user_id(),
            name,
            description,
        };
        self.insert(session, "collections", &row)
    }

    fn delete_collection(
        &self,
        session: &Session,
        collection_id: &str,
    ) -> Result<(), BackendError> {
        // Entries go with the row through the foreign key's ON DELETE CASCADE
        self.delete(
            session,
            "collections",
            &[("id", eq(collection_id)), ("user_id", eq(session.user_id()))],
        )
    }

    fn list_collection_entries(
        &self,
        session: &Session,
        collection_id: &str,
    ) -> Result<Vec<CollectionEntry>, BackendError> {
        self.select(
            session,
            "collection_cards",
            &[
                ("select", "*".to_string()),
                ("collection_id", eq(collection_id)),
                ("order", "added_at.desc".to_string()),
            ],
        )
    }

    fn find_collection_entry(
        &self,
        session: &Session,
        collection_id: &str,
        card_id: &str,
    ) -> Result<Option<CollectionEntry>, BackendError> {
        let rows: Vec<CollectionEntry> = self.select(
            session,
            "collection_cards",
            &[
                ("select", "*".to_string()),
                ("collection_id", eq(collection_id)),
                ("card_id", eq(card_id)),
                ("limit", "1".to_string()),
            ],
        )?;
        Ok(rows.into_iter().next())
    }

    fn insert_collection_entry(
        &self,
        session: &Session,
        collection_id: &str,
        card: &Card,
        quantity: u32,
    ) -> Result<CollectionEntry, BackendError> {
        let row = NewCollectionEntry {
            collection_id,
            card_id: &card.id,
            card_data: card,
            quantity,
        };
        self.insert(session, "collection_cards", &row)
    }

    fn update_entry_quantity(
        &self,
        session: &Session,
        entry_id: &str,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let request = self
            .client
            .patch(self.table_url("collection_cards"))
            .query(&[("id", eq(entry_id))])
            .header("Prefer", "return=representation")
            .json(&json!({ "quantity": quantity }));
        // PostgREST answers 200 with no rows when the filter matched nothing
        // or row-level security hid the entry
        let rows: Vec<Value> = self.send_json(self.authorize(request, Some(session)))?;
        if rows.is_empty() {
            return Err(BackendError::Rejected {
                status: 404,
                message: format!("no collection entry {}", entry_id),
            });
        }
        Ok(())
    }

    fn remove_collection_entry(
        &self,
        session: &Session,
        entry_id: &str,
    ) -> Result<(), BackendError> {
        self.delete(session, "collection_cards", &[("id", eq(entry_id))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::thread;

    /// Serve one canned `(status, body)` per connection, in order, and record
    /// each request line as `METHOD /path?query`
    fn serve(responses: Vec<(u16, &'static str)>) -> (SupabaseClient, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for (status, body) in responses {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                let mut reader = BufReader::new(stream);
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let mut parts = line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let target = parts.next().unwrap_or_default().to_string();
                seen.lock().unwrap().push(format!("{} {}", method, target));

                let mut content_length = 0;
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    let header = header.trim_end();
                    if header.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = header.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap_or(0);
                        }
                    }
                }
                let mut request_body = vec![0; content_length];
                reader.read_exact(&mut request_body).unwrap();

                let mut stream = reader.into_inner();
                let response = format!(
                    "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        let client = SupabaseClient::new(BackendConfig {
            url,
            anon_key: "anon".to_string(),
        });
        (client, requests)
    }

    fn session() -> Session {
        Session {
            access_token: "tok".to_string(),
            refresh_token: "ref".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user: User {
                id: "u-1".to_string(),
                email: Some("misty@example.com".to_string()),
            },
        }
    }

    #[test]
    fn test_delete_collection_is_a_single_request() {
        let (client, requests) = serve(vec![(204, "")]);
        client.delete_collection(&session(), "c-1").unwrap();

        assert_eq!(
            *requests.lock().unwrap(),
            vec!["DELETE /rest/v1/collections?id=eq.c-1&user_id=eq.u-1".to_string()]
        );
    }

    #[test]
    fn test_rejected_delete_touches_nothing_else() {
        let (client, requests) =
            serve(vec![(403, r#"{"code":"42501","message":"permission denied for table collections"}"#)]);
        let err = client.delete_collection(&session(), "c-1").unwrap_err();

        assert!(matches!(err, BackendError::Rejected { status: 403, .. }));
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_quantity_update_of_missing_entry_is_rejected() {
        let (client, requests) = serve(vec![(200, "[]")]);
        let err = client.update_entry_quantity(&session(), "e-9", 3).unwrap_err();

        assert!(matches!(err, BackendError::Rejected { status: 404, .. }));
        assert_eq!(
            *requests.lock().unwrap(),
            vec!["PATCH /rest/v1/collection_cards?id=eq.e-9".to_string()]
        );
    }

    #[test]
    fn test_quantity_update_returns_ok_with_row() {
        let (client, _) = serve(vec![(200, r#"[{"id":"e-1","quantity":3}]"#)]);
        client.update_entry_quantity(&session(), "e-1", 3).unwrap();
    }

    #[test]
    fn test_rejection_reads_gotrue_and_postgrest_bodies() {
        let err = rejection(400, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#);
        assert!(matches!(
            err,
            BackendError::Rejected { status: 400, ref message } if message == "Invalid login credentials"
        ));

        let err = rejection(
            409,
            r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#,
        );
        assert!(matches!(
            err,
            BackendError::Rejected { status: 409, ref message } if message.starts_with("duplicate key")
        ));

        let err = rejection(502, "Bad Gateway\n");
        assert!(matches!(
            err,
            BackendError::Rejected { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn test_sign_up_with_confirmation_pending() {
        let body = r#"{ "id": "u-1", "email": "misty@example.com", "confirmation_sent_at": "2024-05-01T12:00:00Z" }"#;
        assert!(parse_sign_up(body).unwrap().is_none());
    }

    #[test]
    fn test_sign_up_with_session() {
        let body = r#"{
            "access_token": "tok",
            "refresh_token": "ref",
            "expires_in": 3600,
            "user": { "id": "u-1", "email": "misty@example.com" }
        }"#;
        let session = parse_sign_up(body).unwrap().unwrap();
        assert_eq!(session.user_id(), "u-1");
        assert_eq!(session.access_token, "tok");
    }

    #[test]
    fn test_card_data_rows_decode() {
        let card = crate::model::card::sample_card("base1-58", "Pikachu");
        let body = serde_json::to_string(&json!([{ "card_data": card }])).unwrap();
        let rows: Vec<CardDataRow> = serde_json::from_str(&body).unwrap();
        assert_eq!(rows[0].card_data, card);
    }
}
