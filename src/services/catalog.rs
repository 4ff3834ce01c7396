//! Pokémon TCG catalog client
//!
//! Thin blocking wrapper over the public card-search REST API. Every call is
//! a single GET; there is no caching, retry, or backoff.

use super::error::ApiError;
use crate::model::card::{Card, CardPage, CardSet, DataEnvelope};
use crate::model::search::SearchParams;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Read-only access to the card catalog
pub trait CardCatalog: Send + Sync {
    fn search_cards(&self, params: &SearchParams) -> Result<CardPage, ApiError>;
    fn get_card(&self, id: &str) -> Result<Card, ApiError>;
    fn get_sets(&self) -> Result<Vec<CardSet>, ApiError>;
    fn get_types(&self) -> Result<Vec<String>, ApiError>;
    fn get_subtypes(&self) -> Result<Vec<String>, ApiError>;
    fn get_rarities(&self) -> Result<Vec<String>, ApiError>;
}

/// HTTP client for `api.pokemontcg.io`
pub struct PokemonTcgClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PokemonTcgClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => request.header("X-Api-Key", key),
            None => request,
        }
    }

    fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn fetch_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let envelope: DataEnvelope<T> = self.fetch(self.get(path))?;
        Ok(envelope.data)
    }
}

/// Query-string pairs for `/cards`
pub fn search_query(params: &SearchParams) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", params.effective_page().to_string()),
        ("pageSize", params.effective_page_size().to_string()),
    ];
    if let Some(q) = params.query_expression() {
        query.push(("q", q));
    }
    query
}

impl CardCatalog for PokemonTcgClient {
    fn search_cards(&self, params: &SearchParams) -> Result<CardPage, ApiError> {
        let query = search_query(params);
        log::debug!("GET /cards {:?}", query);
        self.fetch(self.get("/cards").query(&query))
    }

    fn get_card(&self, id: &str) -> Result<Card, ApiError> {
        self.fetch_data(&format!("/cards/{}", id))
    }

    fn get_sets(&self) -> Result<Vec<CardSet>, ApiError> {
        self.fetch_data("/sets")
    }

    fn get_types(&self) -> Result<Vec<String>, ApiError> {
        self.fetch_data("/types")
    }

    fn get_subtypes(&self) -> Result<Vec<String>, ApiError> {
        self.fetch_data("/subtypes")
    }

    fn get_rarities(&self) -> Result<Vec<String>, ApiError> {
        self.fetch_data("/rarities")
    }
}
