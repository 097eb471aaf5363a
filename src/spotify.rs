//! Spotify Web API client for track search and artist lookup.
//!
//! Authenticates with the client-credentials flow. The access token is cached
//! and refreshed shortly before it expires.

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::cell::RefCell;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::catalog::{CatalogError, MusicCatalog};
use crate::models::{RemoteArtist, RemoteTrack};

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<RemoteTrack>,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

pub struct SpotifyClient {
    client: Client,
    credentials: Credentials,
    api_base: String,
    token_url: String,
    token: RefCell<Option<AccessToken>>,
}

impl SpotifyClient {
    pub fn new(credentials: Credentials) -> Result<Self, CatalogError> {
        Self::with_endpoints(credentials, SPOTIFY_API_BASE, SPOTIFY_TOKEN_URL)
    }

    /// Client against explicit API and token endpoints, e.g. a local mock.
    pub fn with_endpoints(
        credentials: Credentials,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            credentials,
            api_base: api_base.into(),
            token_url: token_url.into(),
            token: RefCell::new(None),
        })
    }

    /// Build the client and fetch a first token so bad credentials fail fast.
    pub fn connect(credentials: Credentials) -> Result<Self, CatalogError> {
        let client = Self::new(credentials)?;
        client.authenticate()?;
        info!("Spotify authentication configured");
        Ok(client)
    }

    /// Ensure a valid access token is cached, requesting one if needed.
    pub fn authenticate(&self) -> Result<(), CatalogError> {
        self.access_token().map(|_| ())
    }

    fn request_token(&self) -> Result<AccessToken, CatalogError> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(CatalogError::Auth(format!("{}: {}", status, body.trim())));
        }

        let token: TokenResponse = response.json()?;
        debug!(expires_in = token.expires_in, "Obtained Spotify access token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        Ok(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.token.borrow_mut();
        match cached.as_ref() {
            Some(token) if Instant::now() < token.expires_at => Ok(token.value.clone()),
            _ => {
                let token = self.request_token()?;
                let value = token.value.clone();
                *cached = Some(token);
                Ok(value)
            }
        }
    }

    fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Response, CatalogError> {
        let token = self.access_token()?;
        let url = format!("{}/{}", self.api_base, endpoint);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(CatalogError::NotFound(endpoint.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

/// Spotify field-filter query for an artist + title pair.
pub fn search_query(artist: &str, title: &str) -> String {
    format!("artist:{} track:{}", artist, title)
}

impl MusicCatalog for SpotifyClient {
    fn search_track(&self, artist: &str, title: &str) -> Result<Option<RemoteTrack>, CatalogError> {
        let query = search_query(artist, title);
        let response = self.get("search", &[("q", query.as_str()), ("type", "track"), ("limit", "1")])?;
        let body: SearchResponse = response.json()?;
        Ok(first_track(body))
    }

    fn artist(&self, id: &str) -> Result<RemoteArtist, CatalogError> {
        let response = self.get(&format!("artists/{}", id), &[])?;
        Ok(response.json()?)
    }
}

fn first_track(body: SearchResponse) -> Option<RemoteTrack> {
    body.tracks.and_then(|page| page.items.into_iter().next())
}
