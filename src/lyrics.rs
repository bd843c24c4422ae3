//! Client for the lyrics analysis service.
//!
//! Every endpoint answers either with its payload or with `{"error": "..."}`;
//! the latter becomes [`Error::Service`].

use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_LYRICS_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub count: u64,
    #[serde(default)]
    pub album_art: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
struct AlbumList {
    #[serde(default)]
    albums: Vec<Album>,
}

#[derive(Debug, Deserialize)]
struct WordCloud {
    wordcloud: String,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    artist: &'a str,
    album: &'a str,
    word: &'a str,
}

#[derive(Debug, Serialize)]
struct WordCloudRequest<'a> {
    artist: &'a str,
    album: &'a str,
}

pub struct LyricsClient {
    client: Client,
    base: Url,
}

impl LyricsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("pass-studio lyrics client")
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Albums released by `artist`.
    pub fn albums(&self, artist: &str) -> Result<Vec<Album>> {
        require("artist", artist)?;
        let url = self
            .base
            .join(&format!("api/artist/{}", urlencoding::encode(artist)))?;
        tracing::debug!(%url, "fetching albums");
        let response = self.client.get(url).send()?;
        let list: AlbumList = decode(response)?;
        Ok(list.albums)
    }

    /// How often `word` appears across the lyrics of `album`.
    pub fn analyze(&self, artist: &str, album: &str, word: &str) -> Result<WordCount> {
        require("artist", artist)?;
        require("album", album)?;
        require("word", word)?;
        let body = serde_json::to_string(&AnalyzeRequest { artist, album, word })?;
        let response = self.post("api/analyze", body)?;
        let count: WordCount = decode(response)?;
        tracing::debug!(artist, album, word, count = count.count, cached = count.cached, "word counted");
        Ok(count)
    }

    /// PNG bytes of the album's word cloud.
    pub fn wordcloud(&self, artist: &str, album: &str) -> Result<Vec<u8>> {
        require("artist", artist)?;
        require("album", album)?;
        let body = serde_json::to_string(&WordCloudRequest { artist, album })?;
        let response = self.post("api/wordcloud", body)?;
        let cloud: WordCloud = decode(response)?;
        let encoded = cloud
            .wordcloud
            .split_once("base64,")
            .map(|(_, data)| data)
            .unwrap_or(&cloud.wordcloud);
        Ok(general_purpose::STANDARD.decode(encoded.trim())?)
    }

    fn post(&self, path: &str, body: String) -> Result<Response> {
        let url = self.base.join(path)?;
        Ok(self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?)
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::MissingField(field))
    } else {
        Ok(())
    }
}

/// Error payloads win over the HTTP status, since the service reports
/// failures through both.
fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text()?;
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(&text) {
        return Err(Error::Service(payload.error));
    }
    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(serde_json::from_str(&text)?)
}
