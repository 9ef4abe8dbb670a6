//! Gemini REST client

use async_trait::async_trait;
use biolink_config::CopyConfig;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Returned instead of a bio when no API key is configured
pub const UNAVAILABLE_MESSAGE: &str = "AI unavailable. Please add API key.";

/// What kind of copy to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyKind {
    Bio,
    LinkTitle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    /// Display name for bios, target URL for link titles
    pub subject_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_keywords: Option<String>,
    pub kind: CopyKind,
}

impl SuggestionRequest {
    pub fn bio(name: impl Into<String>, keywords: impl Into<String>) -> Self {
        let keywords = keywords.into();
        Self {
            subject_text: name.into(),
            hint_keywords: (!keywords.trim().is_empty()).then_some(keywords),
            kind: CopyKind::Bio,
        }
    }

    pub fn link_title(url: impl Into<String>) -> Self {
        Self {
            subject_text: url.into(),
            hint_keywords: None,
            kind: CopyKind::LinkTitle,
        }
    }
}

/// Anything that can write copy. Lets the web layer run without the network.
#[async_trait]
pub trait CopySuggester: Send + Sync {
    /// Suggested text. Errors only for bios; see [`CopyClient::suggest_link_title`].
    async fn suggest(&self, request: &SuggestionRequest) -> Result<String>;

    /// Whether a credential is present
    fn is_configured(&self) -> bool;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct CopyClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl CopyClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &CopyConfig) -> Self {
        Self::new(config.api_key.clone(), &config.model, &config.endpoint)
    }

    /// A short social bio for `name`, or [`UNAVAILABLE_MESSAGE`] without a key.
    ///
    /// Any failure comes back as [`Error::BioFailed`].
    pub async fn draft_bio(&self, name: &str, keywords: &str) -> Result<String> {
        if self.api_key.is_none() {
            return Ok(UNAVAILABLE_MESSAGE.to_string());
        }

        let prompt = format!(
            "Write a short, engaging social media bio for \"{}\".\n\
             Keywords/Vibe: {}.\n\
             Keep it under 150 characters. Emoji friendly.\n\
             Return ONLY the bio text.",
            name, keywords
        );

        self.generate(&prompt).await.map_err(|e| {
            tracing::error!("bio generation failed: {}", e);
            Error::BioFailed
        })
    }

    /// A button title of at most three words for `url`. Empty on any failure.
    pub async fn suggest_link_title(&self, url: &str) -> Result<String> {
        if self.api_key.is_none() {
            return Ok(String::new());
        }

        let prompt = format!(
            "Suggest a short, clean button title (max 3 words) for this URL: {}. Return ONLY the title.",
            url
        );

        match self.generate(&prompt).await {
            Ok(title) => Ok(title),
            Err(e) => {
                tracing::warn!("link title suggestion failed: {}", e);
                Ok(String::new())
            }
        }
    }

    /// One `generateContent` call. Returns the trimmed text of the first candidate.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(Error::Unavailable)?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        tracing::debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        let body: GenerateResponse = response.json().await?;
        let candidate = body.candidates.into_iter().next().ok_or(Error::EmptyResponse)?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl CopySuggester for CopyClient {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<String> {
        match request.kind {
            CopyKind::Bio => {
                self.draft_bio(
                    &request.subject_text,
                    request.hint_keywords.as_deref().unwrap_or(""),
                )
                .await
            }
            CopyKind::LinkTitle => self.suggest_link_title(&request.subject_text).await,
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
