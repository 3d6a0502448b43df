use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Literal substituted for the review text when the generation call fails.
/// Persisted and returned to the caller like ordinary review content.
pub const GENERATION_FALLBACK: &str =
    "Error: Could not get a review from the language model.";

const PROMPT_HEADER: &str = "Act as an expert code reviewer.\n\
Analyze the following code for readability, modularity, and potential bugs.\n\
Provide clear, actionable improvement suggestions in a well-structured format.";

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generation service is not configured (missing API key)")]
    Unconfigured,
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generation service returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("generation response contained no candidate text")]
    EmptyResponse,
}

/// Client for the hosted text-generation service.
///
/// Constructed once at startup. An absent API key is not fatal: the
/// generator stays in an unconfigured state where every call fails fast
/// and [`generate`](ReviewGenerator::generate) yields the fallback text.
pub struct ReviewGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl ReviewGenerator {
    pub fn new(api_key: Option<String>, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Produce a review for the submitted code.
    ///
    /// Any failure of the generation call is logged and replaced by
    /// [`GENERATION_FALLBACK`]; callers treat the result as ordinary review
    /// content either way. No retry.
    pub async fn generate(&self, code: &str) -> String {
        match self.request_review(code).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Review generation failed, substituting fallback text");
                GENERATION_FALLBACK.to_string()
            }
        }
    }

    async fn request_review(&self, code: &str) -> Result<String, GeneratorError> {
        let api_key = self.api_key.as_deref().ok_or(GeneratorError::Unconfigured)?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, api_key
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": build_prompt(code) }] }]
        });

        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GeneratorError::Api { status, body });
        }

        let data: GenerateContentResponse = resp.json().await?;
        let text: String = data
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }

        Ok(text)
    }
}

/// Wrap the submitted code in the fixed review instruction, delimited by
/// explicit start/end markers so the model can tell instruction from input.
fn build_prompt(code: &str) -> String {
    format!("{PROMPT_HEADER}\n\n--- CODE START ---\n{code}\n--- CODE END ---\n")
}
