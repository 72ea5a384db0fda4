//! Gemini answering capability for free-text questions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chatbot::texts;

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    /// `timeout` bounds the whole request; the caller treats a timeout as
    /// any other failure.
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, client }
    }

    /// Answer a free-text question with the assistant system prompt.
    pub async fn answer(&self, question: &str) -> Result<String, String> {
        info!("🤖 Answering free text ({} chars)", question.len());

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: question.to_string(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: texts::SYSTEM_PROMPT.to_string(),
                }],
            },
            generation_config: GenerationConfig { temperature: 0.7 },
        };

        let url = format!("{}?key={}", GEMINI_API_URL, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("HTTP error: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {e}"))?;

        debug!("Gemini response status: {status}");

        if !status.is_success() {
            return Err(format!("API error {status}: {body}"));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| format!("Failed to parse response: {e}"))?;

        if let Some(error) = parsed.error {
            return Err(format!("Gemini error: {}", error.message));
        }

        let candidates = parsed.candidates.ok_or("No candidates in response")?;
        let candidate = candidates.first().ok_or("Empty candidates array")?;
        let content = candidate
            .content
            .as_ref()
            .ok_or("No content in candidate")?;

        let answer = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if answer.trim().is_empty() {
            return Err("No text in response".to_string());
        }

        Ok(answer)
    }
}
