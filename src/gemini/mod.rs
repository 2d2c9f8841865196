use std::time::Duration;

use log::{debug, error, info};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GeminiConfig;
use crate::persona::{build_system_prompt, Character};

// Returned when the provider answers 200 but no usable text survives
// extraction. The caller still gets a successful reply.
pub const FALLBACK_REPLY: &str = "Pika! Let's try again!";

// How much of an upstream error body is carried into our own error message.
const UPSTREAM_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum GeminiError {
    // Provider answered with a non-200 status; body is already truncated.
    // The message is the served wording; the status code only reaches the
    // server log.
    #[error("Gemini error: {body}")]
    Upstream { body: String },
    // Connection, timeout, or response-decoding failure on the way to the
    // provider. Always built through `network_error` so the key-bearing URL
    // is stripped first.
    #[error("Network error: {0}")]
    Network(reqwest::Error),
}

// A wrapper for the generativelanguage generateContent API.
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        info!(
            "Using Gemini API at: {} (model: {})",
            config.api_base, config.model
        );

        Self {
            client: Client::new(),
            api_base: config.api_base,
            model: config.model,
            api_key: config.api_key,
            timeout: config.timeout,
        }
    }

    // The key travels as a query parameter, so this URL must never be logged.
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        )
    }

    // One outbound call, no retries. Non-200 and transport failures map to
    // the two GeminiError variants; an empty extraction maps to the fixed
    // fallback reply.
    pub async fn generate_reply(
        &self,
        character: Character,
        message: &str,
    ) -> Result<String, GeminiError> {
        let request = build_request(character, message);

        info!("Requesting {} reply from Gemini", character);
        debug!("User message: {}", message);

        let response = match self
            .client
            .post(self.endpoint())
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let e = network_error(e);
                error!("Failed to reach Gemini API: {}", e);
                return Err(e);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let upstream = GeminiError::Upstream {
                body: snippet(&body, UPSTREAM_SNIPPET_CHARS),
            };
            error!("Gemini API returned {}: {}", status, upstream);
            return Err(upstream);
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            let e = network_error(e);
            error!("Failed to decode Gemini response: {}", e);
            e
        })?;

        Ok(extract_reply(parsed))
    }
}

// reqwest errors carry the request URL, key included. Strip it before the
// error reaches a log line or a response body.
fn network_error(e: reqwest::Error) -> GeminiError {
    GeminiError::Network(e.without_url())
}

// Request body: the system prompt as the first text part, then the user
// message wrapped in instructional context as the second.
fn build_request(character: Character, message: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part {
                    text: build_system_prompt(character),
                },
                Part {
                    text: format!(
                        "User said: {}\nCharacter: {}\nReply in-character.",
                        message, character
                    ),
                },
            ],
        }],
    }
}

// candidates[0].content.parts[0].text, tolerating an absent field at every
// level. Whitespace-only text counts as empty.
fn extract_reply(response: GenerateContentResponse) -> String {
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .and_then(|parts| parts.into_iter().next())
        .and_then(|part| part.text)
        .unwrap_or_default();

    let reply = text.trim();
    if reply.is_empty() {
        info!("Gemini returned no usable text; substituting the fallback reply");
        FALLBACK_REPLY.to_string()
    } else {
        reply.to_string()
    }
}

fn snippet(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn response_from(value: Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_body_matches_the_provider_contract() {
        let request = build_request(Character::Pikachu, "hi there");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts[0]["text"].as_str().unwrap().contains("Pika! Pika!"));
        assert_eq!(
            parts[1]["text"],
            "User said: hi there\nCharacter: Pikachu\nReply in-character."
        );
    }

    #[test]
    fn togepi_requests_lead_with_the_togepi_persona() {
        let request = build_request(Character::Togepi, "sing for me");
        let body = serde_json::to_value(&request).unwrap();
        assert!(body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Toge! Toge!"));
    }

    #[test]
    fn extracts_the_first_candidates_first_part() {
        let response = response_from(json!({
            "candidates": [
                { "content": { "parts": [ { "text": "  Pika pika!  " }, { "text": "ignored" } ] } },
                { "content": { "parts": [ { "text": "also ignored" } ] } }
            ]
        }));
        assert_eq!(extract_reply(response), "Pika pika!");
    }

    #[test]
    fn empty_text_falls_back_to_the_fixed_reply() {
        let response = response_from(json!({
            "candidates": [ { "content": { "parts": [ { "text": "   " } ] } } ]
        }));
        assert_eq!(extract_reply(response), FALLBACK_REPLY);
    }

    #[test]
    fn missing_fields_fall_back_at_every_level() {
        for value in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [ {} ] }),
            json!({ "candidates": [ { "content": {} } ] }),
            json!({ "candidates": [ { "content": { "parts": [] } } ] }),
            json!({ "candidates": [ { "content": { "parts": [ {} ] } } ] }),
        ] {
            assert_eq!(extract_reply(response_from(value)), FALLBACK_REPLY);
        }
    }

    #[test]
    fn unrecognized_response_fields_are_ignored() {
        let response = response_from(json!({
            "candidates": [ {
                "content": {
                    "role": "model",
                    "parts": [ { "text": "Pika, friend!" } ]
                },
                "finishReason": "STOP",
                "safetyRatings": []
            } ],
            "usageMetadata": { "promptTokenCount": 21, "candidatesTokenCount": 5 },
            "modelVersion": "gemini-1.5-flash-latest"
        }));
        assert_eq!(extract_reply(response), "Pika, friend!");
    }

    #[test]
    fn snippet_truncates_by_characters() {
        let long = "x".repeat(300);
        assert_eq!(snippet(&long, 200).len(), 200);

        let short = "already short";
        assert_eq!(snippet(short, 200), short);

        // Multi-byte characters count as one each.
        let emoji = "⚡".repeat(10);
        assert_eq!(snippet(&emoji, 3).chars().count(), 3);
    }

    #[test]
    fn endpoint_includes_model_and_key() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: "test-key".to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
            api_base: "http://127.0.0.1:9999".to_string(),
            timeout: Duration::from_secs(20),
        });
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9999/v1beta/models/gemini-1.5-flash-latest:generateContent?key=test-key"
        );
    }
}
