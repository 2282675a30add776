use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/*
 * This module holds the outbound AI collaborator: given the full text of
 * the open file and a natural-language instruction, it returns complete
 * replacement text. The remote contract forbids commentary and markdown
 * fences, but responses are defensively stripped of fences anyway before
 * anything reaches the tree. It defines a trait
 * `RewriteServiceOperations` so the session can be tested with a mock,
 * and a concrete `GeminiRewriteService` speaking the generateContent
 * HTTP API.
 */

const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_ENDPOINT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug)]
pub enum RewriteError {
    /* No credential configured; checked before any request is sent. */
    MissingApiKey,
    Request(reqwest::Error),
    Api { status: u16, message: String },
    MalformedResponse(String),
    EmptyResponse,
}

impl From<reqwest::Error> for RewriteError {
    fn from(err: reqwest::Error) -> Self {
        RewriteError::Request(err)
    }
}

impl std::fmt::Display for RewriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewriteError::MissingApiKey => {
                write!(f, "No AI API key configured (set {API_KEY_ENV_VAR})")
            }
            RewriteError::Request(e) => write!(f, "AI request failed: {e}"),
            RewriteError::Api { status, message } => {
                write!(f, "AI service returned HTTP {status}: {message}")
            }
            RewriteError::MalformedResponse(detail) => {
                write!(f, "AI response could not be parsed: {detail}")
            }
            RewriteError::EmptyResponse => write!(f, "AI response contained no text"),
        }
    }
}

impl std::error::Error for RewriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RewriteError::Request(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RewriteError>;

/*
 * Defines the rewrite operation: original file text plus an instruction in,
 * full replacement text out. One call per session is in flight at a time;
 * the session enforces that, not this trait.
 */
pub trait RewriteServiceOperations: Send + Sync {
    fn rewrite(&self, code: &str, instruction: &str) -> Result<String>;
}

// generateContent wire format, request then response side.

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<ContentBlock>,
}

#[derive(Serialize, Deserialize)]
struct ContentBlock {
    parts: Vec<TextPart>,
}

#[derive(Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentBlock>,
}

pub struct GeminiRewriteService {
    api_key: Option<String>,
    model: String,
    endpoint_base: String,
    client: reqwest::blocking::Client,
}

impl GeminiRewriteService {
    pub fn new(api_key: Option<String>, model: &str, endpoint_base: &str) -> Self {
        GeminiRewriteService {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.to_string(),
            endpoint_base: endpoint_base.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| reqwest::blocking::Client::new()),
        }
    }

    /*
     * Builds the service from the `GEMINI_API_KEY` environment variable.
     * A missing key is not an error here; the first rewrite attempt
     * reports it, so browsing and editing keep working without AI.
     */
    pub fn from_env() -> Self {
        let api_key = env::var(API_KEY_ENV_VAR).ok();
        if api_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
            log::warn!("RewriteService: {API_KEY_ENV_VAR} is not set; AI rewrites will fail.");
        }
        Self::new(api_key, DEFAULT_MODEL, DEFAULT_ENDPOINT_BASE)
    }
}

impl RewriteServiceOperations for GeminiRewriteService {
    fn rewrite(&self, code: &str, instruction: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(RewriteError::MissingApiKey);
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.endpoint_base, self.model, api_key
        );
        let request = GenerateRequest {
            contents: vec![ContentBlock {
                parts: vec![TextPart {
                    text: build_prompt(code, instruction),
                }],
            }],
        };

        log::debug!(
            "RewriteService: Sending rewrite request to model '{}' ({} input chars).",
            self.model,
            code.len()
        );
        let response = self.client.post(&url).json(&request).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            log::warn!("RewriteService: Request failed with HTTP {status}.");
            return Err(RewriteError::Api {
                status: status.as_u16(),
                message: body.chars().take(300).collect(),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| RewriteError::MalformedResponse(e.to_string()))?;
        let raw_text = parsed
            .candidates
            .and_then(|mut candidates| candidates.drain(..).next())
            .and_then(|candidate| candidate.content)
            .and_then(|mut content| content.parts.drain(..).next())
            .map(|part| part.text)
            .ok_or(RewriteError::EmptyResponse)?;

        Ok(strip_code_fences(&raw_text))
    }
}

fn build_prompt(code: &str, instruction: &str) -> String {
    format!(
        "You are an expert programmer AI assistant. Your task is to modify the provided code \
         based on the user's instructions.\n\n\
         CRITICAL INSTRUCTION: ONLY return the complete, raw, modified code. Do NOT include any \
         explanations, comments about your changes, apologies, or markdown formatting like \
         ```javascript or ```.\n\n\
         User's Instruction: \"{instruction}\"\n\n\
         Original Code:\n---\n{code}\n---\n\n\
         Modified Code:"
    )
}

/*
 * Strips a leading markdown fence line (with or without a language tag)
 * and a trailing fence, then trims. Responses that arrive clean pass
 * through unchanged apart from surrounding whitespace.
 */
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.split_once('\n') {
            Some((_fence_line, body)) => body,
            None => "",
        };
    }
    let trimmed_end = text.trim_end();
    if let Some(rest) = trimmed_end.strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}
