use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str = "You are an exceptional programmer, and your purpose is to assist in resolving issues in failing scripts.";

/// Proposes a replacement script body for a failing script. The trait exists
/// so the run loop can be exercised without a network.
pub(crate) trait FixRequester {
    fn request_fix(&self, code: &str, error_output: &str) -> Result<String, String>;
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

pub(crate) struct OpenAiFixer {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiFixer {
    pub(crate) fn new(url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            url,
            model,
            api_key,
        }
    }
}

impl FixRequester for OpenAiFixer {
    fn request_fix(&self, code: &str, error_output: &str) -> Result<String, String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            "No API key configured. Set OPENAI_API_KEY (or api_key_env) in the environment or env file.".to_string()
        })?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_prompt(code, error_output),
                },
            ],
        };

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .map_err(|err| format!("Fix request failed: {}", err))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|err| format!("Failed to read fix response: {}", err))?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 => "Invalid API key.".to_string(),
                429 => "Rate limited by the API. Try again in a few minutes.".to_string(),
                500..=599 => format!(
                    "API server error ({}). The service may be temporarily unavailable.",
                    status
                ),
                _ => format!("API error {}: {}", status, truncate_str(&text, 200)),
            });
        }

        parse_fix_response(&text)
    }
}

pub(crate) fn user_prompt(code: &str, error_output: &str) -> String {
    format!(
        "Script source and the error message that appeared in the terminal:\n\n{}\n\n{}\n\nOffer the corrected script without any additional text. Just share the code to avoid any interference with the debugging process.",
        code, error_output
    )
}

pub(crate) fn parse_fix_response(body: &str) -> Result<String, String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|err| format!("Failed to parse fix response: {}\n{}", err, truncate_str(body, 200)))?;
    let content = parsed
        .choices
        .first()
        .map(|choice| choice.message.content.as_str())
        .ok_or_else(|| "Fix response contained no choices.".to_string())?;
    Ok(strip_code_fences(content).to_string())
}

/// Models often wrap the replacement script in a markdown code fence even
/// when told not to; unwrap it so the applied file is runnable. Replies
/// without a fence pass through untouched.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let opened = text.trim_start();
    if !opened.starts_with("```") {
        return text;
    }
    // Drop the info string ("python", "sh", ...) on the opening fence line.
    let body = match opened.split_once('\n') {
        Some((_, rest)) => rest,
        None => return text,
    };
    match body.trim_end().strip_suffix("```") {
        Some(inner) => inner,
        None => body,
    }
}

pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    if s.chars().count() <= max_chars {
        s
    } else {
        let byte_idx = s
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        &s[..byte_idx]
    }
}
