use serde_json::Value;

use pulse_config::LlmProviderConfig;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
	pub model: &'a str,
	pub system: &'a str,
	pub user: &'a str,
	/// Asks the model for a single JSON object.
	pub json_object: bool,
	/// Overrides `providers.llm.temperature` when set.
	pub temperature: Option<f32>,
	/// Overrides `providers.llm.max_tokens` when set.
	pub max_tokens: Option<u32>,
}

/// Runs one chat completion and returns the first choice's message content.
pub async fn complete(cfg: &LlmProviderConfig, request: &CompletionRequest<'_>) -> Result<String> {
	if cfg.api_key.trim().is_empty() {
		return Err(Error::InvalidConfig {
			message: "providers.llm.api_key is required.".to_string(),
		});
	}

	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&completion_body(cfg, request))
		.send()
		.await?;
	let json: Value = crate::ensure_success(res).await?.json().await?;

	parse_completion_content(json)
}

pub fn completion_body(cfg: &LlmProviderConfig, request: &CompletionRequest<'_>) -> Value {
	let mut body = serde_json::json!({
		"model": request.model,
		"temperature": request.temperature.unwrap_or(cfg.temperature),
		"max_tokens": request.max_tokens.unwrap_or(cfg.max_tokens),
		"messages": [
			{ "role": "system", "content": request.system },
			{ "role": "user", "content": request.user }
		],
	});

	if request.json_object {
		body["response_format"] = serde_json::json!({ "type": "json_object" });
	}

	body
}

fn parse_completion_content(json: Value) -> Result<String> {
	json.get("choices")
		.and_then(Value::as_array)
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(Value::as_str)
		.map(str::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing message content.".to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "role": "assistant", "content": "{\"overview\": \"x\"}" } }
			]
		});

		assert_eq!(parse_completion_content(json).expect("parse failed"), "{\"overview\": \"x\"}");
	}

	#[test]
	fn request_overrides_provider_sampling() {
		let cfg = LlmProviderConfig {
			api_base: "http://127.0.0.1:1".to_string(),
			path: "/chat/completions".to_string(),
			api_key: "k".to_string(),
			default_model: "m".to_string(),
			temperature: 0.4,
			max_tokens: 3_500,
			timeout_ms: 1_000,
			default_headers: serde_json::Map::new(),
		};
		let mut request = CompletionRequest {
			model: "m",
			system: "s",
			user: "u",
			json_object: false,
			temperature: None,
			max_tokens: None,
		};
		let body = completion_body(&cfg, &request);

		assert_eq!(body["max_tokens"], 3_500);
		assert!(body.get("response_format").is_none());

		request.temperature = Some(0.7);
		request.max_tokens = Some(4_000);

		let body = completion_body(&cfg, &request);

		assert_eq!(body["max_tokens"], 4_000);
		assert!((body["temperature"].as_f64().unwrap_or_default() - 0.7).abs() < 1e-6);
	}

	#[test]
	fn missing_content_is_invalid() {
		let json = serde_json::json!({ "choices": [] });

		assert!(matches!(parse_completion_content(json), Err(Error::InvalidResponse { .. })));
	}
}
