use serde_json::Value;

use pulse_config::WebSearchProviderConfig;
use pulse_domain::WebResult;

use crate::{Error, Result};

const NO_TITLE: &str = "No title available";
const NO_SNIPPET: &str = "No snippet available";
const NO_LINK: &str = "#";

pub async fn search_web(cfg: &WebSearchProviderConfig, query: &str) -> Result<Vec<WebResult>> {
	if cfg.api_key.trim().is_empty() || cfg.engine_id.trim().is_empty() {
		return Err(Error::InvalidConfig {
			message: "providers.web_search.api_key and providers.web_search.engine_id are required."
				.to_string(),
		});
	}

	let client = crate::http_client(cfg.timeout_ms)?;
	let q = format!("{} {}", query.trim(), cfg.query_suffix.trim()).trim().to_string();
	let res = client
		.get(&cfg.api_base)
		.query(&[
			("key", cfg.api_key.clone()),
			("cx", cfg.engine_id.clone()),
			("q", q),
			("num", cfg.num_results.to_string()),
		])
		.send()
		.await?;
	let json: Value = crate::ensure_success(res).await?.json().await?;

	parse_web_search_response(json)
}

pub fn parse_web_search_response(json: Value) -> Result<Vec<WebResult>> {
	let items = json.get("items").and_then(Value::as_array).ok_or_else(|| {
		Error::UnrecognizedShape { message: "Web search response is missing items array.".to_string() }
	})?;

	Ok(items
		.iter()
		.map(|item| {
			let field = |key: &str, fallback: &str| {
				item.get(key)
					.and_then(Value::as_str)
					.map(str::trim)
					.filter(|value| !value.is_empty())
					.unwrap_or(fallback)
					.to_string()
			};

			WebResult {
				title: field("title", NO_TITLE),
				snippet: field("snippet", NO_SNIPPET),
				link: field("link", NO_LINK),
			}
		})
		.collect())
}
