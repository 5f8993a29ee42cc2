use serde_json::Value;

use pulse_config::{Enrichment, RedditProviderConfig};
use pulse_domain::RawComment;

use crate::{Error, Result};

/// Fetches the first level of the comment tree for one post.
pub async fn fetch_comments(
	cfg: &RedditProviderConfig,
	enrichment: &Enrichment,
	token: &str,
	permalink: &str,
) -> Result<Vec<RawComment>> {
	let permalink = permalink.trim();

	if permalink.is_empty() {
		return Err(Error::InvalidResponse {
			message: "Candidate has no permalink to fetch comments for.".to_string(),
		});
	}

	let client = crate::http_client(cfg.timeout_ms)?;
	let separator = if permalink.starts_with('/') { "" } else { "/" };
	let url = format!("{}{separator}{permalink}", cfg.api_base);
	let res = client
		.get(url)
		.headers(crate::platform_headers(token, &cfg.user_agent)?)
		.query(&[
			("limit", enrichment.request_limit.to_string()),
			("depth", enrichment.request_depth.to_string()),
			("sort", enrichment.request_sort.clone()),
			("raw_json", "1".to_string()),
		])
		.send()
		.await?;
	let json: Value = crate::ensure_success(res).await?.json().await?;

	parse_comments_response(json)
}

/// Reads element 1 of the `[post, comment tree]` envelope.
pub fn parse_comments_response(json: Value) -> Result<Vec<RawComment>> {
	let children = json
		.as_array()
		.filter(|parts| parts.len() >= 2)
		.and_then(|parts| parts[1].get("data"))
		.and_then(|data| data.get("children"))
		.and_then(Value::as_array)
		.ok_or_else(|| Error::UnrecognizedShape {
			message: "Comment response must be a two-element array with a comment listing."
				.to_string(),
		})?;

	Ok(children.iter().map(parse_comment).collect())
}

fn parse_comment(item: &Value) -> RawComment {
	let data = item.get("data");
	let text = |key: &str| {
		data.and_then(|data| data.get(key)).and_then(Value::as_str).unwrap_or_default().to_string()
	};

	RawComment {
		kind: item.get("kind").and_then(Value::as_str).unwrap_or_default().to_string(),
		body: text("body"),
		score: data
			.and_then(|data| data.get("score"))
			.and_then(Value::as_f64)
			.map(|score| score as i64)
			.unwrap_or(0),
		author: text("author"),
		stickied: data
			.and_then(|data| data.get("stickied"))
			.and_then(Value::as_bool)
			.unwrap_or(false),
	}
}
