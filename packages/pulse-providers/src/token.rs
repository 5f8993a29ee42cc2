use serde_json::Value;

use pulse_config::RedditProviderConfig;

use crate::{
	Error, Result,
	retry::{self, Backoff, Exhausted},
};

const GRANT_TYPE: &str = "client_credentials";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
	pub access_token: String,
	pub token_type: String,
	pub expires_in: Option<u64>,
}

/// Exchanges the configured client credentials for an access token.
///
/// Every failed exchange is retried on the `backoff` schedule; once the schedule is spent the
/// final attempt's failure is reported as `Error::Auth`.
pub async fn acquire_token(cfg: &RedditProviderConfig, backoff: &Backoff) -> Result<AccessToken> {
	if cfg.client_id.trim().is_empty() || cfg.client_secret.trim().is_empty() {
		return Err(Error::InvalidConfig {
			message: "providers.reddit.client_id and providers.reddit.client_secret are required."
				.to_string(),
		});
	}

	let client = crate::http_client(cfg.timeout_ms)?;
	let outcome = retry::retry(backoff, |attempt| {
		let client = &client;

		async move {
			tracing::debug!(attempt, "Requesting access token.");

			let res = client
				.post(&cfg.token_url)
				.basic_auth(&cfg.client_id, Some(&cfg.client_secret))
				.header(reqwest::header::USER_AGENT, &cfg.user_agent)
				.form(&[("grant_type", GRANT_TYPE)])
				.send()
				.await?;
			let json: Value = crate::ensure_success(res).await?.json().await?;

			parse_token_response(json)
		}
	})
	.await;

	outcome.map_err(|Exhausted { attempts, last }| Error::Auth {
		attempts,
		status: last.status(),
		message: last.to_string(),
	})
}

fn parse_token_response(json: Value) -> Result<AccessToken> {
	let access_token = json
		.get("access_token")
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Token response is missing access_token.".to_string(),
		})?;
	let token_type =
		json.get("token_type").and_then(Value::as_str).unwrap_or("bearer").to_string();
	let expires_in = json.get("expires_in").and_then(Value::as_u64);

	Ok(AccessToken { access_token: access_token.to_string(), token_type, expires_in })
}
