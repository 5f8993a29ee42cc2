pub mod fixtures;

mod error;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	future::IntoFuture,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use axum::Router;
use serde_json::Map;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use pulse_config::{
	Auth, Config, DEFAULT_MODEL, Enrichment, Filter, LlmProviderConfig, Providers, Ranking,
	RedditProviderConfig, Search, Service, Synthesis, WebSearchProviderConfig,
};

pub const TOKEN_PATH: &str = "/api/v1/access_token";
pub const SEARCH_PATH: &str = "/search";
pub const COMPLETION_PATH: &str = "/chat/completions";
pub const WEB_SEARCH_PATH: &str = "/customsearch/v1";
pub const USER_AGENT: &str = "MarketingInsights/3.1";

/// Loopback HTTP server standing in for every upstream collaborator. Shuts down on drop.
pub struct MockUpstream {
	base_url: String,
	shutdown: Option<oneshot::Sender<()>>,
	handle: JoinHandle<()>,
}
impl MockUpstream {
	pub async fn start(router: Router) -> Result<Self> {
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, router).with_graceful_shutdown(async move {
			let _ = rx.await;
		});
		let handle = tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { base_url: format!("http://{addr}"), shutdown: Some(tx), handle })
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{path}", self.base_url)
	}
}
impl Drop for MockUpstream {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}

		self.handle.abort();
	}
}

/// Shared request counters keyed by route label.
#[derive(Debug, Clone, Default)]
pub struct HitCounter {
	hits: Arc<std::sync::Mutex<HashMap<String, Arc<AtomicUsize>>>>,
}
impl HitCounter {
	pub fn record(&self, label: &str) -> usize {
		self.slot(label).fetch_add(1, Ordering::SeqCst) + 1
	}

	pub fn get(&self, label: &str) -> usize {
		self.slot(label).load(Ordering::SeqCst)
	}

	pub fn total(&self) -> usize {
		let hits = self.hits.lock().unwrap_or_else(|err| err.into_inner());

		hits.values().map(|slot| slot.load(Ordering::SeqCst)).sum()
	}

	fn slot(&self, label: &str) -> Arc<AtomicUsize> {
		let mut hits = self.hits.lock().unwrap_or_else(|err| err.into_inner());

		hits.entry(label.to_string()).or_default().clone()
	}
}

/// Full configuration whose every upstream points at `base_url`, with millisecond backoff.
pub fn test_config(base_url: &str) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		providers: Providers {
			reddit: RedditProviderConfig {
				token_url: format!("{base_url}{TOKEN_PATH}"),
				api_base: base_url.to_string(),
				client_id: "client-id".to_string(),
				client_secret: "client-secret".to_string(),
				user_agent: USER_AGENT.to_string(),
				timeout_ms: 5_000,
			},
			llm: LlmProviderConfig {
				api_base: base_url.to_string(),
				path: COMPLETION_PATH.to_string(),
				api_key: "llm-key".to_string(),
				default_model: DEFAULT_MODEL.to_string(),
				temperature: 0.4,
				max_tokens: 3_500,
				timeout_ms: 5_000,
				default_headers: Map::new(),
			},
			web_search: Some(WebSearchProviderConfig {
				api_base: format!("{base_url}{WEB_SEARCH_PATH}"),
				api_key: "search-key".to_string(),
				engine_id: "engine".to_string(),
				query_suffix: "trends marketing".to_string(),
				num_results: 10,
				timeout_ms: 5_000,
			}),
		},
		models: HashMap::new(),
		auth: Auth { max_attempts: 3, backoff_base_ms: 1 },
		search: Search::default(),
		filter: Filter::default(),
		ranking: Ranking::default(),
		enrichment: Enrichment::default(),
		synthesis: Synthesis::default(),
	}
}
