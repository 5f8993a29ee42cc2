use std::{
	collections::HashSet,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use axum::{Router, http::StatusCode, routing};
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use pulse_config::{
	Config, Enrichment, LlmProviderConfig, RedditProviderConfig, WebSearchProviderConfig,
};
use pulse_domain::{Candidate, RawComment, SearchPage, SearchRequest, WebResult, sources};
use pulse_providers::{completion::CompletionRequest, retry::Backoff, token::AccessToken};
use pulse_service::{
	AnalyzeRequest, BoxFuture, CommentProvider, CompletionProvider, Error, MarketResearchRequest,
	ModelLookup, Providers, PulseService, SourceProvider, Stage, TokenProvider, WebSearchProvider,
};
use pulse_testkit::{HitCounter, MockUpstream, TOKEN_PATH, fixtures, test_config};

type ProviderResult<T> = pulse_providers::Result<T>;

struct StubToken {
	calls: Arc<AtomicUsize>,
}
impl TokenProvider for StubToken {
	fn acquire_token<'a>(
		&'a self,
		_cfg: &'a RedditProviderConfig,
		_backoff: &'a Backoff,
	) -> BoxFuture<'a, ProviderResult<AccessToken>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			Ok(AccessToken {
				access_token: "stub-token".to_string(),
				token_type: "bearer".to_string(),
				expires_in: Some(3_600),
			})
		})
	}
}

/// Serves fixed pages in order; the last page repeats.
struct SpySource {
	calls: Arc<AtomicUsize>,
	pages: Vec<SearchPage>,
	delay: Duration,
	fail_status: Option<u16>,
	seen_cursors: Arc<Mutex<Vec<Option<String>>>>,
}
impl SpySource {
	fn new(pages: Vec<SearchPage>) -> Self {
		Self {
			calls: Arc::new(AtomicUsize::new(0)),
			pages,
			delay: Duration::ZERO,
			fail_status: None,
			seen_cursors: Arc::default(),
		}
	}
}
impl SourceProvider for SpySource {
	fn search_page<'a>(
		&'a self,
		_cfg: &'a RedditProviderConfig,
		_token: &'a str,
		_query: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, ProviderResult<SearchPage>> {
		let index = self.calls.fetch_add(1, Ordering::SeqCst);

		self.seen_cursors.lock().unwrap_or_else(|err| err.into_inner()).push(request.after.clone());

		Box::pin(async move {
			if !self.delay.is_zero() {
				tokio::time::sleep(self.delay).await;
			}
			if let Some(status) = self.fail_status {
				return Err(pulse_providers::Error::Status { status, body: "upstream down".to_string() });
			}

			let page = self.pages.get(index).or_else(|| self.pages.last()).cloned().unwrap_or_default();

			Ok(page)
		})
	}
}

/// Returns three usable comments per post, except for permalinks listed in `failing`.
struct StubComments {
	calls: Arc<AtomicUsize>,
	failing: HashSet<String>,
	empty: HashSet<String>,
}
impl StubComments {
	fn new() -> Self {
		Self { calls: Arc::new(AtomicUsize::new(0)), failing: HashSet::new(), empty: HashSet::new() }
	}
}
impl CommentProvider for StubComments {
	fn fetch_comments<'a>(
		&'a self,
		_cfg: &'a RedditProviderConfig,
		_enrichment: &'a Enrichment,
		_token: &'a str,
		permalink: &'a str,
	) -> BoxFuture<'a, ProviderResult<Vec<RawComment>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			if self.failing.contains(permalink) {
				return Err(pulse_providers::Error::Status { status: 502, body: "bad gateway".to_string() });
			}
			if self.empty.contains(permalink) {
				return Ok(Vec::new());
			}

			Ok((0..3)
				.map(|index| RawComment {
					kind: "t1".to_string(),
					body: format!("Useful **comment** number {index} about the routine"),
					score: 10 - index,
					author: format!("user{index}"),
					stickied: false,
				})
				.collect())
		})
	}
}

struct SpyCompletion {
	calls: Arc<AtomicUsize>,
	content: String,
	seen: Arc<Mutex<Vec<(String, String)>>>,
	sampling: Arc<Mutex<Vec<(Option<f32>, Option<u32>)>>>,
}
impl SpyCompletion {
	fn new(content: String) -> Self {
		Self {
			calls: Arc::new(AtomicUsize::new(0)),
			content,
			seen: Arc::default(),
			sampling: Arc::default(),
		}
	}
}
impl CompletionProvider for SpyCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		request: &'a CompletionRequest<'a>,
	) -> BoxFuture<'a, ProviderResult<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.seen
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push((request.model.to_string(), request.user.to_string()));
		self.sampling
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push((request.temperature, request.max_tokens));

		let content = self.content.clone();

		Box::pin(async move { Ok(content) })
	}
}

struct StubWebSearch {
	results: Vec<WebResult>,
}
impl WebSearchProvider for StubWebSearch {
	fn search_web<'a>(
		&'a self,
		_cfg: &'a WebSearchProviderConfig,
		_query: &'a str,
	) -> BoxFuture<'a, ProviderResult<Vec<WebResult>>> {
		let results = self.results.clone();

		Box::pin(async move { Ok(results) })
	}
}

struct TableModels;
impl ModelLookup for TableModels {
	fn model_for(&self, cfg: &Config, api_name: &str) -> Option<String> {
		cfg.models.get(api_name).cloned()
	}
}

struct Harness {
	token: Arc<AtomicUsize>,
	source: Arc<AtomicUsize>,
	comments: Arc<AtomicUsize>,
	completion: Arc<AtomicUsize>,
	seen_completions: Arc<Mutex<Vec<(String, String)>>>,
	seen_cursors: Arc<Mutex<Vec<Option<String>>>>,
	sampling: Arc<Mutex<Vec<(Option<f32>, Option<u32>)>>>,
}

fn good_candidate(index: usize) -> Candidate {
	let id = format!("p{index}");

	Candidate {
		permalink: fixtures::permalink(&id),
		url: format!("https://blog{index}.example.com/review"),
		title: format!("Skincare tip {index}"),
		subreddit: "SkincareAddiction".to_string(),
		selftext: "A long and detailed personal account of products tried over many months. "
			.repeat(3),
		score: 200 - index as i64 * 10,
		num_comments: 30,
		upvote_ratio: 0.9,
		id,
		..Default::default()
	}
}

/// Twenty raw candidates: twelve pass the quality gate, eight do not.
fn scenario_a_page() -> SearchPage {
	let mut candidates: Vec<Candidate> = (0..12).map(good_candidate).collect();

	for index in 12..16 {
		candidates.push(Candidate { locked: true, ..good_candidate(index) });
	}
	for index in 16..20 {
		candidates.push(Candidate { num_comments: 1, ..good_candidate(index) });
	}

	SearchPage { candidates, after: None }
}

fn build_service(
	cfg: Config,
	source: SpySource,
	comments: StubComments,
	completion: SpyCompletion,
) -> (PulseService, Harness) {
	let token = StubToken { calls: Arc::new(AtomicUsize::new(0)) };
	let harness = Harness {
		token: token.calls.clone(),
		source: source.calls.clone(),
		comments: comments.calls.clone(),
		completion: completion.calls.clone(),
		seen_completions: completion.seen.clone(),
		seen_cursors: source.seen_cursors.clone(),
		sampling: completion.sampling.clone(),
	};
	let providers = Providers::new(
		Arc::new(token),
		Arc::new(source),
		Arc::new(comments),
		Arc::new(completion),
		Arc::new(StubWebSearch { results: Vec::new() }),
		Arc::new(TableModels),
	);

	(PulseService::with_providers(cfg, providers), harness)
}

fn report_content(sources: Option<Vec<&str>>) -> String {
	fixtures::insight_report(6, 3, 4, sources).to_string()
}

fn request(query: &str) -> AnalyzeRequest {
	AnalyzeRequest { query: query.to_string(), ..Default::default() }
}

#[tokio::test]
async fn end_to_end_enrichment_failures_are_isolated() {
	let mut comments = StubComments::new();

	comments.failing.insert(fixtures::permalink("p3"));
	comments.failing.insert(fixtures::permalink("p7"));

	let (service, harness) = build_service(
		test_config("http://unused.invalid"),
		SpySource::new(vec![scenario_a_page()]),
		comments,
		SpyCompletion::new(report_content(None)),
	);
	let response = service.analyze(request("skincare")).await.expect("Pipeline must succeed.");
	let titles: Vec<&str> = response.results.iter().map(|post| post.title.as_str()).collect();

	assert_eq!(harness.comments.load(Ordering::SeqCst), 10);
	assert_eq!(
		titles,
		vec![
			"Skincare tip 0",
			"Skincare tip 1",
			"Skincare tip 2",
			"Skincare tip 4",
			"Skincare tip 5",
			"Skincare tip 6",
			"Skincare tip 8",
			"Skincare tip 9",
		]
	);
	assert_eq!(response.results[0].top_comments.len(), 3);
	assert_eq!(response.results[0].top_comments[0].body, "Useful comment number 0 about the routine");
	assert_eq!(response.insights.recurring_pain_points.len(), 6);
	assert_eq!(response.insights.niche_communities.len(), 3);
	assert_eq!(response.insights.sentiment_analysis.emotional_triggers.len(), 4);

	let expected_sources = sources::collect_sources(&response.results);

	assert_eq!(response.insights.sources, expected_sources);
	assert_eq!(response.insights.sources.len(), 16);
	assert!(
		response
			.insights
			.recurring_pain_points
			.iter()
			.all(|point| point.sources.as_ref().is_some_and(Vec::is_empty))
	);
	assert_eq!(harness.completion.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn synthesis_payload_is_capped_and_uses_default_model() {
	let (service, harness) = build_service(
		test_config("http://unused.invalid"),
		SpySource::new(vec![scenario_a_page()]),
		StubComments::new(),
		SpyCompletion::new(report_content(Some(vec!["https://kept.example.com"]))),
	);
	let response = service.analyze(request("skincare")).await.expect("Pipeline must succeed.");
	let seen = harness.seen_completions.lock().unwrap_or_else(|err| err.into_inner()).clone();
	let sampling = harness.sampling.lock().unwrap_or_else(|err| err.into_inner()).clone();
	let (model, user) = &seen[0];

	assert_eq!(sampling, vec![(None, None)]);
	let payload: Value = serde_json::from_str(user).expect("Payload must be JSON.");
	let discussions = payload["discussions"].as_array().expect("Payload must list discussions.");

	assert_eq!(model, pulse_config::DEFAULT_MODEL);
	assert_eq!(payload["query"], "skincare");
	assert_eq!(discussions.len(), 10);
	assert!(discussions.iter().all(|item| {
		item["content"].as_str().is_some_and(|content| content.chars().count() <= 300)
			&& item["comments"].as_str().is_some_and(|comments| comments.contains(" | "))
	}));
	assert_eq!(response.insights.sources, vec!["https://kept.example.com".to_string()]);
}

#[tokio::test]
async fn model_lookup_entry_overrides_default() {
	let mut cfg = test_config("http://unused.invalid");

	cfg.models.insert("reddit_analytics".to_string(), "custom-model".to_string());

	let (service, harness) = build_service(
		cfg,
		SpySource::new(vec![scenario_a_page()]),
		StubComments::new(),
		SpyCompletion::new(report_content(None)),
	);

	service.analyze(request("skincare")).await.expect("Pipeline must succeed.");

	let seen = harness.seen_completions.lock().unwrap_or_else(|err| err.into_inner()).clone();

	assert_eq!(seen[0].0, "custom-model");
}

#[tokio::test]
async fn empty_search_fails_at_the_fetch_stage() {
	let (service, harness) = build_service(
		test_config("http://unused.invalid"),
		SpySource::new(vec![SearchPage::default()]),
		StubComments::new(),
		SpyCompletion::new(report_content(None)),
	);
	let err = service.analyze(request("skincare")).await.expect_err("Expected failure.");

	assert_eq!(err, Error::NoCandidates { stage: Stage::Fetch });
	assert_eq!(err.stage(), Some(Stage::Fetch));
	assert_eq!(harness.comments.load(Ordering::SeqCst), 0);
	assert_eq!(harness.completion.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fully_filtered_search_fails_at_the_filter_stage() {
	let rejected: Vec<Candidate> =
		(0..5).map(|index| Candidate { over_18: true, ..good_candidate(index) }).collect();
	let (service, _harness) = build_service(
		test_config("http://unused.invalid"),
		SpySource::new(vec![SearchPage { candidates: rejected, after: None }]),
		StubComments::new(),
		SpyCompletion::new(report_content(None)),
	);
	let err = service.analyze(request("skincare")).await.expect_err("Expected failure.");

	assert_eq!(err, Error::NoCandidates { stage: Stage::Filter });
}

#[tokio::test]
async fn commentless_candidates_fail_at_the_enrichment_stage() {
	let mut comments = StubComments::new();

	for index in 0..12 {
		comments.empty.insert(fixtures::permalink(&format!("p{index}")));
	}

	let (service, harness) = build_service(
		test_config("http://unused.invalid"),
		SpySource::new(vec![scenario_a_page()]),
		comments,
		SpyCompletion::new(report_content(None)),
	);
	let err = service.analyze(request("skincare")).await.expect_err("Expected failure.");

	assert_eq!(err, Error::NoCandidates { stage: Stage::Enrichment });
	assert_eq!(harness.completion.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unparseable_synthesis_fails_the_run() {
	let (service, _harness) = build_service(
		test_config("http://unused.invalid"),
		SpySource::new(vec![scenario_a_page()]),
		StubComments::new(),
		SpyCompletion::new("Here are some thoughts without JSON.".to_string()),
	);
	let err = service.analyze(request("skincare")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::SynthesisParse { .. }));
	assert_eq!(err.stage(), Some(Stage::Synthesis));
}

#[tokio::test]
async fn short_query_is_rejected_before_any_upstream_call() {
	let (service, harness) = build_service(
		test_config("http://unused.invalid"),
		SpySource::new(vec![scenario_a_page()]),
		StubComments::new(),
		SpyCompletion::new(report_content(None)),
	);

	for query in ["", "   ", " a "] {
		let err = service.analyze(request(query)).await.expect_err("Expected failure.");

		assert!(matches!(err, Error::InvalidQuery { .. }), "Unexpected error: {err:?}");
		assert!(!err.is_retryable());
	}

	assert_eq!(harness.token.load(Ordering::SeqCst), 0);
	assert_eq!(harness.source.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_upstream_call() {
	let mut cfg = test_config("http://unused.invalid");

	cfg.providers.llm.api_key = "  ".to_string();

	let (service, harness) = build_service(
		cfg,
		SpySource::new(vec![scenario_a_page()]),
		StubComments::new(),
		SpyCompletion::new(report_content(None)),
	);
	let err = service.analyze(request("skincare")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Config { .. }), "Unexpected error: {err:?}");
	assert_eq!(harness.token.load(Ordering::SeqCst), 0);
	assert_eq!(harness.source.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pagination_follows_the_cursor_up_to_max_pages() {
	let mut cfg = test_config("http://unused.invalid");

	cfg.search.max_pages = 2;

	let page = scenario_a_page();
	let first = SearchPage { candidates: page.candidates[..10].to_vec(), after: Some("t3_p9".to_string()) };
	let second = SearchPage { candidates: page.candidates[10..].to_vec(), after: Some("t3_p19".to_string()) };
	let (service, harness) = build_service(
		cfg,
		SpySource::new(vec![first, second]),
		StubComments::new(),
		SpyCompletion::new(report_content(None)),
	);
	let response = service.analyze(request("skincare")).await.expect("Pipeline must succeed.");
	let cursors = harness.seen_cursors.lock().unwrap_or_else(|err| err.into_inner()).clone();

	assert_eq!(harness.source.load(Ordering::SeqCst), 2);
	assert_eq!(cursors, vec![None, Some("t3_p9".to_string())]);
	assert_eq!(response.results.len(), 10);
}

#[tokio::test]
async fn concurrent_identical_queries_share_one_run() {
	let mut source = SpySource::new(vec![scenario_a_page()]);

	source.delay = Duration::from_millis(50);

	let (service, harness) = build_service(
		test_config("http://unused.invalid"),
		source,
		StubComments::new(),
		SpyCompletion::new(report_content(None)),
	);
	let (a, b) = tokio::join!(service.analyze(request("skincare")), service.analyze(request(" skincare ")));
	let a = a.expect("First caller must succeed.");
	let b = b.expect("Second caller must succeed.");

	assert_eq!(a, b);
	assert_eq!(harness.token.load(Ordering::SeqCst), 1);
	assert_eq!(harness.source.load(Ordering::SeqCst), 1);
	assert_eq!(harness.completion.load(Ordering::SeqCst), 1);
	assert!(service.analyze_flights().is_empty());

	service.analyze(request("skincare")).await.expect("Later call must succeed.");

	assert_eq!(harness.source.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_callers_receive_the_same_failure() {
	let mut source = SpySource::new(vec![scenario_a_page()]);

	source.delay = Duration::from_millis(50);
	source.fail_status = Some(503);

	let (service, harness) = build_service(
		test_config("http://unused.invalid"),
		source,
		StubComments::new(),
		SpyCompletion::new(report_content(None)),
	);
	let (a, b) = tokio::join!(service.analyze(request("serum")), service.analyze(request("serum")));
	let a = a.expect_err("Expected failure.");
	let b = b.expect_err("Expected failure.");

	assert_eq!(a, b);
	assert!(matches!(a, Error::Fetch { stage: Stage::Fetch, status: 503, .. }));
	assert!(a.is_retryable());
	assert_eq!(harness.source.load(Ordering::SeqCst), 1);
	assert!(!service.analyze_flights().contains("serum"));
}

#[tokio::test]
async fn token_rejection_fails_with_auth_after_three_attempts() {
	let hits = HitCounter::default();
	let router = Router::new()
		.route(
			TOKEN_PATH,
			routing::post(|axum::extract::State(hits): axum::extract::State<HitCounter>| async move {
				hits.record("token");

				StatusCode::UNAUTHORIZED
			}),
		)
		.with_state(hits.clone());
	let upstream = MockUpstream::start(router).await.expect("Failed to start upstream.");
	let source = SpySource::new(vec![scenario_a_page()]);
	let source_calls = source.calls.clone();
	let providers = Providers {
		source: Arc::new(source),
		completion: Arc::new(SpyCompletion::new(report_content(None))),
		..Providers::default()
	};
	let service = PulseService::with_providers(test_config(upstream.base_url()), providers);
	let err = service.analyze(request("skincare")).await.expect_err("Expected failure.");

	assert!(
		matches!(err, Error::Auth { attempts: 3, status: Some(401), .. }),
		"Unexpected error: {err:?}"
	);
	assert_eq!(err.stage(), Some(Stage::Auth));
	assert!(!err.is_retryable());
	assert_eq!(hits.get("token"), 3);
	assert_eq!(source_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn market_research_backfills_deduplicated_links() {
	let results = vec![
		WebResult {
			title: "**Reels** growth".to_string(),
			snippet: "Read https://tracking.example.com/a now".to_string(),
			link: "https://news.example.com/1".to_string(),
		},
		WebResult {
			title: "Second".to_string(),
			snippet: "Same source".to_string(),
			link: "https://news.example.com/1".to_string(),
		},
		WebResult { title: "No link".to_string(), snippet: "x".to_string(), link: "#".to_string() },
	];
	let completion = SpyCompletion::new(fixtures::market_research_report().to_string());
	let seen = completion.seen.clone();
	let sampling = completion.sampling.clone();
	let mut cfg = test_config("http://unused.invalid");

	cfg.models.insert("market_research".to_string(), "research-model".to_string());

	let providers = Providers {
		completion: Arc::new(completion),
		web_search: Arc::new(StubWebSearch { results }),
		..Providers::default()
	};
	let service = PulseService::with_providers(cfg, providers);
	let response = service
		.research_market(MarketResearchRequest { query: "snacks".to_string() })
		.await
		.expect("Research must succeed.");

	assert_eq!(response.results[0].title, "Reels growth");
	assert_eq!(response.results[0].snippet, "Read  now");
	assert_eq!(response.analysis.sources, vec!["https://news.example.com/1".to_string()]);
	assert_eq!(response.analysis.trends[0].impact, 85.0);
	assert!(OffsetDateTime::parse(&response.timestamp, &Rfc3339).is_ok());
	assert_eq!(seen.lock().unwrap_or_else(|err| err.into_inner())[0].0, "research-model");
	assert_eq!(
		sampling.lock().unwrap_or_else(|err| err.into_inner()).clone(),
		vec![(Some(0.7), Some(4_000))]
	);
}

#[tokio::test]
async fn market_research_requires_web_search_config() {
	let mut cfg = test_config("http://unused.invalid");

	cfg.providers.web_search = None;

	let service = PulseService::with_providers(cfg, Providers::default());
	let err = service
		.research_market(MarketResearchRequest { query: "snacks".to_string() })
		.await
		.expect_err("Expected failure.");

	assert!(matches!(err, Error::Config { .. }));
}

#[tokio::test]
async fn market_research_with_no_results_fails_at_fetch() {
	let providers =
		Providers { web_search: Arc::new(StubWebSearch { results: Vec::new() }), ..Providers::default() };
	let service = PulseService::with_providers(test_config("http://unused.invalid"), providers);
	let err = service
		.research_market(MarketResearchRequest { query: "snacks".to_string() })
		.await
		.expect_err("Expected failure.");

	assert_eq!(err, Error::NoCandidates { stage: Stage::Fetch });
}
