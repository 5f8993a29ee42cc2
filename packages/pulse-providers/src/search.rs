use serde::Deserialize;
use serde_json::Value;

use pulse_config::RedditProviderConfig;
use pulse_domain::{Candidate, SearchPage, SearchRequest};

use crate::{Error, Result};

const POST_KIND: &str = "t3";

/// Fetches one page of link posts matching `query`.
pub async fn search_page(
	cfg: &RedditProviderConfig,
	token: &str,
	query: &str,
	request: &SearchRequest,
) -> Result<SearchPage> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}/search", cfg.api_base);
	let res = client
		.get(url)
		.headers(crate::platform_headers(token, &cfg.user_agent)?)
		.query(&search_query(query, request))
		.send()
		.await?;
	let json: Value = crate::ensure_success(res).await?.json().await?;

	parse_search_response(json)
}

pub fn search_query(query: &str, request: &SearchRequest) -> Vec<(&'static str, String)> {
	let mut params = vec![
		("q", query.to_string()),
		("sort", request.sort.as_str().to_string()),
		("t", request.time_window.as_str().to_string()),
		("limit", request.limit.to_string()),
		("type", "link".to_string()),
		("include_over_18", "false".to_string()),
		("raw_json", "1".to_string()),
	];

	if let Some(after) = request.after.as_ref() {
		params.push(("after", after.clone()));
	}

	params
}

/// Normalizes every accepted envelope into one ordered page of candidates.
pub fn parse_search_response(json: Value) -> Result<SearchPage> {
	let envelope: SearchEnvelope =
		serde_json::from_value(json).map_err(|err| Error::UnrecognizedShape {
			message: format!("Search response envelope is not recognized: {err}."),
		})?;
	let (items, after) = match envelope {
		SearchEnvelope::Listing { data } => (data.children, data.after),
		SearchEnvelope::Children { children, after } => (children, after),
		SearchEnvelope::Bare(items) => (items, None),
	};
	let candidates = items.into_iter().filter_map(ListingItem::into_candidate).collect();
	let after = after.map(|cursor| cursor.trim().to_string()).filter(|cursor| !cursor.is_empty());

	Ok(SearchPage { candidates, after })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchEnvelope {
	/// `{ "data": { "children": [...], "after": ... } }`
	Listing { data: ListingData },
	/// `{ "children": [...] }`
	Children {
		children: Vec<ListingItem>,
		#[serde(default)]
		after: Option<String>,
	},
	/// `[...]`
	Bare(Vec<ListingItem>),
}

#[derive(Debug, Deserialize)]
struct ListingData {
	children: Vec<ListingItem>,
	#[serde(default)]
	after: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingItem {
	Thing {
		#[serde(default)]
		kind: Option<String>,
		data: RawPost,
	},
	Post(RawPost),
}
impl ListingItem {
	fn into_candidate(self) -> Option<Candidate> {
		match self {
			Self::Thing { kind, data } => {
				if kind.as_deref().is_some_and(|kind| kind != POST_KIND) {
					return None;
				}

				Some(data.into_candidate())
			},
			Self::Post(data) => Some(data.into_candidate()),
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPost {
	id: Option<String>,
	title: Option<String>,
	subreddit: Option<String>,
	selftext: Option<String>,
	permalink: Option<String>,
	url: Option<String>,
	score: Option<f64>,
	num_comments: Option<f64>,
	upvote_ratio: Option<f64>,
	total_awards_received: Option<f64>,
	created_utc: Option<f64>,
	locked: Option<bool>,
	stickied: Option<bool>,
	pinned: Option<bool>,
	over_18: Option<bool>,
	removed_by_category: Option<Value>,
}
impl RawPost {
	fn into_candidate(self) -> Candidate {
		let removed = self.removed_by_category.as_ref().is_some_and(|value| !value.is_null());

		Candidate {
			id: self.id.unwrap_or_default(),
			title: self.title.unwrap_or_default(),
			subreddit: self.subreddit.unwrap_or_default(),
			selftext: self.selftext.unwrap_or_default(),
			permalink: self.permalink.unwrap_or_default(),
			url: self.url.unwrap_or_default(),
			score: self.score.unwrap_or(0.0) as i64,
			num_comments: self.num_comments.unwrap_or(0.0).max(0.0) as u64,
			upvote_ratio: self.upvote_ratio.unwrap_or(0.0),
			awards: self.total_awards_received.unwrap_or(0.0).max(0.0) as u64,
			created_utc: self.created_utc.unwrap_or(0.0),
			locked: self.locked.unwrap_or(false),
			stickied: self.stickied.unwrap_or(false) || self.pinned.unwrap_or(false),
			over_18: self.over_18.unwrap_or(false),
			removed,
		}
	}
}
