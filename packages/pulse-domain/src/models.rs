use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::text;

const CANONICAL_ORIGIN: &str = "https://reddit.com";

/// A raw item returned by the discussion search source, before any filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
	pub id: String,
	pub title: String,
	pub subreddit: String,
	pub selftext: String,
	pub permalink: String,
	pub url: String,
	pub score: i64,
	pub num_comments: u64,
	pub upvote_ratio: f64,
	pub awards: u64,
	pub created_utc: f64,
	pub locked: bool,
	pub stickied: bool,
	pub over_18: bool,
	pub removed: bool,
}
impl Candidate {
	/// Platform link for the discussion thread, falling back to the external URL for
	/// items that carry no permalink.
	pub fn canonical_link(&self) -> String {
		let permalink = self.permalink.trim();

		if permalink.is_empty() {
			return self.url.trim().to_string();
		}
		if permalink.starts_with('/') {
			format!("{CANONICAL_ORIGIN}{permalink}")
		} else {
			format!("{CANONICAL_ORIGIN}/{permalink}")
		}
	}
}

/// One secondary discussion item as delivered by the comment tree endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawComment {
	pub kind: String,
	pub body: String,
	pub score: i64,
	pub author: String,
	pub stickied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
	pub body: String,
	pub score: i64,
	pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
	pub score: i64,
	pub upvote_ratio: f64,
	pub comment_count: u64,
	pub awards: u64,
}

/// A candidate that survived filtering, ranking and enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPost {
	pub title: String,
	pub subreddit: String,
	pub snippet: String,
	pub link: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	pub engagement_metrics: EngagementMetrics,
	pub top_comments: Vec<Comment>,
}
impl AnalyzedPost {
	pub fn from_candidate(
		candidate: &Candidate,
		top_comments: Vec<Comment>,
		snippet_chars: usize,
	) -> Self {
		let link = candidate.canonical_link();
		let external = candidate.url.trim();
		let url = if external.is_empty() || external == link {
			None
		} else {
			Some(external.to_string())
		};

		Self {
			title: text::clean(&candidate.title),
			subreddit: candidate.subreddit.clone(),
			snippet: text::snippet(&candidate.selftext, snippet_chars),
			link,
			url,
			engagement_metrics: EngagementMetrics {
				score: candidate.score,
				upvote_ratio: candidate.upvote_ratio,
				comment_count: candidate.num_comments,
				awards: candidate.awards,
			},
			top_comments,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
	pub title: String,
	pub snippet: String,
	pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
	Relevance,
	Hot,
	New,
	Top,
	Comments,
}
impl SortMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Relevance => "relevance",
			Self::Hot => "hot",
			Self::New => "new",
			Self::Top => "top",
			Self::Comments => "comments",
		}
	}
}
impl FromStr for SortMode {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim() {
			"relevance" => Ok(Self::Relevance),
			"hot" => Ok(Self::Hot),
			"new" => Ok(Self::New),
			"top" => Ok(Self::Top),
			"comments" => Ok(Self::Comments),
			other => Err(format!("Unknown sort mode: {other}.")),
		}
	}
}
impl fmt::Display for SortMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
	Hour,
	Day,
	Week,
	Month,
	Year,
	All,
}
impl TimeWindow {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Hour => "hour",
			Self::Day => "day",
			Self::Week => "week",
			Self::Month => "month",
			Self::Year => "year",
			Self::All => "all",
		}
	}
}
impl FromStr for TimeWindow {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim() {
			"hour" => Ok(Self::Hour),
			"day" => Ok(Self::Day),
			"week" => Ok(Self::Week),
			"month" => Ok(Self::Month),
			"year" => Ok(Self::Year),
			"all" => Ok(Self::All),
			other => Err(format!("Unknown time window: {other}.")),
		}
	}
}
impl fmt::Display for TimeWindow {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Optional caller-supplied search parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
	#[serde(default)]
	pub sort: Option<SortMode>,
	#[serde(default)]
	pub time_window: Option<TimeWindow>,
	#[serde(default)]
	pub limit: Option<u32>,
	#[serde(default)]
	pub after: Option<String>,
}
impl SearchParams {
	/// Fills every unset parameter from the configured defaults.
	pub fn resolve(&self, cfg: &pulse_config::Search) -> SearchRequest {
		let sort = self
			.sort
			.or_else(|| cfg.default_sort.parse().ok())
			.unwrap_or(SortMode::Relevance);
		let time_window = self
			.time_window
			.or_else(|| cfg.default_time_window.parse().ok())
			.unwrap_or(TimeWindow::Year);
		let limit = self.limit.unwrap_or(cfg.page_limit).clamp(1, 100);
		let after = self.after.as_deref().map(str::trim).filter(|value| !value.is_empty());

		SearchRequest { sort, time_window, limit, after: after.map(str::to_string) }
	}
}

/// Fully resolved parameters for one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
	pub sort: SortMode,
	pub time_window: TimeWindow,
	pub limit: u32,
	pub after: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
	pub candidates: Vec<Candidate>,
	pub after: Option<String>,
}
