pub mod comments;
pub mod models;
pub mod quality;
pub mod query;
pub mod relevance;
pub mod sources;
pub mod text;

pub use models::{
	AnalyzedPost, Candidate, Comment, EngagementMetrics, RawComment, SearchPage, SearchParams,
	SearchRequest, SortMode, TimeWindow, WebResult,
};
pub use query::{MIN_QUERY_CHARS, QueryError};
pub use relevance::ScoredCandidate;
