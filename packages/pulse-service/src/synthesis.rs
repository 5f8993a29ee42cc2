use serde::{Serialize, de::DeserializeOwned};

use pulse_config::{Config, Synthesis};
use pulse_domain::{AnalyzedPost, WebResult, text};
use pulse_providers::completion::CompletionRequest;

use crate::{CompletionProvider, Error, InsightReport, MarketResearchReport, Result, Stage};

const COMMENT_SEPARATOR: &str = " | ";

/// Per-variant sampling that replaces the provider defaults.
#[derive(Debug, Clone, Copy)]
struct Sampling {
	temperature: f32,
	max_tokens: u32,
}

/// One discussion as sent to the model. Text fields are capped before serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptItem {
	pub title: String,
	pub subreddit: String,
	pub content: String,
	pub comments: String,
	pub engagement: PromptEngagement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptEngagement {
	pub upvote_ratio: f64,
	pub comment_count: u64,
}

pub fn build_payload(posts: &[AnalyzedPost], cfg: &Synthesis) -> Vec<PromptItem> {
	posts
		.iter()
		.map(|post| {
			let joined = post
				.top_comments
				.iter()
				.map(|comment| comment.body.as_str())
				.collect::<Vec<_>>()
				.join(COMMENT_SEPARATOR);

			PromptItem {
				title: post.title.clone(),
				subreddit: post.subreddit.clone(),
				content: text::cap_chars(&post.snippet, cfg.content_chars),
				comments: text::cap_chars(&joined, cfg.comment_chars),
				engagement: PromptEngagement {
					upvote_ratio: post.engagement_metrics.upvote_ratio,
					comment_count: post.engagement_metrics.comment_count,
				},
			}
		})
		.collect()
}

pub fn insight_instructions(cfg: &Synthesis) -> String {
	format!(
		r#"You are a market research analyst. Analyze the supplied discussions and return marketing insights as a single JSON object with exactly this structure:
{{
  "overview": "Brief analysis of market dynamics and consumer behavior patterns",
  "recurring_pain_points": [
    {{ "issue": "Specific pain point", "frequency": 80, "impact_score": 75, "verbatim_quotes": ["User quotes"], "suggested_solutions": ["Actionable recommendations"], "sources": ["Discussion links supporting this finding"] }}
  ],
  "niche_communities": [
    {{ "segment": "Market segment", "demographic_indicators": ["Observable patterns"], "discussion_themes": ["Conversation topics"], "engagement_level": 85, "influence_score": 70, "key_influencers": ["Notable members"], "sources": ["Discussion links"] }}
  ],
  "sentiment_analysis": {{
    "overall_sentiment": 65,
    "emotional_triggers": [
      {{ "trigger": "Emotional catalyst", "intensity": 80, "context": "Situation analysis", "activation_phrases": ["Trigger phrases"] }}
    ],
    "brand_perception": {{ "positive_attributes": ["Strengths"], "negative_attributes": ["Concerns"], "neutral_observations": ["Observations"] }}
  }},
  "psychographic_insights": {{ "motivation_factors": ["Purchase drivers"], "decision_drivers": ["Decision factors"], "adoption_barriers": ["Obstacles"] }},
  "competitive_intelligence": {{ "market_positioning": "Landscape analysis", "share_of_voice": 65, "competitive_advantages": ["Advantages"], "threat_assessment": "Risk assessment" }},
  "sources": ["Every discussion link you relied on"]
}}
Scores are numbers from 0 to 100. Give creative, specific ideas rather than generic ones.
Provide exactly {pain_points} pain points, {communities} niche communities, and {triggers} emotional triggers."#,
		pain_points = cfg.pain_points,
		communities = cfg.communities,
		triggers = cfg.triggers,
	)
}

pub fn market_research_instructions(cfg: &Synthesis) -> String {
	format!(
		r#"You are a marketing analyst specializing in digital advertising and content strategy. Analyze the supplied search results and return an advertising research report as a single JSON object with this structure:
{{
  "executiveSummary": "Overview of the key advertising and content opportunities",
  "marketOverview": {{ "targetAudience": ["Segments"], "demographics": ["Characteristics"], "psychographics": ["Behavioral patterns"], "channels": ["Effective channels"] }},
  "trends": [
    {{ "title": "Trend name", "description": "Analysis of advertising potential", "impact": 80, "audience": ["Segments"], "platforms": ["Platforms"], "contentIdeas": ["Ideas"], "bestPractices": ["Practices"] }}
  ],
  "consumerInsights": [
    {{ "title": "Insight", "type": "consumer", "keyFindings": ["Findings"], "implications": ["Implications"], "opportunities": ["Opportunities"], "recommendations": ["Recommendations"] }}
  ],
  "industryInsights": [
    {{ "title": "Insight", "type": "industry", "keyFindings": ["Findings"], "implications": ["Implications"], "opportunities": ["Opportunities"], "recommendations": ["Recommendations"] }}
  ],
  "seasonalTopics": [
    {{ "topic": "Seasonal theme", "timing": "Window", "relevance": 70, "description": "Analysis", "marketingAngles": ["Angles"], "contentSuggestions": ["Suggestions"] }}
  ],
  "recommendations": {{ "contentStrategy": ["Strategies"], "timing": ["Timing"], "platforms": ["Platforms"], "messaging": ["Messaging"] }},
  "sources": ["Every result link you relied on"]
}}
Scores are numbers from 0 to 100. Give creative, specific ideas rather than generic ones.
Provide {trends} trends, {consumer} consumer insights, {industry} industry insights, and {seasonal} seasonal topics."#,
		trends = cfg.market_trends,
		consumer = cfg.consumer_insights,
		industry = cfg.industry_insights,
		seasonal = cfg.seasonal_topics,
	)
}

/// Sends the capped dataset to the model once and returns the repaired report.
pub async fn synthesize(
	completion: &dyn CompletionProvider,
	cfg: &Config,
	model: &str,
	query: &str,
	posts: &[AnalyzedPost],
	aggregate_sources: &[String],
) -> Result<InsightReport> {
	let payload = serde_json::json!({
		"query": query,
		"discussions": build_payload(posts, &cfg.synthesis),
	});
	let user = serde_json::to_string(&payload)
		.map_err(|err| Error::Internal { message: format!("Failed to encode payload: {err}.") })?;
	let system = insight_instructions(&cfg.synthesis);
	let content = request_completion(completion, cfg, model, &system, &user, None).await?;
	let mut report: InsightReport = parse_report(&content)?;

	report.repair_sources(aggregate_sources);

	tracing::info!(
		query_key = %crate::query_fingerprint(query),
		pain_points = report.recurring_pain_points.len(),
		communities = report.niche_communities.len(),
		triggers = report.sentiment_analysis.emotional_triggers.len(),
		sources = report.sources.len(),
		"Insight report synthesized."
	);

	Ok(report)
}

pub async fn synthesize_market_research(
	completion: &dyn CompletionProvider,
	cfg: &Config,
	model: &str,
	query: &str,
	results: &[WebResult],
	aggregate_sources: &[String],
) -> Result<MarketResearchReport> {
	let payload = serde_json::json!({ "query": query, "results": results });
	let user = serde_json::to_string(&payload)
		.map_err(|err| Error::Internal { message: format!("Failed to encode payload: {err}.") })?;
	let system = market_research_instructions(&cfg.synthesis);
	let sampling = Sampling {
		temperature: cfg.synthesis.research_temperature,
		max_tokens: cfg.synthesis.research_max_tokens,
	};
	let content =
		request_completion(completion, cfg, model, &system, &user, Some(sampling)).await?;
	let mut report: MarketResearchReport = parse_report(&content)?;

	report.sources = pulse_domain::sources::dedup_links(std::mem::take(&mut report.sources));

	if report.sources.is_empty() {
		report.sources = aggregate_sources.to_vec();
	}

	Ok(report)
}

/// Parses model output into a report. Surrounding prose, reasoning blocks and code fences
/// are tolerated; anything that does not parse as the declared shape is rejected.
pub fn parse_report<T>(content: &str) -> Result<T>
where
	T: DeserializeOwned,
{
	let Some(object) = extract_json_object(content) else {
		return Err(Error::SynthesisParse {
			message: "Model output does not contain a JSON object.".to_string(),
		});
	};

	serde_json::from_str(object).map_err(|err| Error::SynthesisParse { message: err.to_string() })
}

async fn request_completion(
	completion: &dyn CompletionProvider,
	cfg: &Config,
	model: &str,
	system: &str,
	user: &str,
	sampling: Option<Sampling>,
) -> Result<String> {
	let request = CompletionRequest {
		model,
		system,
		user,
		json_object: true,
		temperature: sampling.map(|sampling| sampling.temperature),
		max_tokens: sampling.map(|sampling| sampling.max_tokens),
	};

	tracing::debug!(model, payload_bytes = user.len(), "Requesting synthesis.");

	completion
		.complete(&cfg.providers.llm, &request)
		.await
		.map_err(|err| Error::from_provider(Stage::Synthesis, err))
}

fn extract_json_object(content: &str) -> Option<&str> {
	let trimmed = content.trim();
	let without_reasoning = match trimmed.rfind("</think>") {
		Some(end) => &trimmed[end + "</think>".len()..],
		None => trimmed,
	};
	let start = without_reasoning.find('{')?;
	let end = without_reasoning.rfind('}')?;

	if end < start {
		return None;
	}

	Some(&without_reasoning[start..=end])
}
