//! Report shapes returned by the language model. Structural fields are required; scores and
//! string lists fall back to defaults so minor model drift still parses.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
	pub overview: String,
	pub recurring_pain_points: Vec<PainPoint>,
	pub niche_communities: Vec<NicheCommunity>,
	pub sentiment_analysis: SentimentAnalysis,
	#[serde(default)]
	pub psychographic_insights: PsychographicInsights,
	#[serde(default)]
	pub competitive_intelligence: CompetitiveIntelligence,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub sources: Vec<String>,
}
impl InsightReport {
	/// Fills an empty citation list from `aggregate` and keeps every finding-level list
	/// within the report's citation list.
	pub fn repair_sources(&mut self, aggregate: &[String]) {
		self.sources = pulse_domain::sources::dedup_links(std::mem::take(&mut self.sources));

		if self.sources.is_empty() {
			self.sources = aggregate.to_vec();
		}

		let allowed: HashSet<String> = self.sources.iter().cloned().collect();

		for point in &mut self.recurring_pain_points {
			restrict(&mut point.sources, &allowed);
		}
		for community in &mut self.niche_communities {
			restrict(&mut community.sources, &allowed);
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainPoint {
	pub issue: String,
	#[serde(default, deserialize_with = "lenient_score")]
	pub frequency: f64,
	#[serde(default, deserialize_with = "lenient_score")]
	pub impact_score: f64,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub verbatim_quotes: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub suggested_solutions: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicheCommunity {
	pub segment: String,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub demographic_indicators: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub discussion_themes: Vec<String>,
	#[serde(default, deserialize_with = "lenient_score")]
	pub engagement_level: f64,
	#[serde(default, deserialize_with = "lenient_score")]
	pub influence_score: f64,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub key_influencers: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
	#[serde(default, deserialize_with = "lenient_score")]
	pub overall_sentiment: f64,
	pub emotional_triggers: Vec<EmotionalTrigger>,
	#[serde(default)]
	pub brand_perception: BrandPerception,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalTrigger {
	pub trigger: String,
	#[serde(default, deserialize_with = "lenient_score")]
	pub intensity: f64,
	#[serde(default)]
	pub context: String,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub activation_phrases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandPerception {
	#[serde(default, deserialize_with = "lenient_strings")]
	pub positive_attributes: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub negative_attributes: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub neutral_observations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PsychographicInsights {
	#[serde(default, deserialize_with = "lenient_strings")]
	pub motivation_factors: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub decision_drivers: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub adoption_barriers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveIntelligence {
	#[serde(default)]
	pub market_positioning: String,
	#[serde(default, deserialize_with = "lenient_score")]
	pub share_of_voice: f64,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub competitive_advantages: Vec<String>,
	#[serde(default)]
	pub threat_assessment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketResearchReport {
	pub executive_summary: String,
	#[serde(default)]
	pub market_overview: MarketOverview,
	#[serde(default)]
	pub trends: Vec<TrendCard>,
	#[serde(default)]
	pub consumer_insights: Vec<InsightCard>,
	#[serde(default)]
	pub industry_insights: Vec<InsightCard>,
	#[serde(default)]
	pub seasonal_topics: Vec<SeasonalCard>,
	#[serde(default)]
	pub recommendations: Recommendations,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub sources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
	#[serde(default, deserialize_with = "lenient_strings")]
	pub target_audience: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub demographics: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub psychographics: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub channels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendCard {
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default, deserialize_with = "lenient_score")]
	pub impact: f64,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub audience: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub platforms: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub content_ideas: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub best_practices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightCard {
	pub title: String,
	#[serde(default, rename = "type")]
	pub kind: String,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub key_findings: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub implications: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub opportunities: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalCard {
	pub topic: String,
	#[serde(default)]
	pub timing: String,
	#[serde(default, deserialize_with = "lenient_score")]
	pub relevance: f64,
	#[serde(default)]
	pub description: String,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub marketing_angles: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub content_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
	#[serde(default, deserialize_with = "lenient_strings")]
	pub content_strategy: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub timing: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub platforms: Vec<String>,
	#[serde(default, deserialize_with = "lenient_strings")]
	pub messaging: Vec<String>,
}

fn restrict(sources: &mut Option<Vec<String>>, allowed: &HashSet<String>) {
	if let Some(list) = sources.as_mut() {
		*list = pulse_domain::sources::dedup_links(std::mem::take(list))
			.into_iter()
			.filter(|link| allowed.contains(link))
			.collect();
	}
}

/// Accepts numbers and numeric strings such as `"85"` or `"85%"`; anything else reads as 0.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;
	let score = match value {
		Value::Number(number) => number.as_f64().unwrap_or(0.0),
		Value::String(text) => {
			let digits: String = text
				.trim()
				.chars()
				.take_while(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
				.collect();

			digits.parse().unwrap_or(0.0)
		},
		_ => 0.0,
	};

	Ok(if score.is_finite() { score } else { 0.0 })
}

/// Accepts a list of strings, a single string, or null. Non-string list items are rendered.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;
	let items = match value {
		Value::Array(items) => items
			.into_iter()
			.filter_map(|item| match item {
				Value::String(text) => Some(text),
				Value::Null => None,
				other => Some(other.to_string()),
			})
			.collect(),
		Value::String(text) if !text.trim().is_empty() => vec![text],
		_ => Vec::new(),
	};

	Ok(items)
}
