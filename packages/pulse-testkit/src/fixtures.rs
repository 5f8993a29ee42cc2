//! JSON builders shaped like the upstream payloads.

use serde_json::{Value, json};

pub fn token() -> Value {
	json!({ "access_token": "test-token", "token_type": "bearer", "expires_in": 86_400, "scope": "*" })
}

pub fn permalink(id: &str) -> String {
	format!("/r/SkincareAddiction/comments/{id}/")
}

/// A post that clears the quality gate and scores well for "skincare".
pub fn post(id: &str, title: &str) -> Value {
	json!({
		"id": id,
		"title": title,
		"subreddit": "SkincareAddiction",
		"selftext": format!("{title}. {}", "Long first-hand experience with products and routines. ".repeat(3)),
		"permalink": permalink(id),
		"url": format!("https://www.reddit.com{}", permalink(id)),
		"score": 50,
		"num_comments": 20,
		"upvote_ratio": 0.95,
		"total_awards_received": 1,
		"created_utc": 1_700_000_000.0,
		"locked": false,
		"stickied": false,
		"over_18": false,
		"removed_by_category": null
	})
}

/// A post that the quality gate rejects.
pub fn locked_post(id: &str, title: &str) -> Value {
	let mut value = post(id, title);

	value["locked"] = json!(true);

	value
}

pub fn listing(posts: Vec<Value>, after: Option<&str>) -> Value {
	let children: Vec<Value> = posts.into_iter().map(|data| json!({ "kind": "t3", "data": data })).collect();

	json!({ "kind": "Listing", "data": { "after": after, "children": children } })
}

pub fn comment(body: &str, score: i64) -> Value {
	json!({
		"kind": "t1",
		"data": { "body": body, "score": score, "author": "commenter", "stickied": false }
	})
}

pub fn comments_envelope(comments: Vec<Value>) -> Value {
	json!([
		{ "kind": "Listing", "data": { "children": [{ "kind": "t3", "data": {} }] } },
		{ "kind": "Listing", "data": { "children": comments } }
	])
}

pub fn chat_completion(content: &str) -> Value {
	json!({
		"id": "cmpl-test",
		"choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
	})
}

/// Insight report with the requested cardinalities. `sources` is omitted when `None`.
pub fn insight_report(
	pain_points: usize,
	communities: usize,
	triggers: usize,
	sources: Option<Vec<&str>>,
) -> Value {
	let pain_points: Vec<Value> = (0..pain_points)
		.map(|index| {
			json!({
				"issue": format!("Pain point {index}"),
				"frequency": 80,
				"impact_score": 70,
				"verbatim_quotes": ["It stings."],
				"suggested_solutions": ["Fragrance-free line."],
				"sources": ["https://not-cited.example.com/x"]
			})
		})
		.collect();
	let communities: Vec<Value> = (0..communities)
		.map(|index| {
			json!({
				"segment": format!("Segment {index}"),
				"demographic_indicators": ["20s"],
				"discussion_themes": ["routines"],
				"engagement_level": 85,
				"influence_score": 60,
				"key_influencers": []
			})
		})
		.collect();
	let triggers: Vec<Value> = (0..triggers)
		.map(|index| {
			json!({
				"trigger": format!("Trigger {index}"),
				"intensity": 75,
				"context": "Breakouts before events.",
				"activation_phrases": ["finally cleared"]
			})
		})
		.collect();
	let mut report = json!({
		"overview": "Consumers want gentle routines.",
		"recurring_pain_points": pain_points,
		"niche_communities": communities,
		"sentiment_analysis": {
			"overall_sentiment": 62,
			"emotional_triggers": triggers,
			"brand_perception": {
				"positive_attributes": ["gentle"],
				"negative_attributes": ["pricey"],
				"neutral_observations": []
			}
		},
		"psychographic_insights": {
			"motivation_factors": ["confidence"],
			"decision_drivers": ["reviews"],
			"adoption_barriers": ["price"]
		},
		"competitive_intelligence": {
			"market_positioning": "Crowded mid-market.",
			"share_of_voice": 40,
			"competitive_advantages": ["derm-backed"],
			"threat_assessment": "Private labels."
		}
	});

	if let Some(sources) = sources {
		report["sources"] = json!(sources);
	}

	report
}

pub fn web_results(count: usize) -> Value {
	let items: Vec<Value> = (0..count)
		.map(|index| {
			json!({
				"title": format!("**Trend** {index}"),
				"snippet": format!("Snippet {index} see https://tracking.example.com/{index}"),
				"link": format!("https://news.example.com/{}", index % 3)
			})
		})
		.collect();

	json!({ "kind": "customsearch#search", "items": items })
}

pub fn market_research_report() -> Value {
	json!({
		"executiveSummary": "<p>Short video dominates.</p>",
		"marketOverview": {
			"targetAudience": ["Gen Z"],
			"demographics": ["18-24"],
			"psychographics": ["value seekers"],
			"channels": ["Instagram"]
		},
		"trends": [{
			"title": "Reels",
			"description": "Creators drive discovery.",
			"impact": "85",
			"audience": ["students"],
			"platforms": ["Instagram"],
			"contentIdeas": ["Before/after"],
			"bestPractices": ["Hook in 2s"]
		}],
		"consumerInsights": [{
			"title": "Price sensitivity",
			"type": "consumer",
			"keyFindings": ["Bundles win"],
			"implications": ["Lead with value"],
			"opportunities": ["Combo packs"],
			"recommendations": ["Show savings"]
		}],
		"industryInsights": [],
		"seasonalTopics": [{
			"topic": "Festive gifting",
			"timing": "October",
			"relevance": 90,
			"description": "Gift sets peak.",
			"marketingAngles": ["Gift guides"],
			"contentSuggestions": ["Unboxing"]
		}],
		"recommendations": {
			"contentStrategy": ["UGC"],
			"timing": ["Evenings"],
			"platforms": ["YouTube Shorts"],
			"messaging": ["Gentle and effective"]
		}
	})
}
