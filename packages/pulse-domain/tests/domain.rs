use pulse_config::{Enrichment, Filter, Ranking};
use pulse_domain::{
	AnalyzedPost, Candidate, RawComment, comments, quality, query, relevance, sources, text,
};

fn candidate(title: &str, body: &str) -> Candidate {
	Candidate {
		id: "abc".to_string(),
		title: title.to_string(),
		subreddit: "SkincareAddiction".to_string(),
		selftext: body.to_string(),
		permalink: "/r/SkincareAddiction/comments/abc/post/".to_string(),
		url: "https://reddit.com/r/SkincareAddiction/comments/abc/post/".to_string(),
		score: 40,
		num_comments: 12,
		upvote_ratio: 0.93,
		..Default::default()
	}
}

#[test]
fn clean_is_idempotent_over_noisy_samples() {
	let samples = [
		"",
		"plain text",
		"**bold** *it* __under__ [label](https://x.y/z) https://a.b/c www.d.e",
		"# Title\n\n\n\n\nbody\r\n\r\n\r\nmore",
		"***triple*** [[nested](a)](b) ** stray **",
		"  ###### deep header\n####### seven hashes",
		"[empty]() and [spaced](not a link)",
		"line\n \n \n \nline",
	];

	for sample in samples {
		let once = text::clean(sample);

		assert_eq!(text::clean(&once), once, "Not idempotent for {sample:?}.");
	}
}

#[test]
fn clean_never_reintroduces_urls() {
	let samples = [
		"see https://example.com/a and [label](https://example.com/b)",
		"http**s://split.example.com** then text",
		"[https://label.example.com](https://target.example.com)",
	];

	for sample in samples {
		let cleaned = text::clean(sample);

		assert!(!cleaned.contains("http://"), "URL survived in {cleaned:?}.");
		assert!(!cleaned.contains("https://"), "URL survived in {cleaned:?}.");
	}
}

#[test]
fn quality_gate_boolean_combination() {
	let cfg = Filter::default();
	let long_body = "x".repeat(101);
	let exact_body = "x".repeat(100);

	// Substantive body alone is enough once the floors hold.
	assert!(quality::is_acceptable(
		&Candidate { num_comments: 2, upvote_ratio: 0.1, ..candidate("t", &long_body) },
		&cfg
	));
	// Body at the threshold is not substantive.
	assert!(!quality::is_acceptable(
		&Candidate { num_comments: 2, upvote_ratio: 0.99, ..candidate("t", &exact_body) },
		&cfg
	));
	// Strong engagement needs both more than 10 comments and a ratio above 0.6.
	assert!(!quality::is_acceptable(
		&Candidate { num_comments: 10, upvote_ratio: 0.99, ..candidate("t", "") },
		&cfg
	));
	assert!(quality::is_acceptable(
		&Candidate { num_comments: 11, upvote_ratio: 0.61, ..candidate("t", "") },
		&cfg
	));
	// The comment floor applies even to substantive posts.
	assert!(!quality::is_acceptable(
		&Candidate { num_comments: 1, ..candidate("t", &long_body) },
		&cfg
	));
}

#[test]
fn scores_are_non_negative_and_favor_leading_matches() {
	let cfg = Ranking::default();
	let queries = ["skincare", "dry skin routine", "!!", "retinol vs vitamin c"];

	for query in queries {
		for post in [
			candidate("Skincare for dry skin", "routine routine routine"),
			candidate("", ""),
			Candidate { score: -10, num_comments: 0, ..candidate("Nothing", "") },
		] {
			assert!(relevance::score(&post, query, &cfg) >= 0.0);
		}
	}

	let lead = relevance::score(&candidate("Retinol questions", ""), "retinol", &cfg);
	let mid = relevance::score(&candidate("Questions about retinol", ""), "retinol", &cfg);

	assert!(lead >= mid);
}

#[test]
fn rank_keeps_fetch_order_for_ties() {
	let cfg = Ranking::default();
	let candidates = vec![
		Candidate { id: "first".to_string(), ..candidate("About serum", "") },
		Candidate { id: "second".to_string(), ..candidate("About serum", "") },
		Candidate { id: "third".to_string(), ..candidate("About serum", "") },
	];
	let ranked = relevance::rank(candidates, "serum", &cfg);
	let ids: Vec<&str> = ranked.iter().map(|scored| scored.candidate.id.as_str()).collect();

	assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn analyzed_post_carries_cleaned_fields() {
	let comments = comments::select_comments(
		vec![RawComment {
			kind: "t1".to_string(),
			body: "**Great** for barrier repair".to_string(),
			score: 5,
			author: "someone".to_string(),
			stickied: false,
		}],
		&Enrichment::default(),
	);
	let post = AnalyzedPost::from_candidate(
		&candidate("**Bold** title", &"word ".repeat(100)),
		comments,
		Enrichment::default().snippet_chars,
	);

	assert_eq!(post.title, "Bold title");
	assert!(post.snippet.ends_with("..."));
	assert_eq!(post.link, "https://reddit.com/r/SkincareAddiction/comments/abc/post/");
	assert!(post.url.is_none());
	assert_eq!(post.top_comments[0].body, "Great for barrier repair");
	assert_eq!(post.engagement_metrics.comment_count, 12);
}

#[test]
fn sources_never_contain_duplicates() {
	let base = AnalyzedPost::from_candidate(&candidate("a", ""), Vec::new(), 300);
	let external = AnalyzedPost {
		url: Some("https://example.com/guide".to_string()),
		..base.clone()
	};
	let collected = sources::collect_sources(&[base.clone(), external, base]);

	assert_eq!(collected.len(), 2);

	let mut unique = collected.clone();

	unique.sort();
	unique.dedup();

	assert_eq!(unique.len(), collected.len());
}

#[test]
fn query_validation_precedes_terms() {
	assert!(query::validate_query(" x ").is_err());
	assert_eq!(query::query_terms("Dry-Skin dry SKIN"), vec!["dry", "skin"]);
}
