use std::collections::HashSet;

use url::Url;

use crate::AnalyzedPost;

/// Citation list for a set of results: every canonical link plus each distinct external URL
/// that does not point back at the platform hosting the canonical link.
///
/// Entries are unique and keep the order of first appearance.
pub fn collect_sources(posts: &[AnalyzedPost]) -> Vec<String> {
	let mut links = Vec::with_capacity(posts.len() * 2);

	for post in posts {
		links.push(post.link.clone());

		if let Some(external) = post.url.as_deref() {
			if is_external_citation(&post.link, external) {
				links.push(external.to_string());
			}
		}
	}

	dedup_links(links)
}

/// Drops blank entries and exact duplicates, preserving first-seen order.
pub fn dedup_links<I>(links: I) -> Vec<String>
where
	I: IntoIterator<Item = String>,
{
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for link in links {
		let link = link.trim().to_string();

		if link.is_empty() {
			continue;
		}
		if seen.insert(link.clone()) {
			out.push(link);
		}
	}

	out
}

fn is_external_citation(canonical: &str, external: &str) -> bool {
	let external = external.trim();

	if external.is_empty() || external == canonical.trim() {
		return false;
	}

	let Some(external_host) = web_host(external) else {
		return false;
	};

	match web_host(canonical) {
		Some(canonical_host) => !same_site(&canonical_host, &external_host),
		None => true,
	}
}

fn web_host(raw: &str) -> Option<String> {
	let parsed = Url::parse(raw).ok()?;

	if !matches!(parsed.scheme(), "http" | "https") {
		return None;
	}

	let host = parsed.host_str()?.to_ascii_lowercase();
	let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

	Some(host)
}

fn same_site(canonical_host: &str, external_host: &str) -> bool {
	external_host == canonical_host
		|| external_host
			.strip_suffix(canonical_host)
			.is_some_and(|prefix| prefix.ends_with('.'))
}
