use pulse_config::Enrichment;

use crate::{Comment, RawComment, text};

pub const COMMENT_KIND: &str = "t1";

const TOMBSTONES: [&str; 2] = ["[deleted]", "[removed]"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentRejectCode {
	RejectKind,
	RejectEmpty,
	RejectShort,
	RejectPinned,
	RejectTombstone,
	RejectScore,
}
impl CommentRejectCode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::RejectKind => "REJECT_KIND",
			Self::RejectEmpty => "REJECT_EMPTY",
			Self::RejectShort => "REJECT_SHORT",
			Self::RejectPinned => "REJECT_PINNED",
			Self::RejectTombstone => "REJECT_TOMBSTONE",
			Self::RejectScore => "REJECT_SCORE",
		}
	}
}

pub fn commentgate(comment: &RawComment, cfg: &Enrichment) -> Result<(), CommentRejectCode> {
	if comment.kind != COMMENT_KIND {
		return Err(CommentRejectCode::RejectKind);
	}

	let body = comment.body.trim();

	if body.is_empty() {
		return Err(CommentRejectCode::RejectEmpty);
	}
	if TOMBSTONES.contains(&body) {
		return Err(CommentRejectCode::RejectTombstone);
	}
	if body.chars().count() < cfg.min_comment_chars {
		return Err(CommentRejectCode::RejectShort);
	}
	if comment.stickied {
		return Err(CommentRejectCode::RejectPinned);
	}
	if comment.score <= 0 {
		return Err(CommentRejectCode::RejectScore);
	}

	Ok(())
}

/// Keeps genuine, positively scored comments, highest score first, capped at `max_comments`.
///
/// Bodies are cleaned before storage; a comment whose cleaned body is empty or shorter than
/// `min_comment_chars` is dropped.
pub fn select_comments(raw: Vec<RawComment>, cfg: &Enrichment) -> Vec<Comment> {
	let mut kept: Vec<RawComment> =
		raw.into_iter().filter(|comment| commentgate(comment, cfg).is_ok()).collect();

	kept.sort_by(|a, b| b.score.cmp(&a.score));

	kept.into_iter()
		.filter_map(|comment| {
			let body = text::clean(&comment.body);

			if body.is_empty() || body.chars().count() < cfg.min_comment_chars {
				return None;
			}

			Some(Comment { body, score: comment.score, author: comment.author })
		})
		.take(cfg.max_comments)
		.collect()
}
