use pulse_config::Filter;

use crate::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectLocked,
	RejectPinned,
	RejectSensitive,
	RejectRemoved,
	RejectLowScore,
	RejectFewComments,
	RejectThinContent,
}
impl RejectCode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::RejectLocked => "REJECT_LOCKED",
			Self::RejectPinned => "REJECT_PINNED",
			Self::RejectSensitive => "REJECT_SENSITIVE",
			Self::RejectRemoved => "REJECT_REMOVED",
			Self::RejectLowScore => "REJECT_LOW_SCORE",
			Self::RejectFewComments => "REJECT_FEW_COMMENTS",
			Self::RejectThinContent => "REJECT_THIN_CONTENT",
		}
	}
}

/// Structural and engagement gate applied before relevance scoring.
///
/// A candidate must show either substantive first-party text or strong secondary
/// engagement to be worth analyzing.
pub fn qualitygate(candidate: &Candidate, cfg: &Filter) -> Result<(), RejectCode> {
	if candidate.locked {
		return Err(RejectCode::RejectLocked);
	}
	if candidate.stickied {
		return Err(RejectCode::RejectPinned);
	}
	if candidate.over_18 {
		return Err(RejectCode::RejectSensitive);
	}
	if candidate.removed {
		return Err(RejectCode::RejectRemoved);
	}
	if candidate.score < cfg.min_score {
		return Err(RejectCode::RejectLowScore);
	}
	if candidate.num_comments < cfg.min_comments {
		return Err(RejectCode::RejectFewComments);
	}

	let substantive_body = candidate.selftext.trim().chars().count() > cfg.min_body_chars;
	let strong_engagement = candidate.num_comments > cfg.strong_engagement_comments
		&& candidate.upvote_ratio > cfg.min_upvote_ratio;

	if !substantive_body && !strong_engagement {
		return Err(RejectCode::RejectThinContent);
	}

	Ok(())
}

pub fn is_acceptable(candidate: &Candidate, cfg: &Filter) -> bool {
	qualitygate(candidate, cfg).is_ok()
}
