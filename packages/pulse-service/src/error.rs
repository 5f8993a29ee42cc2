use std::fmt;

use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
	Auth,
	Fetch,
	Filter,
	Enrichment,
	Synthesis,
}
impl Stage {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Auth => "auth",
			Self::Fetch => "fetch",
			Self::Filter => "filter",
			Self::Enrichment => "enrichment",
			Self::Synthesis => "synthesis",
		}
	}
}
impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Pipeline failure. Owned data only, so one failure can be handed to every caller that
/// shares an in-flight run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Configuration error: {message}")]
	Config { message: String },
	#[error("Authentication failed after {attempts} attempt(s): {message}")]
	Auth { attempts: u32, status: Option<u16>, message: String },
	#[error("Upstream {stage} request failed with HTTP {status}: {body}")]
	Fetch { stage: Stage, status: u16, body: String },
	#[error("Upstream {stage} transport error: {message}")]
	Transport { stage: Stage, message: String },
	#[error("Upstream {stage} response is not recognized: {message}")]
	UpstreamShape { stage: Stage, message: String },
	#[error("No candidates remained after the {stage} stage.")]
	NoCandidates { stage: Stage },
	#[error("Synthesis response is not a valid report: {message}")]
	SynthesisParse { message: String },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl Error {
	pub fn stage(&self) -> Option<Stage> {
		match self {
			Self::Auth { .. } => Some(Stage::Auth),
			Self::Fetch { stage, .. }
			| Self::Transport { stage, .. }
			| Self::UpstreamShape { stage, .. }
			| Self::NoCandidates { stage } => Some(*stage),
			Self::SynthesisParse { .. } => Some(Stage::Synthesis),
			Self::InvalidQuery { .. } | Self::Config { .. } | Self::Internal { .. } => None,
		}
	}

	/// Whether repeating the same request later may succeed. Input and configuration problems
	/// never are.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Transport { .. } => true,
			Self::Fetch { status, .. } => *status == 429 || *status >= 500,
			Self::Auth { status, .. } => status.is_none_or(|status| status == 429 || status >= 500),
			Self::SynthesisParse { .. } => true,
			_ => false,
		}
	}

	pub(crate) fn from_provider(stage: Stage, err: pulse_providers::Error) -> Self {
		use pulse_providers::Error as ProviderError;

		match err {
			ProviderError::Auth { attempts, status, message } => Self::Auth { attempts, status, message },
			ProviderError::Status { status, body } => Self::Fetch { stage, status, body },
			ProviderError::UnrecognizedShape { message } => Self::UpstreamShape { stage, message },
			ProviderError::InvalidConfig { message } => Self::Config { message },
			ProviderError::InvalidHeaderName(err) => Self::Config { message: err.to_string() },
			ProviderError::InvalidHeaderValue(err) => Self::Config { message: err.to_string() },
			ProviderError::Reqwest(err) if err.is_decode() => Self::malformed(stage, err.to_string()),
			ProviderError::Reqwest(err) => Self::Transport { stage, message: err.to_string() },
			ProviderError::SerdeJson(err) => Self::malformed(stage, err.to_string()),
			ProviderError::InvalidResponse { message } => Self::malformed(stage, message),
		}
	}

	fn malformed(stage: Stage, message: String) -> Self {
		match stage {
			Stage::Synthesis => Self::SynthesisParse { message },
			_ => Self::UpstreamShape { stage, message },
		}
	}
}
impl From<pulse_domain::QueryError> for Error {
	fn from(err: pulse_domain::QueryError) -> Self {
		Self::InvalidQuery { message: err.to_string() }
	}
}
