pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("Credential exchange failed after {attempts} attempt(s): {message}")]
	Auth { attempts: u32, status: Option<u16>, message: String },
	#[error("Upstream returned HTTP {status}: {body}")]
	Status { status: u16, body: String },
	#[error("{message}")]
	UnrecognizedShape { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	/// Transport failures, throttling and upstream 5xx responses may succeed on a later try.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Reqwest(err) => err.is_timeout() || err.is_connect() || err.is_request(),
			Self::Status { status, .. } => *status == 429 || *status >= 500,
			Self::Auth { status, .. } => status.is_none_or(|status| status == 429 || status >= 500),
			_ => false,
		}
	}

	/// HTTP status attached to the failure, when the upstream produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Auth { status, .. } => *status,
			Self::Reqwest(err) => err.status().map(|status| status.as_u16()),
			_ => None,
		}
	}
}
