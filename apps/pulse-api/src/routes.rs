use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use pulse_service::{
	AnalyzeRequest, AnalyzeResponse, Error, MarketResearchRequest, MarketResearchResponse, Stage,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/analyze", post(analyze))
		.route("/v1/research", post(research))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn analyze(
	State(state): State<AppState>,
	Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
	let response = state.service.analyze(payload).await?;

	Ok(Json(response))
}

async fn research(
	State(state): State<AppState>,
	Json(payload): Json<MarketResearchRequest>,
) -> Result<Json<MarketResearchResponse>, ApiError> {
	let response = state.service.research_market(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	stage: Option<Stage>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
	stage: Option<Stage>,
}
impl ApiError {
	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn error_code(&self) -> &'static str {
		self.error_code
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let (status, error_code) = match &err {
			Error::InvalidQuery { .. } => (StatusCode::BAD_REQUEST, "invalid_query"),
			Error::Config { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
			Error::Auth { .. } => (StatusCode::BAD_GATEWAY, "auth_failed"),
			Error::Fetch { .. } => (StatusCode::BAD_GATEWAY, "upstream_status"),
			Error::UpstreamShape { .. } => (StatusCode::BAD_GATEWAY, "upstream_shape"),
			Error::Transport { .. } => (StatusCode::GATEWAY_TIMEOUT, "upstream_transport"),
			Error::NoCandidates { .. } => (StatusCode::NOT_FOUND, "no_candidates"),
			Error::SynthesisParse { .. } => (StatusCode::BAD_GATEWAY, "synthesis_parse"),
			Error::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
		};

		if status.is_server_error() {
			tracing::warn!(error_code, stage = ?err.stage(), error = %err, "Request failed.");
		}

		Self { status, error_code, message: err.to_string(), stage: err.stage() }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code.to_string(), message: self.message, stage: self.stage };

		(self.status, Json(body)).into_response()
	}
}
