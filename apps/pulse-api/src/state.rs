use std::sync::Arc;

use pulse_service::PulseService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<PulseService>,
}
impl AppState {
	pub fn new(config: pulse_config::Config) -> Self {
		Self::from_service(PulseService::new(config))
	}

	pub fn from_service(service: PulseService) -> Self {
		Self { service: Arc::new(service) }
	}
}
