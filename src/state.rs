use axum::extract::FromRef;

use std::sync::Arc;

use crate::{service::NoteService, telemetry::Telemetry};

/// Built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    service: Arc<NoteService>,
    telemetry: Telemetry,
}

impl AppState {
    pub fn new(service: NoteService, telemetry: Telemetry) -> Self {
        Self {
            service: Arc::new(service),
            telemetry,
        }
    }

    pub const fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }
}

impl FromRef<AppState> for Arc<NoteService> {
    fn from_ref(state: &AppState) -> Self {
        state.service.clone()
    }
}
