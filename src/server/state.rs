use std::sync::Arc;

use crate::config::{CredentialCheck, SearchSettings};
use crate::pipeline::RemixRadarPipeline;

/// Shared server state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RemixRadarPipeline>,
    pub search: SearchSettings,
    pub credentials: Vec<CredentialCheck>,
}
