use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::help_requests::handlers::{self, HelpRequestState};
use crate::features::help_requests::services::{HelpRequestService, MatchingService};

/// Create routes for the help requests feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(
    help_request_service: Arc<HelpRequestService>,
    matching_service: Arc<MatchingService>,
) -> Router {
    let state = HelpRequestState {
        help_request_service,
        matching_service,
    };

    Router::new()
        .route(
            "/api/requests",
            get(handlers::list_help_requests).post(handlers::create_help_request),
        )
        .route("/api/requests/{id}", get(handlers::get_help_request))
        .route(
            "/api/requests/{id}/status",
            patch(handlers::update_request_status),
        )
        .with_state(state)
}
