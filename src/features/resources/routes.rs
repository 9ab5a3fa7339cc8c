use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::resources::handlers::{self, ResourceState};
use crate::features::resources::services::{DistanceMatrixService, ResourceService};

/// Create routes for the resources feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(
    resource_service: Arc<ResourceService>,
    distance_service: Arc<DistanceMatrixService>,
) -> Router {
    let state = ResourceState {
        resource_service,
        distance_service,
    };

    Router::new()
        .route(
            "/api/resources",
            get(handlers::list_resources).post(handlers::create_resource),
        )
        .route(
            "/api/resources/{id}",
            get(handlers::get_resource)
                .patch(handlers::update_resource)
                .delete(handlers::delete_resource),
        )
        .route(
            "/api/resources/{id}/report",
            post(handlers::report_resource),
        )
        .route(
            "/api/resources/{id}/upvote",
            post(handlers::upvote_resource),
        )
        .route(
            "/api/resources/{id}/reset-reports",
            post(handlers::reset_resource_reports),
        )
        .with_state(state)
}
