use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::help_requests::dtos::{
    CreateHelpRequestDto, HelpRequestCreatedDto, HelpRequestDetailDto, HelpRequestResponseDto,
    ListRequestsQuery, UpdateRequestStatusDto,
};
use crate::features::help_requests::models::RequestStatus;
use crate::features::help_requests::services::{HelpRequestService, MatchingService};
use crate::features::resources::models::ResourceType;
use crate::shared::types::{ApiResponse, Meta};

/// State for help request handlers
#[derive(Clone)]
pub struct HelpRequestState {
    pub help_request_service: Arc<HelpRequestService>,
    pub matching_service: Arc<MatchingService>,
}

/// Create a help request
///
/// Match suggestions are computed from the resource directory before the
/// write and returned alongside the stored request.
#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateHelpRequestDto,
    responses(
        (status = 201, description = "Help request created", body = ApiResponse<HelpRequestCreatedDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "help-requests"
)]
pub async fn create_help_request(
    State(state): State<HelpRequestState>,
    AppJson(dto): AppJson<CreateHelpRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<HelpRequestCreatedDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let data = dto.normalize()?;

    let suggestions = state
        .matching_service
        .suggest(data.category, data.lat.zip(data.lng))
        .await?;

    let request = state.help_request_service.create(&data, &suggestions).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(HelpRequestCreatedDto {
                request: request.into(),
                suggestions,
            }),
            None,
            None,
        )),
    ))
}

/// List help requests
#[utoipa::path(
    get,
    path = "/api/requests",
    params(ListRequestsQuery),
    responses(
        (status = 200, description = "List of help requests", body = ApiResponse<Vec<HelpRequestResponseDto>>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "help-requests"
)]
pub async fn list_help_requests(
    State(state): State<HelpRequestState>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<ApiResponse<Vec<HelpRequestResponseDto>>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<RequestStatus>)
        .transpose()
        .map_err(AppError::Validation)?;

    let category = query
        .category
        .as_deref()
        .map(str::parse::<ResourceType>)
        .transpose()
        .map_err(AppError::Validation)?;

    let requests = state.help_request_service.list(status, category).await?;
    let total = requests.len() as i64;

    let items: Vec<HelpRequestResponseDto> = requests
        .into_iter()
        .map(HelpRequestResponseDto::from)
        .collect();

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a help request with its timeline
#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Help request ID")
    ),
    responses(
        (status = 200, description = "Help request detail", body = ApiResponse<HelpRequestDetailDto>),
        (status = 404, description = "Help request not found")
    ),
    tag = "help-requests"
)]
pub async fn get_help_request(
    State(state): State<HelpRequestState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<HelpRequestDetailDto>>> {
    let (request, events) = state.help_request_service.get_with_timeline(id).await?;

    Ok(Json(ApiResponse::success(
        Some(HelpRequestDetailDto {
            request: request.into(),
            timeline: events.into_iter().map(Into::into).collect(),
        }),
        None,
        None,
    )))
}

/// Change the status of a help request
#[utoipa::path(
    patch,
    path = "/api/requests/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Help request ID")
    ),
    request_body = UpdateRequestStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<HelpRequestResponseDto>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Help request not found")
    ),
    tag = "help-requests"
)]
pub async fn update_request_status(
    State(state): State<HelpRequestState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateRequestStatusDto>,
) -> Result<Json<ApiResponse<HelpRequestResponseDto>>> {
    let status = dto
        .status
        .parse::<RequestStatus>()
        .map_err(AppError::Validation)?;

    let request = state.help_request_service.update_status(id, status).await?;

    Ok(Json(ApiResponse::success(
        Some(request.into()),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::help_requests::routes;
    use crate::features::resources::services::ResourceService;
    use crate::shared::test_helpers::lazy_test_pool;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn test_server() -> TestServer {
        let pool = lazy_test_pool();
        let help_request_service = Arc::new(HelpRequestService::new(pool.clone()));
        let matching_service = Arc::new(MatchingService::new(Arc::new(ResourceService::new(
            pool,
        ))));

        TestServer::new(routes::routes(help_request_service, matching_service)).unwrap()
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let server = test_server();

        let response = server
            .post("/api/requests")
            .json(&json!({
                "category": "magic",
                "title": "Need help",
                "contact": "999"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let server = test_server();

        let response = server
            .post("/api/requests")
            .json(&json!({
                "category": "hospital",
                "title": "",
                "contact": "999"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_change_rejects_unknown_status() {
        let server = test_server();

        let response = server
            .patch(&format!("/api/requests/{}/status", Uuid::new_v4()))
            .json(&json!({ "status": "DONE" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("status"));
    }
}
