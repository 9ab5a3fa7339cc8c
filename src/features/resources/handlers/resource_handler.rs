use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::resources::dtos::{
    CreateResourcePayload, ListResourcesQuery, ReportOutcomeDto, ResourceResponseDto,
    UpdateResourceDto, UpvoteOutcomeDto,
};
use crate::features::resources::models::VerificationLevel;
use crate::features::resources::services::{
    DistanceMatrixService, MetadataPredicate, ResourceFilters, ResourceService,
};
use crate::shared::constants::DURATION_SORT_SENTINEL_MIN;
use crate::shared::types::{ApiResponse, Meta};

/// State for resource handlers
#[derive(Clone)]
pub struct ResourceState {
    pub resource_service: Arc<ResourceService>,
    pub distance_service: Arc<DistanceMatrixService>,
}

/// Translate query parameters into a store filter request
fn build_filters(query: &ListResourcesQuery) -> Result<ResourceFilters> {
    let resource_type = query
        .resource_type
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(AppError::Validation)?;

    let status = query
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(AppError::Validation)?;

    let mut metadata = Vec::new();
    if let Some(group) = &query.blood_group {
        metadata.push((
            format!("bloodStock.{}", group.trim().to_uppercase()),
            MetadataPredicate::CheckPositive,
        ));
    }
    if let Some(component) = &query.component {
        metadata.push((
            format!("bloodComponents.{}", component.trim().to_lowercase()),
            MetadataPredicate::CheckPositive,
        ));
    }
    if let Some(oxygen_type) = &query.oxygen_type {
        // Oxygen suppliers record the supply type as a literal value
        metadata.push((
            "oxygen.type".to_string(),
            MetadataPredicate::Equals(serde_json::Value::String(
                oxygen_type.trim().to_lowercase(),
            )),
        ));
    }

    Ok(ResourceFilters {
        resource_type,
        query: query.q.clone(),
        status,
        metadata,
        origin: query.lat.zip(query.lng),
        radius_km: query.radius_km,
    })
}

/// List resources with filtering and optional distance enrichment
///
/// With caller coordinates the listing carries live travel info per item
/// and is sorted ascending by duration. Provider outages degrade to the
/// Haversine fallback; the request itself never fails on enrichment.
#[utoipa::path(
    get,
    path = "/api/resources",
    params(ListResourcesQuery),
    responses(
        (status = 200, description = "Filtered resource list", body = ApiResponse<Vec<ResourceResponseDto>>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "resources"
)]
pub async fn list_resources(
    State(state): State<ResourceState>,
    Query(query): Query<ListResourcesQuery>,
) -> Result<Json<ApiResponse<Vec<ResourceResponseDto>>>> {
    let filters = build_filters(&query)?;
    let resources = state.resource_service.list(&filters).await?;

    let items: Vec<ResourceResponseDto> = if let Some(origin) = filters.origin {
        let destinations: Vec<(f64, f64)> = resources.iter().map(|r| (r.lat, r.lng)).collect();
        let travel = state.distance_service.distances(origin, &destinations).await;

        let mut enriched: Vec<ResourceResponseDto> = resources
            .into_iter()
            .zip(travel)
            .map(|(resource, info)| {
                let mut dto = ResourceResponseDto::from(resource);
                dto.distance = Some(info.distance_km);
                dto.duration = Some(info.duration_in_traffic_min.unwrap_or(info.duration_min));
                dto.duration_without_traffic = Some(info.duration_min);
                dto.has_traffic_data = Some(info.duration_in_traffic_min.is_some());
                dto
            })
            .collect();

        // Items without a computed duration sort last
        enriched.sort_by(|a, b| {
            a.duration
                .unwrap_or(DURATION_SORT_SENTINEL_MIN)
                .partial_cmp(&b.duration.unwrap_or(DURATION_SORT_SENTINEL_MIN))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        enriched
    } else {
        resources.into_iter().map(ResourceResponseDto::from).collect()
    };

    let total = items.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get resource by ID
#[utoipa::path(
    get,
    path = "/api/resources/{id}",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Resource found", body = ApiResponse<ResourceResponseDto>),
        (status = 404, description = "Resource not found")
    ),
    tag = "resources"
)]
pub async fn get_resource(
    State(state): State<ResourceState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ResourceResponseDto>>> {
    let resource = state.resource_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(
        Some(resource.into()),
        None,
        None,
    )))
}

/// Create a resource from a loosely-shaped payload
///
/// Historical client shapes are accepted via field aliases; the payload is
/// normalized into one canonical record before persistence.
#[utoipa::path(
    post,
    path = "/api/resources",
    request_body = CreateResourcePayload,
    responses(
        (status = 201, description = "Resource created", body = ApiResponse<ResourceResponseDto>),
        (status = 400, description = "Missing or invalid required field")
    ),
    tag = "resources"
)]
pub async fn create_resource(
    State(state): State<ResourceState>,
    AppJson(payload): AppJson<CreateResourcePayload>,
) -> Result<(StatusCode, Json<ApiResponse<ResourceResponseDto>>)> {
    let normalized = payload.normalize()?;
    let resource = state.resource_service.create(&normalized).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(resource.into()), None, None)),
    ))
}

/// Partially update a resource
#[utoipa::path(
    patch,
    path = "/api/resources/{id}",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    request_body = UpdateResourceDto,
    responses(
        (status = 200, description = "Resource updated", body = ApiResponse<ResourceResponseDto>),
        (status = 404, description = "Resource not found")
    ),
    tag = "resources"
)]
pub async fn update_resource(
    State(state): State<ResourceState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateResourceDto>,
) -> Result<Json<ApiResponse<ResourceResponseDto>>> {
    let resource = state.resource_service.update(id, &dto).await?;
    Ok(Json(ApiResponse::success(
        Some(resource.into()),
        None,
        None,
    )))
}

/// Delete a resource
#[utoipa::path(
    delete,
    path = "/api/resources/{id}",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Resource deleted"),
        (status = 404, description = "Resource not found")
    ),
    tag = "resources"
)]
pub async fn delete_resource(
    State(state): State<ResourceState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.resource_service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Resource deleted".to_string()),
        None,
    )))
}

/// Report a resource as incorrect or stale
///
/// Three reports force the verification level to FLAGGED; further reports
/// leave it flagged.
#[utoipa::path(
    post,
    path = "/api/resources/{id}/report",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Report recorded", body = ApiResponse<ReportOutcomeDto>),
        (status = 404, description = "Resource not found")
    ),
    tag = "resources"
)]
pub async fn report_resource(
    State(state): State<ResourceState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportOutcomeDto>>> {
    let (report_count, verification_level) = state.resource_service.report(id).await?;

    Ok(Json(ApiResponse::success(
        Some(ReportOutcomeDto {
            report_count,
            verification_level,
            flagged: verification_level == VerificationLevel::Flagged,
        }),
        None,
        None,
    )))
}

/// Upvote a resource
#[utoipa::path(
    post,
    path = "/api/resources/{id}/upvote",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Upvote recorded", body = ApiResponse<UpvoteOutcomeDto>),
        (status = 404, description = "Resource not found")
    ),
    tag = "resources"
)]
pub async fn upvote_resource(
    State(state): State<ResourceState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UpvoteOutcomeDto>>> {
    let upvote_count = state.resource_service.upvote(id).await?;

    Ok(Json(ApiResponse::success(
        Some(UpvoteOutcomeDto { upvote_count }),
        None,
        None,
    )))
}

/// Administrative reset of the report counter
///
/// Zeroes the counter and lifts the FLAGGED level back to UNVERIFIED.
#[utoipa::path(
    post,
    path = "/api/resources/{id}/reset-reports",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Reports reset", body = ApiResponse<ReportOutcomeDto>),
        (status = 404, description = "Resource not found")
    ),
    tag = "resources"
)]
pub async fn reset_resource_reports(
    State(state): State<ResourceState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportOutcomeDto>>> {
    let (report_count, verification_level) = state.resource_service.reset_reports(id).await?;

    Ok(Json(ApiResponse::success(
        Some(ReportOutcomeDto {
            report_count,
            verification_level,
            flagged: verification_level == VerificationLevel::Flagged,
        }),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::resources::routes;
    use crate::shared::test_helpers::{lazy_test_pool, offline_distance_config};
    use axum_test::TestServer;
    use fake::faker::company::en::CompanyName;
    use fake::Fake;
    use serde_json::{json, Value};

    /// Validation failures never reach the database, so a lazy pool is
    /// enough to drive the write path end to end.
    fn test_server() -> TestServer {
        let resource_service = Arc::new(ResourceService::new(lazy_test_pool()));
        let distance_service = Arc::new(DistanceMatrixService::new(offline_distance_config()));

        TestServer::new(routes::routes(resource_service, distance_service)).unwrap()
    }

    #[tokio::test]
    async fn test_create_missing_title_names_field() {
        let server = test_server();

        let response = server
            .post("/api/resources")
            .json(&json!({
                "type": "hospital",
                "lat": 28.6,
                "lng": 77.2,
                "contact": "999"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].as_str().unwrap().contains("title"));
    }

    #[tokio::test]
    async fn test_create_invalid_lat_names_field() {
        let server = test_server();
        let title: String = CompanyName().fake();

        let response = server
            .post("/api/resources")
            .json(&json!({
                "type": "hospital",
                "title": title,
                "lat": "north",
                "lng": 77.2,
                "contact": "999"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("lat"));
    }

    #[tokio::test]
    async fn test_create_unknown_type_is_rejected() {
        let server = test_server();

        let response = server
            .post("/api/resources")
            .json(&json!({
                "type": "clinic",
                "title": "Test",
                "lat": 28.6,
                "lng": 77.2,
                "contact": "999"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("resource type"));
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_type_filter() {
        let server = test_server();

        let response = server
            .get("/api/resources")
            .add_query_param("type", "spaceship")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
