use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::help_requests::dtos::MatchSuggestionDto;
use crate::features::help_requests::models::{
    HelpRequest, NewHelpRequest, RequestEvent, RequestEventType, RequestStatus,
};
use crate::features::resources::models::ResourceType;

const REQUEST_COLUMNS: &str = "id, category, title, description, urgency, lat, lng, \
     address, contact, status, created_at, updated_at";

const EVENT_COLUMNS: &str = "id, request_id, event_type, message, payload, created_at";

/// Service for help request lifecycle operations.
///
/// The timeline is an append-only log of typed events; nothing ever
/// updates or removes an entry.
pub struct HelpRequestService {
    pool: PgPool,
}

impl HelpRequestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a help request and append its initial timeline events.
    ///
    /// Suggestions are computed by the caller from a separate read before
    /// this write; the insert and the event appends are sequential, not
    /// transactional.
    pub async fn create(
        &self,
        data: &NewHelpRequest,
        suggestions: &[MatchSuggestionDto],
    ) -> Result<HelpRequest> {
        let sql = format!(
            "INSERT INTO help_requests \
             (category, title, description, urgency, lat, lng, address, contact) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            REQUEST_COLUMNS
        );

        let request = sqlx::query_as::<_, HelpRequest>(&sql)
            .bind(data.category)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.urgency)
            .bind(data.lat)
            .bind(data.lng)
            .bind(&data.address)
            .bind(&data.contact)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create help request: {:?}", e);
                AppError::WriteFailed(e.to_string())
            })?;

        tracing::info!(
            "Created help request: {} ({}, urgency {:?})",
            request.id,
            request.category,
            request.urgency
        );

        self.append_event(
            request.id,
            RequestEventType::Created,
            "Request created".to_string(),
            None,
        )
        .await?;

        if !suggestions.is_empty() {
            self.append_event(
                request.id,
                RequestEventType::MatchesSuggested,
                format!("{} matching resources suggested", suggestions.len()),
                Some(serde_json::json!(suggestions)),
            )
            .await?;
        }

        Ok(request)
    }

    /// Append a typed event to a request timeline
    pub async fn append_event(
        &self,
        request_id: Uuid,
        event_type: RequestEventType,
        message: String,
        payload: Option<Value>,
    ) -> Result<RequestEvent> {
        let sql = format!(
            "INSERT INTO request_events (request_id, event_type, message, payload) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            EVENT_COLUMNS
        );

        sqlx::query_as::<_, RequestEvent>(&sql)
            .bind(request_id)
            .bind(event_type)
            .bind(&message)
            .bind(&payload)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to append request event: {:?}", e);
                AppError::Database(e)
            })
    }

    /// List help requests, optionally filtered by status and category
    pub async fn list(
        &self,
        status: Option<RequestStatus>,
        category: Option<ResourceType>,
    ) -> Result<Vec<HelpRequest>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut next_param = 1;

        let status_bind = status.map(|s| {
            conditions.push(format!("status = ${}", next_param));
            next_param += 1;
            s
        });
        let category_bind = category.map(|c| {
            conditions.push(format!("category = ${}", next_param));
            next_param += 1;
            c
        });
        let _ = next_param;

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM help_requests {} ORDER BY created_at DESC",
            REQUEST_COLUMNS, where_clause
        );

        let mut query = sqlx::query_as::<_, HelpRequest>(&sql);
        if let Some(status) = status_bind {
            query = query.bind(status);
        }
        if let Some(category) = category_bind {
            query = query.bind(category);
        }

        query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to list help requests: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Get a request with its full ordered timeline
    pub async fn get_with_timeline(&self, id: Uuid) -> Result<(HelpRequest, Vec<RequestEvent>)> {
        let sql = format!("SELECT {} FROM help_requests WHERE id = $1", REQUEST_COLUMNS);

        let request = sqlx::query_as::<_, HelpRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get help request: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Help request '{}' not found", id)))?;

        let events_sql = format!(
            "SELECT {} FROM request_events WHERE request_id = $1 ORDER BY created_at ASC",
            EVENT_COLUMNS
        );

        let events = sqlx::query_as::<_, RequestEvent>(&events_sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load request timeline: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((request, events))
    }

    /// Change the request status and append the transition to the timeline
    pub async fn update_status(&self, id: Uuid, status: RequestStatus) -> Result<HelpRequest> {
        let sql = format!(
            "UPDATE help_requests SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            REQUEST_COLUMNS
        );

        let request = sqlx::query_as::<_, HelpRequest>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update help request status: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Help request '{}' not found", id)))?;

        self.append_event(
            id,
            RequestEventType::StatusChanged,
            format!("Status changed to {}", status),
            None,
        )
        .await?;

        Ok(request)
    }
}
