use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::resources::models::ResourceType;

/// Request status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Open,
    InProgress,
    Resolved,
    Cancelled,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Open => write!(f, "OPEN"),
            RequestStatus::InProgress => write!(f, "IN_PROGRESS"),
            RequestStatus::Resolved => write!(f, "RESOLVED"),
            RequestStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Ok(RequestStatus::Open),
            "IN_PROGRESS" => Ok(RequestStatus::InProgress),
            "RESOLVED" => Ok(RequestStatus::Resolved),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            other => Err(format!("Unknown request status: {}", other)),
        }
    }
}

/// Urgency enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "request_urgency", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestUrgency {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for RequestUrgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(RequestUrgency::Low),
            "MEDIUM" => Ok(RequestUrgency::Medium),
            "HIGH" => Ok(RequestUrgency::High),
            "CRITICAL" => Ok(RequestUrgency::Critical),
            other => Err(format!("Unknown urgency: {}", other)),
        }
    }
}

/// Timeline event type enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "request_event_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestEventType {
    Created,
    StatusChanged,
    MatchesSuggested,
    Note,
}

/// Database model for a help request
#[derive(Debug, Clone, FromRow)]
pub struct HelpRequest {
    pub id: Uuid,
    pub category: ResourceType,
    pub title: String,
    pub description: Option<String>,
    pub urgency: RequestUrgency,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: Option<String>,
    pub contact: serde_json::Value,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only timeline entry for a help request
#[derive(Debug, Clone, FromRow)]
pub struct RequestEvent {
    pub id: Uuid,
    pub request_id: Uuid,
    pub event_type: RequestEventType,
    pub message: String,
    pub payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a help request
#[derive(Debug, Clone)]
pub struct NewHelpRequest {
    pub category: ResourceType,
    pub title: String,
    pub description: Option<String>,
    pub urgency: RequestUrgency,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: Option<String>,
    pub contact: serde_json::Value,
}
