use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::help_requests::models::{
    HelpRequest, NewHelpRequest, RequestEvent, RequestEventType, RequestStatus, RequestUrgency,
};
use crate::features::resources::models::{ResourceType, VerificationLevel};
use crate::shared::validation::PHONE_REGEX;

/// Request DTO for creating a help request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHelpRequestDto {
    /// Resource type being requested (e.g. BLOOD_BANK, OXYGEN_SUPPLIER)
    pub category: String,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,

    /// LOW, MEDIUM, HIGH or CRITICAL (default: MEDIUM)
    pub urgency: Option<String>,

    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: Option<String>,

    /// Phone number as a bare string, or a structured contact object
    pub contact: Value,
}

impl CreateHelpRequestDto {
    /// Normalize into the canonical record, or fail naming the field
    pub fn normalize(self) -> Result<NewHelpRequest, AppError> {
        let category = self
            .category
            .parse::<ResourceType>()
            .map_err(AppError::Validation)?;

        let urgency = match self.urgency.as_deref() {
            Some(s) => s.parse::<RequestUrgency>().map_err(AppError::Validation)?,
            None => RequestUrgency::Medium,
        };

        let contact = match self.contact {
            Value::String(s) => {
                let trimmed = s.trim();
                if !PHONE_REGEX.is_match(trimmed) {
                    return Err(AppError::Validation(
                        "Invalid phone number in field: contact".to_string(),
                    ));
                }
                serde_json::json!({ "phone": trimmed })
            }
            v @ Value::Object(_) => v,
            _ => {
                return Err(AppError::Validation(
                    "Missing required field: contact".to_string(),
                ))
            }
        };

        Ok(NewHelpRequest {
            category,
            title: self.title,
            description: self.description,
            urgency,
            lat: self.lat,
            lng: self.lng,
            address: self.address,
            contact,
        })
    }
}

/// Query params for listing help requests
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListRequestsQuery {
    /// Request status filter (e.g. OPEN)
    pub status: Option<String>,

    /// Requested resource type filter
    pub category: Option<String>,
}

/// Request DTO for a status change
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRequestStatusDto {
    pub status: String,
}

/// A suggested resource for a help request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchSuggestionDto {
    pub resource_id: Uuid,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub title: String,
    pub verification_level: VerificationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Response DTO for a help request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HelpRequestResponseDto {
    pub id: Uuid,
    pub category: ResourceType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub urgency: RequestUrgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub contact: Value,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HelpRequest> for HelpRequestResponseDto {
    fn from(r: HelpRequest) -> Self {
        Self {
            id: r.id,
            category: r.category,
            title: r.title,
            description: r.description,
            urgency: r.urgency,
            lat: r.lat,
            lng: r.lng,
            address: r.address,
            contact: r.contact,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A timeline entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestEventDto {
    pub id: Uuid,
    pub event_type: RequestEventType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<RequestEvent> for RequestEventDto {
    fn from(e: RequestEvent) -> Self {
        Self {
            id: e.id,
            event_type: e.event_type,
            message: e.message,
            payload: e.payload,
            created_at: e.created_at,
        }
    }
}

/// Creation response: the stored request plus its match suggestions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HelpRequestCreatedDto {
    pub request: HelpRequestResponseDto,
    pub suggestions: Vec<MatchSuggestionDto>,
}

/// Detail response: the request with its full ordered timeline
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HelpRequestDetailDto {
    #[serde(flatten)]
    pub request: HelpRequestResponseDto,
    pub timeline: Vec<RequestEventDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dto(contact: Value) -> CreateHelpRequestDto {
        CreateHelpRequestDto {
            category: "blood_bank".to_string(),
            title: "Need O- blood".to_string(),
            description: None,
            urgency: Some("critical".to_string()),
            lat: Some(28.6),
            lng: Some(77.2),
            address: None,
            contact,
        }
    }

    #[test]
    fn test_normalize_wraps_phone_string() {
        let normalized = dto(json!("+919876543210")).normalize().unwrap();

        assert_eq!(normalized.category, ResourceType::BloodBank);
        assert_eq!(normalized.urgency, RequestUrgency::Critical);
        assert_eq!(normalized.contact, json!({ "phone": "+919876543210" }));
    }

    #[test]
    fn test_normalize_rejects_non_phone_string() {
        let err = dto(json!("call me")).normalize().unwrap_err();

        assert!(err.to_string().contains("contact"));
    }

    #[test]
    fn test_normalize_rejects_unknown_category() {
        let mut bad = dto(json!("999"));
        bad.category = "magic".to_string();

        let err = bad.normalize().unwrap_err();

        assert!(err.to_string().contains("resource type"));
    }

    #[test]
    fn test_normalize_defaults_urgency() {
        let mut no_urgency = dto(json!("999"));
        no_urgency.urgency = None;

        let normalized = no_urgency.normalize().unwrap();

        assert_eq!(normalized.urgency, RequestUrgency::Medium);
    }
}
