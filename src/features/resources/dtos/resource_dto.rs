use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::resources::models::{
    AvailabilityStatus, NewResource, Resource, ResourceType, VerificationLevel,
};

/// Query params for listing resources
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesQuery {
    /// Resource type filter (e.g. HOSPITAL, BLOOD_BANK)
    #[serde(rename = "type")]
    pub resource_type: Option<String>,

    /// Free-text search over title, description, address and city
    pub q: Option<String>,

    /// Availability status filter
    pub status: Option<String>,

    /// Caller latitude; with `lng`, enables distance enrichment
    pub lat: Option<f64>,

    /// Caller longitude
    pub lng: Option<f64>,

    /// Blood group filter for blood banks (e.g. A+, O-)
    pub blood_group: Option<String>,

    /// Blood component filter (plasma, platelets)
    pub component: Option<String>,

    /// Oxygen supply type filter (cylinder, concentrator, refill)
    pub oxygen_type: Option<String>,

    /// Radius filter in kilometers, applied around the caller location
    pub radius_km: Option<f64>,
}

/// Response DTO for a resource, optionally enriched with travel info
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponseDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    pub contact: Value,
    pub status: AvailabilityStatus,
    pub verification_level: VerificationLevel,
    pub metadata: Value,
    pub report_count: i32,
    pub upvote_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Travel distance in km from the caller location, when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Travel duration in minutes, traffic-aware when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_without_traffic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_traffic_data: Option<bool>,
}

impl From<Resource> for ResourceResponseDto {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            resource_type: r.resource_type,
            title: r.title,
            description: r.description,
            lat: r.lat,
            lng: r.lng,
            address: r.address,
            city: r.city,
            district: r.district,
            contact: r.contact,
            status: r.status,
            verification_level: r.verification_level,
            metadata: r.metadata,
            report_count: r.report_count,
            upvote_count: r.upvote_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
            distance: None,
            duration: None,
            duration_without_traffic: None,
            has_traffic_data: None,
        }
    }
}

/// Nested location object accepted by historical clients
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LocationPayload {
    #[serde(alias = "latitude")]
    pub lat: Option<Value>,
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: Option<Value>,
    pub address: Option<Value>,
    pub city: Option<Value>,
    pub district: Option<Value>,
}

/// Loosely-shaped create payload.
///
/// Several historical client shapes are accepted: each logical field has
/// aliases (`type`/`resourceType`, `title`/`name`, `lat`/`latitude`/
/// `location.lat`, `contact`/`phone`/`contactNumber`) and numeric fields
/// may arrive as numeric strings. `normalize` maps every accepted shape to
/// one canonical [`NewResource`] and rejects anything else naming the
/// offending field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateResourcePayload {
    #[serde(rename = "type", alias = "resourceType", alias = "resource_type")]
    pub resource_type: Option<Value>,

    #[serde(alias = "name")]
    pub title: Option<Value>,

    pub description: Option<Value>,

    #[serde(alias = "latitude")]
    pub lat: Option<Value>,

    #[serde(alias = "longitude", alias = "lon")]
    pub lng: Option<Value>,

    pub location: Option<LocationPayload>,

    pub address: Option<Value>,
    pub city: Option<Value>,
    pub district: Option<Value>,

    #[serde(alias = "phone", alias = "contactNumber", alias = "contact_number")]
    pub contact: Option<Value>,

    pub status: Option<Value>,

    pub metadata: Option<Value>,
}

impl CreateResourcePayload {
    /// Normalize into the canonical record, or fail naming the field.
    pub fn normalize(self) -> Result<NewResource, AppError> {
        let resource_type = self
            .resource_type
            .as_ref()
            .and_then(coerce_string)
            .ok_or_else(|| AppError::Validation("Missing required field: type".to_string()))?
            .parse::<ResourceType>()
            .map_err(AppError::Validation)?;

        let title = self
            .title
            .as_ref()
            .and_then(coerce_string)
            .ok_or_else(|| AppError::Validation("Missing required field: title".to_string()))?;

        let location = self.location.unwrap_or_default();

        let lat = self
            .lat
            .as_ref()
            .or(location.lat.as_ref())
            .map(|v| {
                coerce_f64(v).ok_or_else(|| {
                    AppError::Validation("Invalid value for field: lat".to_string())
                })
            })
            .transpose()?
            .ok_or_else(|| AppError::Validation("Missing required field: lat".to_string()))?;

        let lng = self
            .lng
            .as_ref()
            .or(location.lng.as_ref())
            .map(|v| {
                coerce_f64(v).ok_or_else(|| {
                    AppError::Validation("Invalid value for field: lng".to_string())
                })
            })
            .transpose()?
            .ok_or_else(|| AppError::Validation("Missing required field: lng".to_string()))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::Validation(
                "Invalid value for field: lat".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::Validation(
                "Invalid value for field: lng".to_string(),
            ));
        }

        let contact = match self.contact {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                serde_json::json!({ "phone": s.trim() })
            }
            Some(v @ Value::Object(_)) => v,
            Some(Value::Number(n)) => serde_json::json!({ "phone": n.to_string() }),
            _ => {
                return Err(AppError::Validation(
                    "Missing required field: contact".to_string(),
                ))
            }
        };

        let status = match self.status.as_ref().and_then(coerce_string) {
            Some(s) => s
                .parse::<AvailabilityStatus>()
                .map_err(AppError::Validation)?,
            None => AvailabilityStatus::Available,
        };

        let metadata = match self.metadata {
            Some(v @ Value::Object(_)) => v,
            _ => serde_json::json!({}),
        };

        Ok(NewResource {
            resource_type,
            title,
            description: self.description.as_ref().and_then(coerce_string),
            lat,
            lng,
            address: self
                .address
                .as_ref()
                .or(location.address.as_ref())
                .and_then(coerce_string),
            city: self
                .city
                .as_ref()
                .or(location.city.as_ref())
                .and_then(coerce_string),
            district: self
                .district
                .as_ref()
                .or(location.district.as_ref())
                .and_then(coerce_string),
            contact,
            status,
            metadata,
        })
    }
}

/// Partial update DTO
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub contact: Option<Value>,
    pub metadata: Option<Value>,
}

/// Outcome of a report operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutcomeDto {
    pub report_count: i32,
    pub verification_level: VerificationLevel,
    pub flagged: bool,
}

/// Outcome of an upvote operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteOutcomeDto {
    pub upvote_count: i32,
}

/// Non-empty trimmed string from a loose JSON value
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

/// Number from a loose JSON value; numeric strings are accepted
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(body: Value) -> CreateResourcePayload {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_normalize_canonical_shape() {
        let normalized = payload(json!({
            "type": "hospital",
            "title": "Test",
            "lat": "28.6",
            "lng": "77.2",
            "contact": "999"
        }))
        .normalize()
        .unwrap();

        assert_eq!(normalized.resource_type, ResourceType::Hospital);
        assert_eq!(normalized.title, "Test");
        assert_eq!(normalized.lat, 28.6);
        assert_eq!(normalized.lng, 77.2);
        assert_eq!(normalized.contact, json!({ "phone": "999" }));
        assert_eq!(normalized.status, AvailabilityStatus::Available);
    }

    #[test]
    fn test_normalize_accepts_aliases() {
        let normalized = payload(json!({
            "resourceType": "BLOOD_BANK",
            "name": "City Blood Bank",
            "latitude": 19.07,
            "longitude": 72.87,
            "contactNumber": "011-234"
        }))
        .normalize()
        .unwrap();

        assert_eq!(normalized.resource_type, ResourceType::BloodBank);
        assert_eq!(normalized.title, "City Blood Bank");
        assert_eq!(normalized.lat, 19.07);
    }

    #[test]
    fn test_normalize_accepts_nested_location() {
        let normalized = payload(json!({
            "type": "ambulance",
            "title": "Night ambulance",
            "location": { "lat": 12.97, "lng": 77.59, "city": "Bengaluru" },
            "phone": "108"
        }))
        .normalize()
        .unwrap();

        assert_eq!(normalized.lat, 12.97);
        assert_eq!(normalized.city.as_deref(), Some("Bengaluru"));
    }

    #[test]
    fn test_normalize_names_missing_field() {
        let err = payload(json!({
            "type": "hospital",
            "lat": 28.6,
            "lng": 77.2,
            "contact": "999"
        }))
        .normalize()
        .unwrap_err();

        assert!(err.to_string().contains("title"));

        let err = payload(json!({
            "type": "hospital",
            "title": "Test",
            "lng": 77.2,
            "contact": "999"
        }))
        .normalize()
        .unwrap_err();

        assert!(err.to_string().contains("lat"));

        let err = payload(json!({
            "type": "hospital",
            "title": "Test",
            "lat": 28.6,
            "lng": 77.2
        }))
        .normalize()
        .unwrap_err();

        assert!(err.to_string().contains("contact"));
    }

    #[test]
    fn test_normalize_rejects_non_numeric_lat() {
        let err = payload(json!({
            "type": "hospital",
            "title": "Test",
            "lat": "north",
            "lng": 77.2,
            "contact": "999"
        }))
        .normalize()
        .unwrap_err();

        assert!(err.to_string().contains("lat"));
    }

    #[test]
    fn test_normalize_keeps_structured_contact() {
        let normalized = payload(json!({
            "type": "hospital",
            "title": "Test",
            "lat": 28.6,
            "lng": 77.2,
            "contact": { "phone": "999", "whatsapp": "999" }
        }))
        .normalize()
        .unwrap();

        assert_eq!(
            normalized.contact,
            json!({ "phone": "999", "whatsapp": "999" })
        );
    }

    #[test]
    fn test_normalize_uppercases_status() {
        let normalized = payload(json!({
            "type": "hospital",
            "title": "Test",
            "lat": 28.6,
            "lng": 77.2,
            "contact": "999",
            "status": "limited"
        }))
        .normalize()
        .unwrap();

        assert_eq!(normalized.status, AvailabilityStatus::Limited);
    }
}
