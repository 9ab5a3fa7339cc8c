use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Resource type enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "resource_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Hospital,
    Ambulance,
    BloodBank,
    Doctor,
    OxygenSupplier,
    MedicineStore,
    Shelter,
    Helpline,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Hospital => write!(f, "HOSPITAL"),
            ResourceType::Ambulance => write!(f, "AMBULANCE"),
            ResourceType::BloodBank => write!(f, "BLOOD_BANK"),
            ResourceType::Doctor => write!(f, "DOCTOR"),
            ResourceType::OxygenSupplier => write!(f, "OXYGEN_SUPPLIER"),
            ResourceType::MedicineStore => write!(f, "MEDICINE_STORE"),
            ResourceType::Shelter => write!(f, "SHELTER"),
            ResourceType::Helpline => write!(f, "HELPLINE"),
        }
    }
}

impl FromStr for ResourceType {
    type Err = String;

    /// Parse from client input; values are upper-cased before matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HOSPITAL" => Ok(ResourceType::Hospital),
            "AMBULANCE" => Ok(ResourceType::Ambulance),
            "BLOOD_BANK" | "BLOODBANK" => Ok(ResourceType::BloodBank),
            "DOCTOR" => Ok(ResourceType::Doctor),
            "OXYGEN_SUPPLIER" | "OXYGEN" => Ok(ResourceType::OxygenSupplier),
            "MEDICINE_STORE" | "MEDICINE" => Ok(ResourceType::MedicineStore),
            "SHELTER" => Ok(ResourceType::Shelter),
            "HELPLINE" => Ok(ResourceType::Helpline),
            other => Err(format!("Unknown resource type: {}", other)),
        }
    }
}

/// Availability status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "availability_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    Available,
    Busy,
    Limited,
    Unavailable,
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityStatus::Available => write!(f, "AVAILABLE"),
            AvailabilityStatus::Busy => write!(f, "BUSY"),
            AvailabilityStatus::Limited => write!(f, "LIMITED"),
            AvailabilityStatus::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

impl FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AVAILABLE" => Ok(AvailabilityStatus::Available),
            "BUSY" => Ok(AvailabilityStatus::Busy),
            "LIMITED" => Ok(AvailabilityStatus::Limited),
            "UNAVAILABLE" => Ok(AvailabilityStatus::Unavailable),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// Verification trust tier enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "verification_level", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationLevel {
    Unverified,
    Community,
    Verified,
    OfficialPartner,
    Government,
    Flagged,
}

impl VerificationLevel {
    /// Static trust score used to rank match suggestions
    pub fn score(&self) -> i32 {
        match self {
            VerificationLevel::Government => 5,
            VerificationLevel::OfficialPartner => 4,
            VerificationLevel::Verified => 3,
            VerificationLevel::Community => 2,
            VerificationLevel::Unverified => 1,
            VerificationLevel::Flagged => 0,
        }
    }
}

impl std::fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationLevel::Unverified => write!(f, "UNVERIFIED"),
            VerificationLevel::Community => write!(f, "COMMUNITY"),
            VerificationLevel::Verified => write!(f, "VERIFIED"),
            VerificationLevel::OfficialPartner => write!(f, "OFFICIAL_PARTNER"),
            VerificationLevel::Government => write!(f, "GOVERNMENT"),
            VerificationLevel::Flagged => write!(f, "FLAGGED"),
        }
    }
}

/// Database model for a directory resource
///
/// `contact` and `metadata` are JSONB blobs. Metadata is conventionally
/// keyed by a sub-object matching the resource type (`metadata.hospital`,
/// `metadata.bloodStock`) but the shape is not enforced.
#[derive(Debug, Clone, FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub resource_type: ResourceType,
    pub title: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub contact: serde_json::Value,
    pub status: AvailabilityStatus,
    pub verification_level: VerificationLevel,
    pub metadata: serde_json::Value,
    pub report_count: i32,
    pub upvote_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical data for creating a resource, produced by payload normalization
#[derive(Debug, Clone)]
pub struct NewResource {
    pub resource_type: ResourceType,
    pub title: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub contact: serde_json::Value,
    pub status: AvailabilityStatus,
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_parse_case_insensitive() {
        assert_eq!(
            "hospital".parse::<ResourceType>().unwrap(),
            ResourceType::Hospital
        );
        assert_eq!(
            "Blood_Bank".parse::<ResourceType>().unwrap(),
            ResourceType::BloodBank
        );
        assert!("clinic".parse::<ResourceType>().is_err());
    }

    #[test]
    fn test_verification_score_ordering() {
        assert!(VerificationLevel::Government.score() > VerificationLevel::Verified.score());
        assert!(VerificationLevel::Unverified.score() > VerificationLevel::Flagged.score());
    }
}
