use std::sync::Arc;

use crate::core::error::Result;
use crate::features::help_requests::dtos::MatchSuggestionDto;
use crate::features::resources::models::{Resource, ResourceType};
use crate::features::resources::services::{ResourceFilters, ResourceService};
use crate::shared::constants::MATCH_SUGGESTION_LIMIT;
use crate::shared::geo::haversine_distance_km;

/// Computes match suggestions for a new help request.
///
/// Matching is a fixed top-N sort: resources of the requested type ranked
/// by their static verification-level score, nearest-first among equals
/// when the request carries coordinates.
pub struct MatchingService {
    resource_service: Arc<ResourceService>,
}

impl MatchingService {
    pub fn new(resource_service: Arc<ResourceService>) -> Self {
        Self { resource_service }
    }

    pub async fn suggest(
        &self,
        category: ResourceType,
        origin: Option<(f64, f64)>,
    ) -> Result<Vec<MatchSuggestionDto>> {
        let filters = ResourceFilters {
            resource_type: Some(category),
            ..Default::default()
        };

        let resources = self.resource_service.list(&filters).await?;

        Ok(rank_suggestions(resources, origin))
    }
}

/// Rank candidates by verification score, distance as tiebreaker
pub(crate) fn rank_suggestions(
    resources: Vec<Resource>,
    origin: Option<(f64, f64)>,
) -> Vec<MatchSuggestionDto> {
    let mut ranked: Vec<(i32, f64, MatchSuggestionDto)> = resources
        .into_iter()
        .map(|r| {
            let distance_km =
                origin.map(|(lat, lng)| haversine_distance_km(lat, lng, r.lat, r.lng));
            let score = r.verification_level.score();

            (
                score,
                distance_km.unwrap_or(f64::MAX),
                MatchSuggestionDto {
                    resource_id: r.id,
                    resource_type: r.resource_type,
                    title: r.title,
                    verification_level: r.verification_level,
                    distance_km,
                },
            )
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    });

    ranked
        .into_iter()
        .take(MATCH_SUGGESTION_LIMIT)
        .map(|(_, _, dto)| dto)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::resources::models::{AvailabilityStatus, VerificationLevel};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn candidate(level: VerificationLevel, lat: f64, lng: f64) -> Resource {
        Resource {
            id: Uuid::new_v4(),
            resource_type: ResourceType::Hospital,
            title: format!("{:?}", level),
            description: None,
            lat,
            lng,
            address: None,
            city: None,
            district: None,
            contact: json!({}),
            status: AvailabilityStatus::Available,
            verification_level: level,
            metadata: json!({}),
            report_count: 0,
            upvote_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rank_by_verification_score() {
        let resources = vec![
            candidate(VerificationLevel::Unverified, 28.6, 77.2),
            candidate(VerificationLevel::Government, 28.6, 77.2),
            candidate(VerificationLevel::Verified, 28.6, 77.2),
        ];

        let ranked = rank_suggestions(resources, None);

        assert_eq!(ranked[0].verification_level, VerificationLevel::Government);
        assert_eq!(ranked[1].verification_level, VerificationLevel::Verified);
        assert_eq!(ranked[2].verification_level, VerificationLevel::Unverified);
    }

    #[test]
    fn test_distance_breaks_score_ties() {
        let near = candidate(VerificationLevel::Verified, 28.62, 77.21);
        let far = candidate(VerificationLevel::Verified, 28.90, 77.60);
        let near_id = near.id;

        let ranked = rank_suggestions(vec![far, near], Some((28.6139, 77.2090)));

        assert_eq!(ranked[0].resource_id, near_id);
        assert!(ranked[0].distance_km.unwrap() < ranked[1].distance_km.unwrap());
    }

    #[test]
    fn test_suggestions_are_capped() {
        let resources = (0..10)
            .map(|i| candidate(VerificationLevel::Community, 28.6 + i as f64 * 0.01, 77.2))
            .collect();

        let ranked = rank_suggestions(resources, None);

        assert_eq!(ranked.len(), MATCH_SUGGESTION_LIMIT);
    }
}
