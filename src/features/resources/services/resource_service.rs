use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::resources::dtos::UpdateResourceDto;
use crate::features::resources::models::{
    AvailabilityStatus, NewResource, Resource, ResourceType, VerificationLevel,
};
use crate::shared::constants::{QUERY_OVERRIDES_STRUCTURED_FILTERS, REPORT_FLAG_THRESHOLD};
use crate::shared::geo::haversine_distance_km;

const RESOURCE_COLUMNS: &str = "id, resource_type, title, description, lat, lng, \
     address, city, district, contact, status, verification_level, metadata, \
     report_count, upvote_count, created_at, updated_at";

/// Predicate against a dotted key-path into the metadata blob
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataPredicate {
    /// Exact match after structural traversal
    Equals(Value),
    /// True when the resolved numeric value is greater than zero
    CheckPositive,
}

/// Filter request for the resource listing
#[derive(Debug, Clone, Default)]
pub struct ResourceFilters {
    pub resource_type: Option<ResourceType>,
    pub query: Option<String>,
    pub status: Option<AvailabilityStatus>,
    /// Dotted key-path predicates applied in memory over the fetched set
    pub metadata: Vec<(String, MetadataPredicate)>,
    /// Caller location; required for the radius filter
    pub origin: Option<(f64, f64)>,
    pub radius_km: Option<f64>,
}

/// Store accessor for the resource directory.
///
/// Filters the store can express natively go into the SQL; deep metadata
/// key-path lookups, radius filtering and distance sorting run in process
/// memory over the fetched result set.
pub struct ResourceService {
    pool: PgPool,
}

impl ResourceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List resources matching the filter request.
    ///
    /// A free-text query short-circuits every other filter, structured and
    /// in-memory alike (see `QUERY_OVERRIDES_STRUCTURED_FILTERS`).
    pub async fn list(&self, filters: &ResourceFilters) -> Result<Vec<Resource>> {
        if QUERY_OVERRIDES_STRUCTURED_FILTERS {
            if let Some(query) = filters.query.as_deref() {
                return self.fetch_by_query(query).await;
            }
        }

        let rows = self.fetch_structured(filters).await?;
        let rows = apply_metadata_filters(rows, &filters.metadata);

        Ok(apply_radius_filter(
            rows,
            filters.origin,
            filters.radius_km,
        ))
    }

    /// Free-text search over title, description, address and city
    async fn fetch_by_query(&self, query: &str) -> Result<Vec<Resource>> {
        let sql = format!(
            "SELECT {} FROM resources \
             WHERE title ILIKE $1 OR description ILIKE $1 OR address ILIKE $1 OR city ILIKE $1 \
             ORDER BY created_at DESC",
            RESOURCE_COLUMNS
        );
        let pattern = format!("%{}%", query);

        sqlx::query_as::<_, Resource>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search resources: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Structured filters the store can express natively
    async fn fetch_structured(&self, filters: &ResourceFilters) -> Result<Vec<Resource>> {
        let (sql, type_bind, status_bind) = build_structured_sql(filters);

        let mut query = sqlx::query_as::<_, Resource>(&sql);
        if let Some(rt) = type_bind {
            query = query.bind(rt);
        }
        if let Some(status) = status_bind {
            query = query.bind(status);
        }

        query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to list resources: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Get resource by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Resource> {
        let sql = format!("SELECT {} FROM resources WHERE id = $1", RESOURCE_COLUMNS);

        sqlx::query_as::<_, Resource>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Resource '{}' not found", id)))
    }

    /// Create a resource from a normalized record
    pub async fn create(&self, data: &NewResource) -> Result<Resource> {
        let sql = format!(
            "INSERT INTO resources \
             (resource_type, title, description, lat, lng, address, city, district, \
              contact, status, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {}",
            RESOURCE_COLUMNS
        );

        let resource = sqlx::query_as::<_, Resource>(&sql)
            .bind(data.resource_type)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.lat)
            .bind(data.lng)
            .bind(&data.address)
            .bind(&data.city)
            .bind(&data.district)
            .bind(&data.contact)
            .bind(data.status)
            .bind(&data.metadata)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create resource: {:?}", e);
                AppError::WriteFailed(e.to_string())
            })?;

        tracing::info!(
            "Created resource: {} ({}) at ({}, {})",
            resource.id,
            resource.resource_type,
            resource.lat,
            resource.lng
        );

        Ok(resource)
    }

    /// Partial update; absent fields keep their stored value
    pub async fn update(&self, id: Uuid, dto: &UpdateResourceDto) -> Result<Resource> {
        let status = dto
            .status
            .as_deref()
            .map(|s| s.parse::<AvailabilityStatus>())
            .transpose()
            .map_err(AppError::Validation)?;

        let sql = format!(
            "UPDATE resources SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             status = COALESCE($4, status), \
             contact = COALESCE($5, contact), \
             metadata = COALESCE($6, metadata), \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            RESOURCE_COLUMNS
        );

        sqlx::query_as::<_, Resource>(&sql)
            .bind(id)
            .bind(&dto.title)
            .bind(&dto.description)
            .bind(status)
            .bind(&dto.contact)
            .bind(&dto.metadata)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update resource: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Resource '{}' not found", id)))
    }

    /// Report a resource. The counter only ever grows; reaching the
    /// threshold force-sets the verification level to FLAGGED and further
    /// reports leave it there.
    pub async fn report(&self, id: Uuid) -> Result<(i32, VerificationLevel)> {
        let row: Option<(i32, VerificationLevel)> = sqlx::query_as(
            "UPDATE resources SET \
             report_count = report_count + 1, \
             verification_level = CASE \
                 WHEN report_count + 1 >= $2 THEN 'FLAGGED'::verification_level \
                 ELSE verification_level \
             END, \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING report_count, verification_level",
        )
        .bind(id)
        .bind(REPORT_FLAG_THRESHOLD)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to report resource: {:?}", e);
            AppError::Database(e)
        })?;

        let (report_count, verification_level) =
            row.ok_or_else(|| AppError::NotFound(format!("Resource '{}' not found", id)))?;

        if verification_level == VerificationLevel::Flagged {
            tracing::warn!(
                "Resource {} flagged for review after {} reports",
                id,
                report_count
            );
        }

        Ok((report_count, verification_level))
    }

    /// Administrative reset of the report ratchet
    pub async fn reset_reports(&self, id: Uuid) -> Result<(i32, VerificationLevel)> {
        let row: Option<(i32, VerificationLevel)> = sqlx::query_as(
            "UPDATE resources SET \
             report_count = 0, \
             verification_level = CASE \
                 WHEN verification_level = 'FLAGGED' THEN 'UNVERIFIED'::verification_level \
                 ELSE verification_level \
             END, \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING report_count, verification_level",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reset resource reports: {:?}", e);
            AppError::Database(e)
        })?;

        row.ok_or_else(|| AppError::NotFound(format!("Resource '{}' not found", id)))
    }

    /// Upvote a resource
    pub async fn upvote(&self, id: Uuid) -> Result<i32> {
        let row: Option<(i32,)> = sqlx::query_as(
            "UPDATE resources SET upvote_count = upvote_count + 1, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING upvote_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upvote resource: {:?}", e);
            AppError::Database(e)
        })?;

        row.map(|(count,)| count)
            .ok_or_else(|| AppError::NotFound(format!("Resource '{}' not found", id)))
    }

    /// Delete a resource
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete resource: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Resource '{}' not found", id)));
        }

        tracing::info!("Deleted resource: {}", id);

        Ok(())
    }
}

/// SQL and bind values for the structured listing query.
///
/// A BLOOD_BANK type filter also matches hospitals carrying blood-stock
/// metadata, so it becomes an OR condition instead of a bind.
fn build_structured_sql(
    filters: &ResourceFilters,
) -> (String, Option<ResourceType>, Option<AvailabilityStatus>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut next_param = 1;

    let type_bind = match filters.resource_type {
        Some(ResourceType::BloodBank) => {
            conditions.push(
                "(resource_type = 'BLOOD_BANK' \
                 OR (resource_type = 'HOSPITAL' AND metadata ? 'bloodStock'))"
                    .to_string(),
            );
            None
        }
        Some(rt) => {
            conditions.push(format!("resource_type = ${}", next_param));
            next_param += 1;
            Some(rt)
        }
        None => None,
    };

    let status_bind = filters.status.map(|status| {
        conditions.push(format!("status = ${}", next_param));
        next_param += 1;
        status
    });
    let _ = next_param;

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT {} FROM resources {} ORDER BY created_at DESC",
        RESOURCE_COLUMNS, where_clause
    );

    (sql, type_bind, status_bind)
}

/// Resolve a dotted key-path into a JSON value.
///
/// A missing or non-object intermediate yields None rather than an error.
pub(crate) fn resolve_key_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for key in path.split('.') {
        current = current.as_object()?.get(key)?;
    }
    Some(current)
}

fn value_is_positive(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f > 0.0).unwrap_or(false),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f > 0.0).unwrap_or(false),
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// True when the record's metadata satisfies the predicate at the key-path
pub(crate) fn matches_predicate(
    metadata: &Value,
    path: &str,
    predicate: &MetadataPredicate,
) -> bool {
    let resolved = match resolve_key_path(metadata, path) {
        Some(v) => v,
        None => return false,
    };

    match predicate {
        MetadataPredicate::Equals(expected) => resolved == expected,
        MetadataPredicate::CheckPositive => value_is_positive(resolved),
    }
}

fn apply_metadata_filters(
    resources: Vec<Resource>,
    predicates: &[(String, MetadataPredicate)],
) -> Vec<Resource> {
    if predicates.is_empty() {
        return resources;
    }

    resources
        .into_iter()
        .filter(|r| {
            predicates
                .iter()
                .all(|(path, predicate)| matches_predicate(&r.metadata, path, predicate))
        })
        .collect()
}

/// Reject candidates outside the radius and stable-sort ascending by
/// Haversine distance. Requires both an origin and a radius.
fn apply_radius_filter(
    resources: Vec<Resource>,
    origin: Option<(f64, f64)>,
    radius_km: Option<f64>,
) -> Vec<Resource> {
    let (origin, radius_km) = match (origin, radius_km) {
        (Some(origin), Some(radius)) => (origin, radius),
        _ => return resources,
    };

    let mut within: Vec<(f64, Resource)> = resources
        .into_iter()
        .filter_map(|r| {
            let distance = haversine_distance_km(origin.0, origin.1, r.lat, r.lng);
            if distance <= radius_km {
                Some((distance, r))
            } else {
                None
            }
        })
        .collect();

    within.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    within.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn test_resource(lat: f64, lng: f64, metadata: Value) -> Resource {
        Resource {
            id: Uuid::new_v4(),
            resource_type: ResourceType::Hospital,
            title: "Test".to_string(),
            description: None,
            lat,
            lng,
            address: None,
            city: None,
            district: None,
            contact: json!({ "phone": "999" }),
            status: AvailabilityStatus::Available,
            verification_level: VerificationLevel::Unverified,
            metadata,
            report_count: 0,
            upvote_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_blood_bank_filter_unions_blood_stock_hospitals() {
        let filters = ResourceFilters {
            resource_type: Some(ResourceType::BloodBank),
            ..Default::default()
        };

        let (sql, type_bind, status_bind) = build_structured_sql(&filters);

        assert!(sql.contains("resource_type = 'BLOOD_BANK'"));
        assert!(sql.contains("resource_type = 'HOSPITAL' AND metadata ? 'bloodStock'"));
        assert!(type_bind.is_none());
        assert!(status_bind.is_none());
    }

    #[test]
    fn test_plain_type_filter_binds_parameter() {
        let filters = ResourceFilters {
            resource_type: Some(ResourceType::Ambulance),
            status: Some(AvailabilityStatus::Available),
            ..Default::default()
        };

        let (sql, type_bind, status_bind) = build_structured_sql(&filters);

        assert!(sql.contains("resource_type = $1"));
        assert!(sql.contains("status = $2"));
        assert_eq!(type_bind, Some(ResourceType::Ambulance));
        assert_eq!(status_bind, Some(AvailabilityStatus::Available));
    }

    #[test]
    fn test_no_filters_has_no_where_clause() {
        let (sql, _, _) = build_structured_sql(&ResourceFilters::default());

        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_resolve_key_path() {
        let metadata = json!({ "bloodStock": { "A+": 3 } });

        assert_eq!(
            resolve_key_path(&metadata, "bloodStock.A+"),
            Some(&json!(3))
        );
        assert_eq!(resolve_key_path(&metadata, "bloodStock.B-"), None);
        assert_eq!(resolve_key_path(&metadata, "oxygen.cylinder"), None);
    }

    #[test]
    fn test_resolve_key_path_null_intermediate() {
        let metadata = json!({ "bloodStock": null });

        assert_eq!(resolve_key_path(&metadata, "bloodStock.A+"), None);
    }

    #[test]
    fn test_check_positive_predicate() {
        let with_stock = json!({ "bloodStock": { "A+": 1 } });
        let without_stock = json!({ "bloodStock": { "A+": 0 } });

        assert!(matches_predicate(
            &with_stock,
            "bloodStock.A+",
            &MetadataPredicate::CheckPositive
        ));
        assert!(!matches_predicate(
            &without_stock,
            "bloodStock.A+",
            &MetadataPredicate::CheckPositive
        ));
    }

    #[test]
    fn test_equals_predicate() {
        let metadata = json!({ "hospital": { "icu": true } });

        assert!(matches_predicate(
            &metadata,
            "hospital.icu",
            &MetadataPredicate::Equals(json!(true))
        ));
        assert!(!matches_predicate(
            &metadata,
            "hospital.icu",
            &MetadataPredicate::Equals(json!(false))
        ));
    }

    #[test]
    fn test_metadata_filter_excludes_missing_path() {
        let resources = vec![
            test_resource(0.0, 0.0, json!({ "bloodStock": { "A+": 2 } })),
            test_resource(0.0, 0.0, json!({})),
        ];

        let filtered = apply_metadata_filters(
            resources,
            &[("bloodStock.A+".to_string(), MetadataPredicate::CheckPositive)],
        );

        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_radius_filter_sorts_ascending() {
        // Origin in Delhi; one nearby, one across town, one in Mumbai
        let near = test_resource(28.62, 77.21, json!({}));
        let far = test_resource(28.70, 77.40, json!({}));
        let mumbai = test_resource(19.07, 72.87, json!({}));

        let near_id = near.id;
        let far_id = far.id;

        let filtered = apply_radius_filter(
            vec![far, mumbai, near],
            Some((28.6139, 77.2090)),
            Some(50.0),
        );

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, near_id);
        assert_eq!(filtered[1].id, far_id);
    }

    #[test]
    fn test_radius_filter_requires_origin_and_radius() {
        let resources = vec![test_resource(19.07, 72.87, json!({}))];

        let untouched = apply_radius_filter(resources.clone(), None, Some(1.0));
        assert_eq!(untouched.len(), 1);

        let untouched = apply_radius_filter(resources, Some((28.6, 77.2)), None);
        assert_eq!(untouched.len(), 1);
    }
}
