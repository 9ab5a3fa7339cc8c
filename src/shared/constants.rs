/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// RESOURCE PIPELINE CONSTANTS
// =============================================================================

/// Reports required before a resource is force-flagged for review
pub const REPORT_FLAG_THRESHOLD: i32 = 3;

/// Assumed average speed (km/h) when synthesizing a duration from the
/// Haversine fallback
pub const FALLBACK_AVERAGE_SPEED_KMH: f64 = 30.0;

/// Provider single-call destination limit; larger batches degrade to
/// per-destination fallback
pub const MAX_BATCH_DESTINATIONS: usize = 25;

/// Sort sentinel for list items with no computed duration; keeps them last
pub const DURATION_SORT_SENTINEL_MIN: f64 = 999_999.0;

/// A free-text query disables structured filters instead of combining with
/// them. Historical behavior, pending product clarification.
pub const QUERY_OVERRIDES_STRUCTURED_FILTERS: bool = true;

/// Number of match suggestions computed for a new help request
pub const MATCH_SUGGESTION_LIMIT: usize = 5;
