use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::core::config::DistanceConfig;
use crate::shared::constants::{FALLBACK_AVERAGE_SPEED_KMH, MAX_BATCH_DESTINATIONS};
use crate::shared::geo::haversine_distance_km;

/// How a distance result was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceStatus {
    /// Real driving distance from the provider
    Ok,
    /// Synthesized from Haversine distance and an assumed average speed
    Fallback,
}

/// Travel distance/duration between one origin and one destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DistanceResult {
    pub distance_km: f64,
    pub duration_min: f64,
    /// Traffic-adjusted duration, provider path only
    pub duration_in_traffic_min: Option<f64>,
    pub status: DistanceStatus,
}

/// Cache key over both coordinate pairs at full floating-point precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey {
    origin_lat: u64,
    origin_lng: u64,
    dest_lat: u64,
    dest_lng: u64,
}

impl PairKey {
    fn new(origin: (f64, f64), dest: (f64, f64)) -> Self {
        Self {
            origin_lat: origin.0.to_bits(),
            origin_lng: origin.1.to_bits(),
            dest_lat: dest.0.to_bits(),
            dest_lng: dest.1.to_bits(),
        }
    }
}

struct CacheEntry {
    result: DistanceResult,
    inserted_at: Instant,
}

/// Provider response shapes (Google Distance Matrix wire format)
#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
    duration: Option<MatrixValue>,
    duration_in_traffic: Option<MatrixValue>,
}

/// Provider values carry meters/seconds in `value`
#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: f64,
}

/// Client for the driving-distance provider.
///
/// Every lookup degrades to the Haversine fallback rather than failing:
/// missing credential, oversized batch, HTTP failure, non-OK provider
/// status and element-level "no route" all synthesize a usable result.
/// Per-pair results are cached with a TTL and a size cap.
pub struct DistanceMatrixService {
    config: DistanceConfig,
    client: reqwest::Client,
    cache: RwLock<HashMap<PairKey, CacheEntry>>,
}

impl DistanceMatrixService {
    pub fn new(config: DistanceConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .user_agent("VitaCore/1.0 (emergency-resource-directory)")
                .build()
                .expect("Failed to build HTTP client"),
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Compute travel info from one origin to each destination.
    ///
    /// The returned vector matches the destination order. Never fails.
    pub async fn distances(
        &self,
        origin: (f64, f64),
        destinations: &[(f64, f64)],
    ) -> Vec<DistanceResult> {
        let mut slots: Vec<Option<DistanceResult>> = vec![None; destinations.len()];

        // Serve repeated coordinate pairs from the cache first
        {
            let cache = self.cache.read().await;
            for (i, dest) in destinations.iter().enumerate() {
                let key = PairKey::new(origin, *dest);
                if let Some(entry) = cache.get(&key) {
                    if entry.inserted_at.elapsed() < self.config.cache_ttl {
                        slots[i] = Some(entry.result.clone());
                    }
                }
            }
        }

        let missing: Vec<(usize, (f64, f64))> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| (i, destinations[i]))
            .collect();

        if !missing.is_empty() {
            let computed = self.compute_missing(origin, &missing).await;

            let mut fresh = Vec::with_capacity(computed.len());
            for ((i, dest), result) in missing.into_iter().zip(computed) {
                fresh.push((PairKey::new(origin, dest), result.clone()));
                slots[i] = Some(result);
            }
            self.store(fresh).await;
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.unwrap_or_else(|| fallback_result(origin, destinations[i])))
            .collect()
    }

    /// Provider batch when possible, fallback per destination otherwise
    async fn compute_missing(
        &self,
        origin: (f64, f64),
        missing: &[(usize, (f64, f64))],
    ) -> Vec<DistanceResult> {
        let destinations: Vec<(f64, f64)> = missing.iter().map(|(_, d)| *d).collect();

        let api_key = match &self.config.api_key {
            Some(key) if destinations.len() <= MAX_BATCH_DESTINATIONS => key,
            Some(_) => {
                tracing::debug!(
                    "Batch of {} exceeds provider limit of {}, using fallback",
                    destinations.len(),
                    MAX_BATCH_DESTINATIONS
                );
                return fallback_batch(origin, &destinations);
            }
            None => {
                tracing::debug!("No distance provider credential configured, using fallback");
                return fallback_batch(origin, &destinations);
            }
        };

        match self.fetch_matrix(api_key, origin, &destinations).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Distance provider call failed, using fallback: {}", e);
                fallback_batch(origin, &destinations)
            }
        }
    }

    /// One HTTP round-trip for the whole destination set
    async fn fetch_matrix(
        &self,
        api_key: &str,
        origin: (f64, f64),
        destinations: &[(f64, f64)],
    ) -> std::result::Result<Vec<DistanceResult>, String> {
        let origins_param = format!("{},{}", origin.0, origin.1);
        let destinations_param = destinations
            .iter()
            .map(|(lat, lng)| format!("{},{}", lat, lng))
            .collect::<Vec<_>>()
            .join("|");

        let url = format!(
            "{}/maps/api/distancematrix/json?origins={}&destinations={}&departure_time=now&key={}",
            self.config.base_url,
            urlencoding::encode(&origins_param),
            urlencoding::encode(&destinations_param),
            urlencoding::encode(api_key)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("provider returned HTTP {}", response.status()));
        }

        let matrix: MatrixResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to parse provider response: {}", e))?;

        if matrix.status != "OK" {
            return Err(format!("provider status: {}", matrix.status));
        }

        let elements = matrix
            .rows
            .into_iter()
            .next()
            .map(|row| row.elements)
            .unwrap_or_default();

        // Element-level failures fall back individually; ordering follows
        // the destination order of the request
        let results = destinations
            .iter()
            .enumerate()
            .map(|(i, dest)| match elements.get(i) {
                Some(element) if element.status == "OK" => {
                    match (&element.distance, &element.duration) {
                        (Some(distance), Some(duration)) => DistanceResult {
                            distance_km: distance.value / 1000.0,
                            duration_min: duration.value / 60.0,
                            duration_in_traffic_min: element
                                .duration_in_traffic
                                .as_ref()
                                .map(|d| d.value / 60.0),
                            status: DistanceStatus::Ok,
                        },
                        _ => fallback_result(origin, *dest),
                    }
                }
                _ => fallback_result(origin, *dest),
            })
            .collect();

        Ok(results)
    }

    /// Insert fresh results, evicting expired entries first and then the
    /// oldest-inserted ones to stay within the size cap.
    async fn store(&self, fresh: Vec<(PairKey, DistanceResult)>) {
        let mut cache = self.cache.write().await;

        cache.retain(|_, entry| entry.inserted_at.elapsed() < self.config.cache_ttl);

        let incoming = fresh.len();
        let cap = self.config.cache_max_entries;
        if cache.len() + incoming > cap {
            let excess = cache.len() + incoming - cap;
            let mut by_age: Vec<(PairKey, Instant)> = cache
                .iter()
                .map(|(key, entry)| (*key, entry.inserted_at))
                .collect();
            by_age.sort_by_key(|(_, inserted_at)| *inserted_at);
            for (key, _) in by_age.into_iter().take(excess) {
                cache.remove(&key);
            }
        }

        let now = Instant::now();
        for (key, result) in fresh {
            cache.insert(
                key,
                CacheEntry {
                    result,
                    inserted_at: now,
                },
            );
        }
    }

    #[cfg(test)]
    async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

/// Haversine distance plus an assumed average speed; never fails
fn fallback_result(origin: (f64, f64), dest: (f64, f64)) -> DistanceResult {
    let distance_km = haversine_distance_km(origin.0, origin.1, dest.0, dest.1);

    DistanceResult {
        distance_km,
        duration_min: distance_km / FALLBACK_AVERAGE_SPEED_KMH * 60.0,
        duration_in_traffic_min: None,
        status: DistanceStatus::Fallback,
    }
}

fn fallback_batch(origin: (f64, f64), destinations: &[(f64, f64)]) -> Vec<DistanceResult> {
    destinations
        .iter()
        .map(|dest| fallback_result(origin, *dest))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config(ttl: Duration, cap: usize) -> DistanceConfig {
        DistanceConfig {
            api_key: None,
            base_url: "http://localhost:0".to_string(),
            cache_ttl: ttl,
            cache_max_entries: cap,
            request_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_fallback_synthesizes_duration() {
        let result = fallback_result((28.6139, 77.2090), (28.7041, 77.1025));

        assert!(result.distance_km > 0.0);
        // 30 km/h means minutes = km * 2
        assert!((result.duration_min - result.distance_km * 2.0).abs() < 1e-9);
        assert_eq!(result.status, DistanceStatus::Fallback);
        assert!(result.duration_in_traffic_min.is_none());
    }

    #[tokio::test]
    async fn test_distances_without_credential_preserves_order() {
        let service = DistanceMatrixService::new(test_config(Duration::from_secs(300), 100));
        let origin = (28.6139, 77.2090);
        let near = (28.62, 77.21);
        let far = (19.0760, 72.8777);

        let results = service.distances(origin, &[far, near]).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].distance_km > results[1].distance_km);
        assert!(results.iter().all(|r| r.status == DistanceStatus::Fallback));
        assert!(results.iter().all(|r| r.duration_min > 0.0));
    }

    #[test]
    fn test_repeated_pairs_are_cached() {
        tokio_test::block_on(async {
            let service = DistanceMatrixService::new(test_config(Duration::from_secs(300), 100));
            let origin = (28.6139, 77.2090);
            let dest = (28.62, 77.21);

            let first = service.distances(origin, &[dest]).await;
            assert_eq!(service.cache_len().await, 1);

            let second = service.distances(origin, &[dest]).await;
            assert_eq!(first, second);
            assert_eq!(service.cache_len().await, 1);
        });
    }

    #[tokio::test]
    async fn test_cache_entries_expire() {
        let service = DistanceMatrixService::new(test_config(Duration::from_millis(5), 100));
        let origin = (28.6139, 77.2090);
        let dest = (28.62, 77.21);

        service.distances(origin, &[dest]).await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Expired entry is recomputed and replaced, not served
        service.distances(origin, &[dest]).await;
        assert_eq!(service.cache_len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_size_cap_evicts_oldest() {
        let service = DistanceMatrixService::new(test_config(Duration::from_secs(300), 2));
        let origin = (28.6139, 77.2090);

        service.distances(origin, &[(28.62, 77.21)]).await;
        service.distances(origin, &[(28.63, 77.22)]).await;
        service.distances(origin, &[(28.64, 77.23)]).await;

        assert!(service.cache_len().await <= 2);
    }

    #[test]
    fn test_pair_key_full_precision() {
        let a = PairKey::new((28.6139, 77.2090), (28.62, 77.21));
        let b = PairKey::new((28.61390000001, 77.2090), (28.62, 77.21));

        assert_ne!(a, b);
    }
}
