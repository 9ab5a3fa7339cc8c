/// Earth's mean radius in kilometers (for the Haversine formula)
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two lat/lng pairs in kilometers.
///
/// Used for radius filtering and as the fallback when the driving-distance
/// provider is unavailable.
pub fn haversine_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // Delhi to Mumbai, approx 1150km great-circle
        let delhi = (28.6139, 77.2090);
        let mumbai = (19.0760, 72.8777);

        let distance = haversine_distance_km(delhi.0, delhi.1, mumbai.0, mumbai.1);

        assert!(distance > 1100.0 && distance < 1200.0);
    }

    #[test]
    fn test_haversine_same_point() {
        let distance = haversine_distance_km(28.6139, 77.2090, 28.6139, 77.2090);

        assert!(distance < 0.001); // Less than a meter
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = (28.6139, 77.2090);
        let b = (12.9716, 77.5946);

        let forward = haversine_distance_km(a.0, a.1, b.0, b.1);
        let backward = haversine_distance_km(b.0, b.1, a.0, a.1);

        assert!((forward - backward).abs() < 1e-9);
    }
}
