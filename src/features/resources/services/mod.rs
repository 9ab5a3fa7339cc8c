mod distance_service;
mod resource_service;

pub use distance_service::{DistanceMatrixService, DistanceResult, DistanceStatus};
pub use resource_service::{MetadataPredicate, ResourceFilters, ResourceService};
