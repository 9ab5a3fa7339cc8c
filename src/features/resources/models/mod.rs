mod resource;

pub use resource::{
    AvailabilityStatus, NewResource, Resource, ResourceType, VerificationLevel,
};
