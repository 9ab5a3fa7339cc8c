mod resource_dto;

pub use resource_dto::{
    CreateResourcePayload, ListResourcesQuery, LocationPayload, ReportOutcomeDto,
    ResourceResponseDto, UpdateResourceDto, UpvoteOutcomeDto,
};
