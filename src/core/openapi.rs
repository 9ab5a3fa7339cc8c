use utoipa::{Modify, OpenApi};

use crate::features::help_requests::{
    dtos as help_requests_dtos, handlers as help_requests_handlers, models as help_requests_models,
};
use crate::features::resources::{
    dtos as resources_dtos, handlers as resources_handlers, models as resources_models,
    services as resources_services,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Resources
        resources_handlers::resource_handler::list_resources,
        resources_handlers::resource_handler::get_resource,
        resources_handlers::resource_handler::create_resource,
        resources_handlers::resource_handler::update_resource,
        resources_handlers::resource_handler::delete_resource,
        resources_handlers::resource_handler::report_resource,
        resources_handlers::resource_handler::upvote_resource,
        resources_handlers::resource_handler::reset_resource_reports,
        // Help requests
        help_requests_handlers::help_request_handler::create_help_request,
        help_requests_handlers::help_request_handler::list_help_requests,
        help_requests_handlers::help_request_handler::get_help_request,
        help_requests_handlers::help_request_handler::update_request_status,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Resources
            resources_models::ResourceType,
            resources_models::AvailabilityStatus,
            resources_models::VerificationLevel,
            resources_services::DistanceStatus,
            resources_services::DistanceResult,
            resources_dtos::CreateResourcePayload,
            resources_dtos::LocationPayload,
            resources_dtos::UpdateResourceDto,
            resources_dtos::ResourceResponseDto,
            resources_dtos::ReportOutcomeDto,
            resources_dtos::UpvoteOutcomeDto,
            ApiResponse<Vec<resources_dtos::ResourceResponseDto>>,
            ApiResponse<resources_dtos::ResourceResponseDto>,
            ApiResponse<resources_dtos::ReportOutcomeDto>,
            ApiResponse<resources_dtos::UpvoteOutcomeDto>,
            // Help requests
            help_requests_models::RequestStatus,
            help_requests_models::RequestUrgency,
            help_requests_models::RequestEventType,
            help_requests_dtos::CreateHelpRequestDto,
            help_requests_dtos::UpdateRequestStatusDto,
            help_requests_dtos::MatchSuggestionDto,
            help_requests_dtos::HelpRequestResponseDto,
            help_requests_dtos::HelpRequestCreatedDto,
            help_requests_dtos::HelpRequestDetailDto,
            help_requests_dtos::RequestEventDto,
            ApiResponse<Vec<help_requests_dtos::HelpRequestResponseDto>>,
            ApiResponse<help_requests_dtos::HelpRequestCreatedDto>,
            ApiResponse<help_requests_dtos::HelpRequestDetailDto>,
            ApiResponse<help_requests_dtos::HelpRequestResponseDto>,
        )
    ),
    tags(
        (name = "resources", description = "Emergency resource directory (public)"),
        (name = "help-requests", description = "Community help requests with lifecycle timeline (public)"),
    ),
    info(
        title = "Vita API",
        version = "0.1.0",
        description = "API documentation for Vita",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
