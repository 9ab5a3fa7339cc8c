mod help_request_service;
mod matching_service;

pub use help_request_service::HelpRequestService;
pub use matching_service::MatchingService;
