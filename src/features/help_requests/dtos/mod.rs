mod help_request_dto;

pub use help_request_dto::{
    CreateHelpRequestDto, HelpRequestCreatedDto, HelpRequestDetailDto, HelpRequestResponseDto,
    ListRequestsQuery, MatchSuggestionDto, RequestEventDto, UpdateRequestStatusDto,
};
