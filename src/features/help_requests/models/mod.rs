mod help_request;

pub use help_request::{
    HelpRequest, NewHelpRequest, RequestEvent, RequestEventType, RequestStatus, RequestUrgency,
};
