//! Community help requests with an append-only lifecycle timeline.
//!
//! Creating a request computes match suggestions from a read over the
//! resource directory before the write; every lifecycle step appends a
//! typed event to the request timeline.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/requests` | Create a request with match suggestions |
//! | GET | `/api/requests` | List requests |
//! | GET | `/api/requests/{id}` | Request detail with timeline |
//! | PATCH | `/api/requests/{id}/status` | Change status |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{HelpRequestService, MatchingService};
