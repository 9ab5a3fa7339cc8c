//! Emergency resource directory: hospitals, ambulances, blood banks,
//! oxygen suppliers, doctors, shelters and helplines.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/resources` | Filtered listing, optional distance enrichment |
//! | POST | `/api/resources` | Create from a loosely-shaped payload |
//! | GET | `/api/resources/{id}` | Resource detail |
//! | PATCH | `/api/resources/{id}` | Partial update |
//! | DELETE | `/api/resources/{id}` | Delete |
//! | POST | `/api/resources/{id}/report` | Report; 3 reports flag the record |
//! | POST | `/api/resources/{id}/upvote` | Upvote |
//! | POST | `/api/resources/{id}/reset-reports` | Administrative report reset |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{DistanceMatrixService, ResourceService};
