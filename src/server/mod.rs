//! HTTP front end. Handlers translate requests into gate calls and map
//! errors onto status codes; no policy lives here.

mod auth;
mod dto;
mod extract;
mod projects;
pub mod response;
mod router;

pub use dto::{DEFAULT_ARCHIVE_TYPE, LoginRequest, LoginResponse};
pub use extract::BearerToken;
pub use router::{AppState, create_router};
