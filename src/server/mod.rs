mod admin;
pub mod dto;
mod handlers;
pub mod response;
mod router;

pub use router::{AppState, admin_router, general_router};
