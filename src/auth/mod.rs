use crate::state::AppState;
use axum::Router;

mod claims;
pub mod cookie;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use claims::Claims;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
