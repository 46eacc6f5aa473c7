use axum::Router;

use crate::state::AppState;

mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod sessions;
pub mod token;

pub fn router() -> Router<AppState> {
    handlers::router()
}
