use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod views;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
