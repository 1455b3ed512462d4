use crate::state::AppState;
use axum::{middleware, routing::MethodRouter, Router};

mod claims;
pub mod extractors;
pub mod handlers;
pub mod jwt;

pub use extractors::{require_admin, AuthUser};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

/// Wraps a role, membership or approval mutation. Open unless strict access
/// control is configured, in which case the caller must be an admin.
pub fn privileged(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    if state.config.strict_access_control {
        route.route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
    } else {
        route
    }
}
