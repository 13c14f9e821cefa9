//! HTTP surface of the activity signup service
//!
//! The activity API, the operational endpoints and the optional front-end
//! mount all share one axum router and one `AppState`.

pub mod api;
pub mod ops;
pub mod server;

pub use server::HttpServer;

use crate::service::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let web = state.config().web.clone();

    let mut router: Router<Arc<AppState>> = Router::new()
        .route("/", get(ops::root_handler))
        .route("/activities", get(api::list_activities_handler))
        .route(
            "/activities/{activity_name}/signup",
            post(api::signup_handler),
        )
        .route("/health", get(ops::health_handler))
        .route("/ready", get(ops::ready_handler))
        .route("/alive", get(ops::alive_handler))
        .route("/stats", get(ops::stats_handler));

    if web.enable_metrics {
        router = router.route("/metrics", get(ops::metrics_handler));
    }

    if web.serve_static {
        router = router.nest_service("/static", ServeDir::new(&web.static_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
