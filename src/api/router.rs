//! HTTP router: the single page at `/` and JSON endpoints under `/api/`.
//!
//! Every `/api` response carries `Cache-Control: no-store`; consultations
//! contain health data and must not be cached by the browser.

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the application router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn app_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/sessions", post(endpoints::sessions::create))
        .route(
            "/sessions/:id/consultation",
            post(endpoints::consultation::submit)
                .get(endpoints::consultation::current)
                .delete(endpoints::consultation::reset),
        )
        .route(
            "/sessions/:id/report.pdf",
            get(endpoints::export::report_pdf),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/", get(endpoints::page::index))
        .nest("/api", api)
        .with_state(ctx)
}
