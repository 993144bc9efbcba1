// rest/mod.rs — Public REST API server.
//
// Axum HTTP server, CORS-permissive for browser clients.
//
// Endpoints:
//   GET    /health, /api/health
//   POST   /register, /login
//   POST   /translate, /detect-language, /is-somali, /analyze-text
//   GET    /history                      POST /history   DELETE /history
//   GET    /history/{id}                 DELETE /history/{id}
//   POST   /favorite
//   GET    /favorites                    DELETE /favorites, /favorites/{id}
//   POST   /voice/save
//   GET    /voice/recordings[...]        voice playback, favorites, cleanup
//   GET    /users/{id}  PUT /users/{id}  DELETE /users/{id}
//   GET    /users, /users/count          (admin)
//   GET    /admin/...                    (admin dashboard, analytics, exports)

pub mod auth;
pub mod routes;

use anyhow::Result;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    // Health, account creation, and the detector endpoints are public; the
    // translate endpoint attributes history when a valid token is present.
    let public = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/health", get(routes::health::health))
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .route("/translate", post(routes::translate::translate))
        .route("/detect-language", post(routes::translate::detect_language))
        .route("/is-somali", post(routes::translate::is_somali))
        .route("/analyze-text", post(routes::translate::analyze_text));

    let protected = Router::new()
        .route(
            "/history",
            get(routes::history::list)
                .post(routes::history::add)
                .delete(routes::history::clear),
        )
        .route(
            "/history/{id}",
            get(routes::history::get_one).delete(routes::history::delete_one),
        )
        .route("/favorite", post(routes::favorites::add))
        .route(
            "/favorites",
            get(routes::favorites::list).delete(routes::favorites::clear),
        )
        .route("/favorites/{id}", delete(routes::favorites::delete_one))
        .route("/voice/save", post(routes::voice::save))
        .route(
            "/voice/recordings",
            get(routes::voice::list).delete(routes::voice::clear),
        )
        .route(
            "/voice/recordings/{id}",
            get(routes::voice::get_one).delete(routes::voice::delete_one),
        )
        .route("/voice/recordings/{id}/audio", get(routes::voice::audio))
        .route(
            "/voice/recordings/{id}/audio-data",
            get(routes::voice::audio_data),
        )
        .route(
            "/voice/recordings/{id}/favorite",
            post(routes::voice::toggle_favorite),
        )
        .route("/voice/favorites", get(routes::voice::favorites))
        .route(
            "/users/{id}",
            get(routes::users::get_one)
                .put(routes::users::update)
                .delete(routes::users::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::require_auth,
        ));

    let admin = Router::new()
        .route("/users", get(routes::users::list))
        .route("/users/count", get(routes::users::count))
        .route("/admin/dashboard", get(routes::admin::dashboard))
        .route("/admin/users", get(routes::admin::list_users))
        .route("/admin/users/{id}/suspend", post(routes::admin::suspend))
        .route(
            "/admin/users/{id}/unsuspend",
            post(routes::admin::unsuspend),
        )
        .route("/admin/users/{id}/stats", get(routes::admin::user_stats))
        .route("/admin/analytics", get(routes::admin::analytics))
        .route("/admin/users/export", get(routes::admin::export_users))
        .route(
            "/admin/reports/translations",
            get(routes::admin::translations_report),
        )
        .route(
            "/admin/reports/translations/export",
            get(routes::admin::export_translations),
        )
        // Auth runs first (outermost), then the role check.
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::require_auth,
        ));

    public
        .merge(protected)
        .merge(admin)
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
