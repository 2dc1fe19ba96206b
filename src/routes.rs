use crate::app_state::AppState;
use crate::handlers_files;
use crate::handlers_songs;
use crate::negotiation::{self, APPLICATION_JSON, MULTIPART_FORM_DATA};
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

// Room for multipart boundaries and part headers on top of the file itself.
// The handler enforces the exact file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let json_body =
        middleware::from_fn_with_state(APPLICATION_JSON, negotiation::require_content_type);
    let multipart_body =
        middleware::from_fn_with_state(MULTIPART_FORM_DATA, negotiation::require_content_type);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    let api = Router::new()
        .route("/api/songs", get(handlers_songs::list_songs))
        .route(
            "/api/songs",
            post(handlers_songs::create_song).route_layer(json_body.clone()),
        )
        .route(
            "/api/songs/:song_id",
            get(handlers_songs::get_song).delete(handlers_songs::delete_song),
        )
        .route(
            "/api/songs/:song_id",
            put(handlers_songs::update_song).route_layer(json_body),
        )
        .route(
            "/api/files",
            post(handlers_files::upload_file)
                .route_layer(multipart_body)
                .layer(DefaultBodyLimit::max(
                    state
                        .config
                        .max_upload_bytes
                        .saturating_add(MULTIPART_OVERHEAD_BYTES),
                )),
        )
        .route("/api/files/:file_id", get(handlers_files::get_file))
        .route_layer(middleware::from_fn(negotiation::accept_json));

    Router::new()
        .merge(api)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
