// HTTP surface: the admin API used by the editor and the public site

pub mod admin;
pub mod error;
pub mod public;

pub use error::ApiError;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use villa_site_generator::ContentAccessor;
use villa_site_store::ContentService;

/// Uploads arrive base64-encoded inside JSON
const ADMIN_BODY_LIMIT: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: ContentService,
    pub accessor: ContentAccessor,
}

impl AppState {
    pub fn new(service: ContentService, accessor: ContentAccessor) -> Self {
        Self { service, accessor }
    }
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/content",
            get(admin::get_content).put(admin::save_content),
        )
        .route(
            "/images",
            get(admin::list_images)
                .post(admin::upload_image)
                .delete(admin::delete_image),
        )
        .route(
            "/gallery-meta",
            get(admin::get_gallery_meta).post(admin::save_gallery_meta),
        )
        .route("/auth", post(admin::check_auth))
        .layer(DefaultBodyLimit::max(ADMIN_BODY_LIMIT))
}

/// Full application: admin API, public pages, and the public file tree as
/// the fallback
pub fn router(state: AppState) -> Router {
    let public_dir = state
        .accessor
        .root()
        .join(&state.accessor.layout().public_root);

    Router::new()
        .nest("/api/admin", admin_router())
        .route("/api/gallery", get(public::gallery))
        .route("/", get(public::index))
        .route("/articles", get(public::article_index))
        .route("/articles/{slug}", get(public::article))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until the process stops
pub async fn serve(state: AppState, listener: TcpListener) -> std::io::Result<()> {
    let backend = state.service.backend_name();
    let app = router(state);
    info!(addr = %listener.local_addr()?, backend, "Listening");
    axum::serve(listener, app).await
}
