//! HTTP layer of the todo service.
//!
//! # Design
//! The store is created and initialized by the caller and injected into the
//! router as state; handlers never reach for a global. `app` builds the API
//! alone (what the tests drive), `app_with_frontend` adds the static file
//! fallback used by the binary.

pub mod body;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;

use std::future::Future;
use std::path::Path;

use axum::{
    http::Method,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use log::{error, info};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

pub use body::TodoBody;
pub use error::ApiError;
pub use handlers::SharedStore;

/// API routes over `store`, with CORS and request logging.
pub fn app(store: SharedStore) -> Router {
    api_routes(store)
        .layer(middleware::from_fn(logging::log_request))
        .layer(cors())
}

/// The API plus the built frontend served from `static_dir` for every other
/// path.
pub fn app_with_frontend(store: SharedStore, static_dir: &Path) -> Router {
    api_routes(store)
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(logging::log_request))
        .layer(cors())
}

fn api_routes(store: SharedStore) -> Router {
    Router::new()
        .route("/todos", get(handlers::list_todos).post(handlers::create_todo))
        .route("/todos/create", post(handlers::create_todo))
        .route("/todos/completed", delete(handlers::clear_completed))
        .route("/todos/clear", delete(handlers::clear_completed))
        .route(
            "/todos/{id}",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
        .route("/todos/{id}/complete", put(handlers::toggle_complete))
        .with_state(store)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn run(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("event=signal_listen signal=ctrl_c status=error error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("event=signal_listen signal=sigterm status=error error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("event=shutdown_requested signal=ctrl_c"),
        () = terminate => info!("event=shutdown_requested signal=sigterm"),
    }
}
