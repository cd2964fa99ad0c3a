mod handlers;
pub mod render;
mod session;
mod state;

use axum::http::HeaderValue;
use axum::{
    Router,
    extract::State,
    middleware,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::config::SiteConfig;
use crate::logging;

pub(crate) use handlers::client_ip;
pub(crate) use state::AppState;

const GIT_HASH: &str = env!("GIT_HASH");
const DATA_DIR: &str = "static/data";
const ASSET_DIR: &str = "static";

pub async fn run(config: SiteConfig) -> anyhow::Result<()> {
    let app_state = state::build_state(&config)?;

    let app = router(app_state.clone())
        .layer(middleware::from_fn_with_state(
            config.cache_enabled,
            cache_headers_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            app_state,
            logging::access_log_middleware,
        ));

    let listener = TcpListener::bind(config.listen_addr()).await?;
    tracing::info!(addr = %config.listen_addr(), "portfolio listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/sections/{id}", get(handlers::section_handler))
        .route("/header", get(handlers::header_handler))
        .nest_service("/data", ServeDir::new(DATA_DIR))
        .nest_service("/assets", ServeDir::new(ASSET_DIR))
        .fallback(handlers::not_found_response)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(handlers::security_middleware))
        .with_state(state)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("shutting down");
}

async fn cache_headers_middleware(
    State(cache_enabled): State<bool>,
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::http::Response<axum::body::Body> {
    let path = req.uri().path().to_ascii_lowercase();
    let mut res = next.run(req).await;
    if !cache_enabled {
        return res;
    }

    let cc = if path.starts_with("/assets/") {
        if let Ok(val) = HeaderValue::from_str(&format!("W/\"{GIT_HASH}\"")) {
            res.headers_mut().insert(axum::http::header::ETAG, val);
        }
        "public, max-age=300, stale-while-revalidate=604800"
    } else if path.starts_with("/data/") {
        // Documents change with a deploy, not per request.
        "public, max-age=60"
    } else {
        "no-cache, must-revalidate"
    };
    res.headers_mut().insert(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cc),
    );
    res
}
