use axum::{
    body::Body,
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::net::SocketAddr;

use super::{
    render::{inject_runtime_tokens, render_header, render_page, render_section},
    state::AppState,
};
use crate::components::{NavState, PageModel, SectionId};

const CSP_PREFIX: &str = "default-src 'self'; script-src 'self' 'nonce-";
const CSP_SUFFIX: &str = "' 'strict-dynamic'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; font-src 'self'; connect-src 'self'; object-src 'none'; frame-ancestors 'self'; base-uri 'self'";
const SECTION_STATE_HEADER: &str = "X-Section-State";

pub async fn index_handler(
    State(state): State<AppState>,
    Extension(nonce): Extension<String>,
) -> Response {
    let (session, services) = state.sessions.open();
    let page = PageModel::resolve(&services, NavState::default()).await;
    let html = inject_runtime_tokens(&render_page(page, &session), &nonce);
    Html(html).into_response()
}

#[derive(Debug, serde::Deserialize)]
pub struct SessionQuery {
    session: Option<String>,
}

pub async fn section_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SessionQuery>,
) -> Response {
    let Some(section) = SectionId::parse(&id) else {
        return not_found_response().await;
    };
    let Some(services) = params.session.as_deref().and_then(|key| state.sessions.resume(key))
    else {
        return (StatusCode::BAD_REQUEST, "missing or malformed session").into_response();
    };
    let page = PageModel::snapshot(&services, NavState::default());
    let (html, loaded) = render_section(section, page);
    let mut res = Html(html).into_response();
    res.headers_mut().insert(
        SECTION_STATE_HEADER,
        HeaderValue::from_static(if loaded { "loaded" } else { "loading" }),
    );
    res
}

#[derive(Debug, serde::Deserialize)]
pub struct HeaderQuery {
    visible: Option<String>,
    session: Option<String>,
}

pub async fn header_handler(
    State(state): State<AppState>,
    Query(params): Query<HeaderQuery>,
) -> Response {
    let nav = match params.visible.as_deref() {
        Some(visible) => NavState::from_visible(visible),
        None => NavState::default(),
    };
    let brand = params
        .session
        .as_deref()
        .and_then(|key| state.sessions.get(key))
        .and_then(|services| services.site.peek().flatten())
        .map(|site| site.name);
    Html(render_header(brand, nav)).into_response()
}

pub(crate) fn client_ip(headers: &HeaderMap, addr: Option<&SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            return ip;
        }
    }
    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(val) = headers.get("CF-Connecting-IP") {
        if let Ok(s) = val.to_str() {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    let forwarded = headers.get("X-Forwarded-For")?.to_str().ok()?;
    let first = forwarded.split(',').next()?.trim();
    (!first.is_empty()).then(|| first.to_string())
}

pub async fn not_found_response() -> Response {
    let html = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>404 Not Found</title>
  <style>
    body{margin:0;display:flex;align-items:center;justify-content:center;height:100vh;background:#0f172a;color:#e5e7eb;font-family:system-ui,-apple-system,BlinkMacSystemFont,"Segoe UI",sans-serif;}
    .card{padding:24px 28px;border:1px solid #334155;border-radius:14px;background:#111827;text-align:center;max-width:360px;}
    h1{margin:0 0 12px;font-size:20px;}
    a{color:#60a5fa;text-decoration:none;}
  </style>
</head>
<body>
  <div class="card">
    <h1>404 Not Found</h1>
    <p><a href="/">Back to the portfolio</a></p>
  </div>
</body>
</html>"#;
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

pub async fn security_middleware(mut req: Request<Body>, next: Next) -> Response {
    let nonce = generate_nonce();
    req.extensions_mut().insert(nonce.clone());

    if req.uri().path().len() >= 200 {
        return StatusCode::URI_TOO_LONG.into_response();
    }
    let mut res = next.run(req).await;
    let res_headers = res.headers_mut();
    res_headers.insert(
        axum::http::header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    res_headers.insert(
        axum::http::header::X_FRAME_OPTIONS,
        HeaderValue::from_static("SAMEORIGIN"),
    );
    res_headers.insert(
        axum::http::header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    let csp = format!("{CSP_PREFIX}{nonce}{CSP_SUFFIX}");
    if let Ok(val) = HeaderValue::from_str(&csp) {
        res_headers.insert(axum::http::header::CONTENT_SECURITY_POLICY, val);
    }
    res_headers.insert(
        "Cross-Origin-Opener-Policy",
        HeaderValue::from_static("same-origin"),
    );
    res
}

#[inline]
fn generate_nonce() -> String {
    use rand::Rng;
    let charset = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..16)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}
