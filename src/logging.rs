use std::{
    env,
    io::{self, Write},
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Response},
    middleware::Next,
};
use tokio::sync::mpsc;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::app::{AppState, client_ip};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn from_env() -> Self {
        Self::parse(
            &env::var("PORTFOLIO_ENV")
                .or_else(|_| env::var("RUST_ENV"))
                .unwrap_or_default(),
        )
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            _ => Self::Dev,
        }
    }
}

fn log_file_path() -> PathBuf {
    env::var("LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("logs/access.log"))
}

fn append_to(path: &PathBuf, data: &[u8]) -> io::Result<()> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?
        .write_all(data)
}

/// Access-log sink. Dev writes each line straight through; prod collects
/// lines in memory and a background task appends them every interval.
#[derive(Clone)]
enum AccessLogWriter {
    Immediate {
        path: Arc<PathBuf>,
    },
    Batched {
        buffer: Arc<Mutex<Vec<u8>>>,
        flush: mpsc::UnboundedSender<()>,
    },
}

impl AccessLogWriter {
    fn immediate(path: PathBuf) -> io::Result<Self> {
        ensure_parent(&path)?;
        Ok(Self::Immediate {
            path: Arc::new(path),
        })
    }

    fn batched(path: PathBuf, interval: Duration) -> io::Result<Self> {
        ensure_parent(&path)?;
        let buffer = Arc::new(Mutex::new(Vec::with_capacity(8192)));
        let (flush, mut rx) = mpsc::unbounded_channel::<()>();

        let pending = Arc::clone(&buffer);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => drain(&pending, &path),
                    msg = rx.recv() => {
                        if msg.is_none() {
                            drain(&pending, &path);
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self::Batched { buffer, flush })
    }
}

fn ensure_parent(path: &PathBuf) -> io::Result<()> {
    match path.parent() {
        Some(parent) => std::fs::create_dir_all(parent),
        None => Ok(()),
    }
}

fn drain(buffer: &Mutex<Vec<u8>>, path: &PathBuf) {
    let data = std::mem::take(&mut *buffer.lock().unwrap_or_else(PoisonError::into_inner));
    if !data.is_empty() {
        let _ = append_to(path, &data);
    }
}

impl Write for AccessLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Immediate { path } => append_to(path, buf)?,
            Self::Batched { buffer, .. } => buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Self::Batched { flush, .. } = self {
            let _ = flush.send(());
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for AccessLogWriter {
    type Writer = AccessLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn init() -> anyhow::Result<()> {
    let log_path = log_file_path();
    match Environment::from_env() {
        Environment::Dev => init_dev(log_path),
        Environment::Prod => init_prod(log_path),
    }
}

/// Dev: every level to the console, access log written immediately.
fn init_dev(log_path: PathBuf) -> anyhow::Result<()> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .with_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("access_log=info,portfolio_site=debug,info")),
        );

    let file_layer = fmt::layer()
        .with_target(false)
        .with_level(false)
        .with_ansi(false)
        .with_writer(AccessLogWriter::immediate(log_path)?)
        .with_filter(EnvFilter::new("access_log=info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!("logging initialized (dev)");
    Ok(())
}

/// Prod: console gets warnings and errors, access log flushed in batches.
fn init_prod(log_path: PathBuf) -> anyhow::Result<()> {
    let flush_interval = Duration::from_secs(
        env::var("LOG_FLUSH_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5),
    );

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_target(false)
        .with_level(false)
        .with_ansi(false)
        .with_writer(AccessLogWriter::batched(log_path, flush_interval)?)
        .with_filter(EnvFilter::new("access_log=info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!("logging initialized (prod)");
    Ok(())
}

/// Logs `"METHOD /path HTTP/1.1" STATUS LENGTH IP "User-Agent" Nms` on target `access_log`.
pub async fn access_log_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let version = request.version();
    let user_agent = request
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), addr.as_ref(), state.trust_proxy);

    let response = next.run(request).await;

    let content_length = response
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    tracing::info!(
        target: "access_log",
        "\"{} {} {:?}\" {} {} {} \"{}\" {}ms",
        method,
        path,
        version,
        response.status().as_u16(),
        content_length,
        ip,
        user_agent,
        start.elapsed().as_millis()
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing() {
        assert_eq!(Environment::parse("production"), Environment::Prod);
        assert_eq!(Environment::parse(" PROD "), Environment::Prod);
        assert_eq!(Environment::parse(""), Environment::Dev);
        assert_eq!(Environment::parse("staging"), Environment::Dev);
    }

    #[tokio::test]
    async fn batched_writer_flushes_on_interval() {
        let dir = std::env::temp_dir().join(format!("portfolio-log-{}", std::process::id()));
        let path = dir.join("access.log");
        let _ = std::fs::remove_file(&path);

        let mut writer = AccessLogWriter::batched(path.clone(), Duration::from_millis(20)).unwrap();
        writer.write_all(b"GET / 200\n").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "GET / 200\n");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
