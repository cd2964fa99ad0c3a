mod app;
mod asset;
mod components;
mod config;
mod data;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;
    let config = config::SiteConfig::from_env()?;
    app::run(config).await
}
