use anyhow::Context;
use tracing::info;

use birdbot::bot;
use birdbot::catalog::Catalog;
use birdbot::config::Config;
use birdbot::content::ContentResolver;
use birdbot::fetch::HttpFetcher;
use birdbot::logging::configure_logging;
use birdbot::telegram::TelegramClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    configure_logging();

    let config = Config::from_env()?;
    config.ensure_cache_dirs()?;

    let fetcher = HttpFetcher::new()?;
    let catalog = Catalog::load(&fetcher, &config.site_url)
        .await
        .context("failed to load bird catalog")?;
    info!("Catalog loaded with {} birds", catalog.len());

    let telegram = TelegramClient::new(&config.bot_token);
    let me = telegram
        .get_me()
        .await
        .context("failed to authorize with Telegram")?;
    info!(
        "Authorized on account {}",
        me.username.as_deref().unwrap_or("unknown")
    );

    let resolver = ContentResolver::new(
        fetcher,
        config.site_url.as_str(),
        &config.audio_dir,
        &config.images_dir,
    );
    bot::run(&telegram, &catalog, &resolver).await;
    Ok(())
}
