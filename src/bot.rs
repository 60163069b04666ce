//! The dispatcher: pulls inbound queries from Telegram, runs them through
//! entity and content resolution, and replies with whatever resolved.

use tokio::time::{sleep, Duration};
use tracing::{error, info};

use crate::catalog::Catalog;
use crate::content::{ContentResolver, ResolvedBird};
use crate::fetch::Fetcher;
use crate::telegram::TelegramClient;
use crate::TARGET_BOT;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Process updates forever, one query at a time.
pub async fn run<F: Fetcher>(
    telegram: &TelegramClient,
    catalog: &Catalog,
    resolver: &ContentResolver<F>,
) {
    let mut offset: i64 = 0;
    loop {
        let updates = match telegram.get_updates(offset).await {
            Ok(updates) => updates,
            Err(err) => {
                error!(target: TARGET_BOT, "Failed to poll for updates: {}", err);
                sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };
        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else { continue };
            let Some(text) = message.text else { continue };
            handle_query(telegram, catalog, resolver, message.chat.id, &text).await;
        }
    }
}

/// Answer one query: resolve the bird, then send image, description and
/// song in that order, omitting any piece that failed to resolve.
pub async fn handle_query<F: Fetcher>(
    telegram: &TelegramClient,
    catalog: &Catalog,
    resolver: &ContentResolver<F>,
    chat_id: i64,
    text: &str,
) {
    info!(target: TARGET_BOT, "Request: {}", text);
    let entry = match catalog.resolve(text) {
        Ok(entry) => entry,
        Err(_) => {
            telegram.send_message(chat_id, "Bird not found.").await;
            return;
        }
    };
    info!(target: TARGET_BOT, "Found: {} {}", entry.name, entry.id);

    let mut bird = ResolvedBird::new(entry);
    if resolver.resolve_image(&mut bird).await {
        if let Some(path) = &bird.image_path {
            telegram.send_photo(chat_id, path).await;
        }
    }
    if resolver.resolve_description(&mut bird).await {
        if let Some(description) = &bird.description {
            telegram.send_message(chat_id, description).await;
        }
    }
    if resolver.resolve_audio(&mut bird).await {
        if let Some(path) = &bird.audio_path {
            telegram.send_voice(chat_id, path).await;
        }
    }
}
