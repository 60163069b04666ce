//! Process configuration, read once from the environment at startup.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SITE_URL: &str = "http://www.birdzilla.com/";

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub audio_dir: PathBuf,
    pub images_dir: PathBuf,
    pub site_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .context("TELEGRAM_BOT_TOKEN environment variable required")?;
        let audio_dir = env::var("AUDIO_PATH")
            .context("AUDIO_PATH environment variable required")?
            .into();
        let images_dir = env::var("IMAGES_PATH")
            .context("IMAGES_PATH environment variable required")?
            .into();
        let site_url = env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string());
        Ok(Self {
            bot_token,
            audio_dir,
            images_dir,
            site_url,
        })
    }

    pub fn ensure_cache_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.audio_dir).with_context(|| {
            format!(
                "failed to create audio cache directory {}",
                self.audio_dir.display()
            )
        })?;
        fs::create_dir_all(&self.images_dir).with_context(|| {
            format!(
                "failed to create image cache directory {}",
                self.images_dir.display()
            )
        })?;
        Ok(())
    }
}
