//! Lazy, filesystem-cached resolution of per-bird media: song recording,
//! detail-page description and photo.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::catalog::CatalogEntry;
use crate::fetch::Fetcher;
use crate::name::{audio_file_candidates, normalize};
use crate::{TARGET_CONTENT, TARGET_WEB_REQUEST};

lazy_static! {
    static ref DESCRIPTION_BLOCK: Regex =
        Regex::new(r#"(?s)description page-item">(.*?)</div>"#).unwrap();
    static ref MARKUP_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref IMAGE_SRC: Regex = Regex::new(r#"class="images">\s+.+src="([^"*]+)"#).unwrap();
}

/// A catalog entry under active resolution for one query.
///
/// The optional fields populate incrementally and, once set, stay valid for
/// the life of the instance. The instance is discarded after the reply is
/// delivered; only the cache files on disk persist across queries.
#[derive(Debug, Clone)]
pub struct ResolvedBird {
    pub entry: CatalogEntry,
    pub description: Option<String>,
    pub image_path: Option<PathBuf>,
    pub audio_path: Option<PathBuf>,
    page_body: Option<String>,
}

impl ResolvedBird {
    pub fn new(entry: &CatalogEntry) -> Self {
        Self {
            entry: entry.clone(),
            description: None,
            image_path: None,
            audio_path: None,
            page_body: None,
        }
    }

    /// Normalized name, used as the cache filename stem.
    pub fn key(&self) -> String {
        normalize(&self.entry.name)
    }
}

/// Fetches and caches per-bird content. Each `resolve_*` operation is
/// idempotent per `ResolvedBird` instance and reports plain success or
/// failure; a failed piece is simply omitted from the reply.
pub struct ContentResolver<F> {
    fetcher: F,
    site_url: String,
    audio_dir: PathBuf,
    images_dir: PathBuf,
}

impl<F: Fetcher> ContentResolver<F> {
    pub fn new(
        fetcher: F,
        site_url: impl Into<String>,
        audio_dir: impl Into<PathBuf>,
        images_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            site_url: site_url.into(),
            audio_dir: audio_dir.into(),
            images_dir: images_dir.into(),
        }
    }

    /// Resolve the bird's song recording into the audio cache.
    ///
    /// Cache file presence is the only hit signal. On a miss, each remote
    /// filename candidate is tried in order and the first response that is
    /// actually audio is streamed to the cache path.
    pub async fn resolve_audio(&self, bird: &mut ResolvedBird) -> bool {
        if bird.audio_path.is_some() {
            return true;
        }
        let path = self.audio_dir.join(format!("{}.mp3", bird.key()));
        if path.exists() {
            debug!(target: TARGET_CONTENT, "Audio cache hit for {}", bird.entry.name);
            bird.audio_path = Some(path);
            return true;
        }

        for candidate in audio_file_candidates(&bird.entry.name) {
            let url = format!(
                "{}components/com_birds/files/{}/mp3/{}",
                self.site_url, bird.entry.id, candidate
            );
            match self.fetcher.fetch_to_file(&url, &path, "audio/mpeg").await {
                Ok(true) => {
                    info!(target: TARGET_CONTENT, "Cached song for {} at {}", bird.entry.name, path.display());
                    bird.audio_path = Some(path);
                    return true;
                }
                Ok(false) => {
                    debug!(target: TARGET_CONTENT, "No audio at {}, trying next candidate", url);
                }
                Err(err) => {
                    error!(target: TARGET_CONTENT, "Failed to fetch song for {}: {}", bird.entry.name, err);
                    return false;
                }
            }
        }
        false
    }

    /// Resolve the description text from the bird's detail page.
    pub async fn resolve_description(&self, bird: &mut ResolvedBird) -> bool {
        if bird.description.is_some() {
            return true;
        }
        if !self.ensure_page_body(bird).await {
            return false;
        }

        let body = bird.page_body.as_deref().unwrap_or_default();
        let extracted = DESCRIPTION_BLOCK
            .captures(body)
            .map(|caps| MARKUP_TAG.replace_all(&caps[1], "").into_owned());
        match extracted {
            Some(text) => {
                bird.description = Some(text);
                true
            }
            None => {
                debug!(target: TARGET_CONTENT, "No description block on page for {}", bird.entry.name);
                false
            }
        }
    }

    /// Resolve the bird's photo into the image cache.
    pub async fn resolve_image(&self, bird: &mut ResolvedBird) -> bool {
        if bird.image_path.is_some() {
            return true;
        }
        let path = self.images_dir.join(format!("{}.jpg", bird.key()));
        if path.exists() {
            debug!(target: TARGET_CONTENT, "Image cache hit for {}", bird.entry.name);
            bird.image_path = Some(path);
            return true;
        }
        if !self.ensure_page_body(bird).await {
            return false;
        }

        let body = bird.page_body.as_deref().unwrap_or_default();
        let Some(image_url) = IMAGE_SRC.captures(body).map(|caps| caps[1].to_string()) else {
            debug!(target: TARGET_CONTENT, "No image link on page for {}", bird.entry.name);
            return false;
        };
        match self.fetcher.fetch_to_file(&image_url, &path, "image/jpeg").await {
            Ok(true) => {
                info!(target: TARGET_CONTENT, "Cached image for {} at {}", bird.entry.name, path.display());
                bird.image_path = Some(path);
                true
            }
            Ok(false) => {
                debug!(target: TARGET_CONTENT, "No jpeg at {}", image_url);
                false
            }
            Err(err) => {
                error!(target: TARGET_CONTENT, "Failed to fetch image for {}: {}", bird.entry.name, err);
                false
            }
        }
    }

    /// Load the detail page once per instance; description and image
    /// extraction both read from the same cached body.
    async fn ensure_page_body(&self, bird: &mut ResolvedBird) -> bool {
        if bird.page_body.is_some() {
            return true;
        }
        let url = format!("{}{}", self.site_url, bird.entry.page_ref);
        match self.fetcher.fetch_text(&url).await {
            Ok(response) if response.ok => {
                bird.page_body = Some(response.body);
                true
            }
            Ok(response) => {
                warn!(target: TARGET_WEB_REQUEST, "Status {} loading detail page {}", response.status, url);
                false
            }
            Err(err) => {
                error!(target: TARGET_WEB_REQUEST, "Failed to load detail page {}: {}", url, err);
                false
            }
        }
    }
}
