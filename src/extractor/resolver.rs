use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::extractor::{
    description::DescriptionFallback,
    filter::{self, ScanSession},
    images::{has_image_extension, nested_url},
    model::{ImageCandidate, ImageTag},
    scan_page,
};
use crate::fetcher::{self, FetchError};

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub page_timeout: Duration,
    pub probe_timeout: Duration,
    pub max_probes: usize,
}

impl From<&Config> for ResolverSettings {
    fn from(config: &Config) -> Self {
        Self {
            page_timeout: config.page_timeout(),
            probe_timeout: config.probe_timeout(),
            max_probes: config.max_probes(),
        }
    }
}

/// Images kept from an article page, plus the page's stand-in description.
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    pub images: Vec<ImageCandidate>,
    pub description: DescriptionFallback,
}

/// Downloads article pages and decides which of their images to keep.
/// Cloning is cheap; the HTTP client is reference counted.
#[derive(Debug, Clone)]
pub struct PageResolver {
    client: Client,
    settings: ResolverSettings,
}

impl PageResolver {
    pub fn new(client: Client, settings: ResolverSettings) -> Self {
        Self { client, settings }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, page_url: &str) -> Result<ResolvedPage, FetchError> {
        let page = fetcher::fetch(&self.client, page_url, self.settings.page_timeout).await?;
        let origin = page.origin();
        let scan = scan_page(&page.body_utf8);

        // Filtering is sequential so duplicates are judged in document order.
        let mut session = ScanSession::new();
        let accepted: Vec<&ImageTag> = scan
            .image_tags
            .iter()
            .filter(|tag| filter::accept(tag, &mut session))
            .collect();

        let semaphore = Semaphore::new(self.settings.max_probes.max(1));
        let checks = accepted
            .into_iter()
            .map(|tag| self.verify(tag, &origin, &semaphore));
        let mut images: Vec<ImageCandidate> = join_all(checks).await.into_iter().flatten().collect();

        images.extend(scan.image_links.into_iter().map(|url| ImageCandidate { url, caption: None }));

        debug!(
            image_tags = scan.image_tags.len(),
            kept = images.len(),
            "page resolved"
        );

        Ok(ResolvedPage {
            images,
            description: scan.description,
        })
    }

    /// Resolves a relative source and checks the image can be reached.
    async fn verify(&self, tag: &ImageTag, origin: &Url, semaphore: &Semaphore) -> Option<ImageCandidate> {
        let src = tag.src.as_deref()?;
        let caption = filter::accept_caption(tag.alt.as_deref());
        let _permit = semaphore.acquire().await.ok()?;

        if let Some(resolved) = nested_url(src, origin)
            && has_image_extension(&resolved)
            && fetcher::exists(&self.client, resolved.as_str(), self.settings.probe_timeout).await
        {
            return Some(ImageCandidate {
                url: resolved.into(),
                caption,
            });
        }

        match fetcher::probe(&self.client, src, self.settings.probe_timeout).await {
            Ok(_) => Some(ImageCandidate {
                url: src.to_string(),
                caption,
            }),
            Err(e) => {
                debug!(src, error = %e, "image unreachable, dropped");
                None
            }
        }
    }
}
