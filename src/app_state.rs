use std::sync::Arc;

use crate::browser::RenderFetch;
use crate::config::Config;
use crate::error::ScrapeError;
use crate::scrape::Scraper;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scraper: Arc<Scraper>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Result<Self, ScrapeError> {
        let scraper = Arc::new(Scraper::new(Arc::clone(&config))?);
        Ok(Self { config, scraper })
    }

    /// State with an injected render fallback; used by tests.
    pub fn with_renderer(
        config: Arc<Config>,
        renderer: Arc<dyn RenderFetch>,
    ) -> Result<Self, ScrapeError> {
        let scraper = Arc::new(Scraper::with_renderer(Arc::clone(&config), renderer)?);
        Ok(Self { config, scraper })
    }
}
