//! CDP request interception.
//!
//! Verdicts are decided per paused request: the main document always goes
//! through, heavyweight subresources and known trackers are aborted, and
//! everything else (scripts, XHR, fetch) continues so JS-gated articles can
//! still hydrate.

use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
    RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::{debug, trace};

use crate::error::ScrapeError;

/// Hostname fragments whose requests are aborted during navigation.
pub const TRACKER_DENYLIST: [&str; 9] = [
    "doubleclick",
    "googlesyndication",
    "google-analytics",
    "facebook.com/tr",
    "taboola",
    "outbrain",
    "scorecardresearch",
    "chartbeat",
    "amazon-adsystem",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Abort,
}

/// Decide what to do with a paused request. The main document is never
/// blocked, whatever its URL looks like.
pub fn verdict(resource_type: &ResourceType, url: &str) -> Verdict {
    if *resource_type == ResourceType::Document {
        return Verdict::Allow;
    }

    if matches!(
        resource_type,
        ResourceType::Image | ResourceType::Media | ResourceType::Font | ResourceType::Stylesheet
    ) {
        return Verdict::Abort;
    }

    let lowered = url.to_lowercase();
    if TRACKER_DENYLIST
        .iter()
        .any(|fragment| lowered.contains(fragment))
    {
        return Verdict::Abort;
    }

    Verdict::Allow
}

/// Enable fetch-stage interception on the page and spawn the verdict loop.
/// Must run before the first navigation. The loop ends on its own when the
/// page's CDP connection closes.
pub async fn install(page: &Page) -> Result<(), ScrapeError> {
    let pattern = RequestPattern::builder()
        .url_pattern("*")
        .request_stage(RequestStage::Request)
        .build();
    page.execute(EnableParams::builder().pattern(pattern).build())
        .await
        .map_err(|err| ScrapeError::Browser(err.to_string()))?;

    let mut events = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|err| ScrapeError::Browser(err.to_string()))?;

    let page = page.clone();
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let request_id = event.request_id.clone();
            let decision = verdict(&event.resource_type, &event.request.url);
            trace!(url = %event.request.url, ?decision, "request paused");

            let outcome = match decision {
                Verdict::Abort => page
                    .execute(FailRequestParams::new(request_id, ErrorReason::Aborted))
                    .await
                    .map(|_| ()),
                Verdict::Allow => page
                    .execute(ContinueRequestParams::new(request_id))
                    .await
                    .map(|_| ()),
            };
            if let Err(err) = outcome {
                // The page is usually gone by now; nothing to salvage.
                debug!(%err, "interception verdict not delivered");
            }
        }
    });

    Ok(())
}
