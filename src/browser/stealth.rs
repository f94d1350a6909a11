//! Anti-automation fingerprint adjustments.
//!
//! Headless Chromium advertises itself in several ways that challenge pages
//! check for. Before the first navigation we align the UA string and client
//! hints with the configured Chrome major, pin the timezone, and patch the
//! obvious `navigator` giveaways on every new document.

use chromiumoxide::cdp::browser_protocol::emulation::{
    SetTimezoneOverrideParams, SetUserAgentOverrideParams, UserAgentBrandVersion,
    UserAgentMetadata,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page;

use crate::config::Config;
use crate::error::ScrapeError;

const TIMEZONE: &str = "America/New_York";

const STEALTH_JS: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => false, configurable: true });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'], configurable: true });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5], configurable: true });
window.chrome = window.chrome || { runtime: {} };
"#;

/// Apply the full spoofing set to a fresh page.
pub async fn apply(page: &Page, config: &Config) -> Result<(), ScrapeError> {
    page.execute(user_agent_override(config)?)
        .await
        .map_err(|err| ScrapeError::Browser(err.to_string()))?;

    page.execute(SetTimezoneOverrideParams::new(TIMEZONE))
        .await
        .map_err(|err| ScrapeError::Browser(err.to_string()))?;

    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_JS))
        .await
        .map_err(|err| ScrapeError::Browser(err.to_string()))?;

    Ok(())
}

/// UA override whose `sec-ch-ua` / `sec-ch-ua-platform` client hints agree
/// with the UA string the HTTP phase sends.
fn user_agent_override(config: &Config) -> Result<SetUserAgentOverrideParams, ScrapeError> {
    let major = config.chrome_major().to_string();
    let brands = vec![
        brand("Chromium", &major)?,
        brand("Google Chrome", &major)?,
        brand("Not-A.Brand", "99")?,
    ];

    let metadata = UserAgentMetadata::builder()
        .brands(brands)
        .platform("Windows")
        .platform_version("10.0.0")
        .architecture("x86")
        .model("")
        .mobile(false)
        .build()
        .map_err(ScrapeError::Browser)?;

    SetUserAgentOverrideParams::builder()
        .user_agent(config.user_agent())
        .user_agent_metadata(metadata)
        .build()
        .map_err(ScrapeError::Browser)
}

fn brand(name: &str, version: &str) -> Result<UserAgentBrandVersion, ScrapeError> {
    UserAgentBrandVersion::builder()
        .brand(name)
        .version(version)
        .build()
        .map_err(ScrapeError::Browser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_hints_track_configured_major() {
        let config = Config::new("UA/1.0", 140, "127.0.0.1:0", 3, 55_000);
        let params = user_agent_override(&config).unwrap();
        assert_eq!(params.user_agent, "UA/1.0");

        let metadata = params.user_agent_metadata.expect("metadata set");
        let brands = metadata.brands.expect("brands set");
        assert!(
            brands
                .iter()
                .any(|entry| entry.brand == "Chromium" && entry.version == "140")
        );
        assert_eq!(metadata.platform, "Windows");
        assert!(!metadata.mobile);
    }
}
