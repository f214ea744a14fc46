use std::time::Duration;

use anyhow::Context;
use serde_json::json;
use thirtyfour::{
    extensions::query::ElementQueryable, By, CapabilitiesHelper, ChromiumLikeCapabilities,
    DesiredCapabilities, WebDriver,
};

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const LANDMARK_TIMEOUT: Duration = Duration::from_secs(10);
const LANDMARK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One remote browser session. Opened fresh for every fetch and torn down on
/// every exit path via [`fetch_page_source`].
pub struct Scout {
    driver: WebDriver,
}

impl Scout {
    /// Connect to the remote endpoint with the fixed option set the registry
    /// site tolerates: English locale, WebRTC/DNS-over-HTTPS leak vectors
    /// off, automation signals hidden, no first-run prompts, sandbox off,
    /// performance and browser logs captured.
    pub async fn open(remote_url: &str) -> anyhow::Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in [
            "--lang=en-US",
            "--start-maximized",
            "--disable-webrtc",
            "--disable-features=WebRtcHideLocalIpsWithMdns",
            "--force-webrtc-ip-handling-policy=default_public_interface_only",
            "--disable-features=DnsOverHttps",
            "--no-default-browser-check",
            "--no-first-run",
            "--no-sandbox",
            "--test-type",
            "--disable-blink-features=AutomationControlled",
        ] {
            caps.add_arg(arg)?;
        }
        caps.add_experimental_option("excludeSwitches", ["enable-automation"])?;
        caps.add_experimental_option("useAutomationExtension", false)?;
        caps.insert_base_capability(
            "goog:loggingPrefs".to_string(),
            json!({"performance": "ALL", "browser": "ALL"}),
        );

        let driver = WebDriver::new(remote_url, caps)
            .await
            .with_context(|| format!("connecting to webdriver at {}", remote_url))?;

        let scout = Scout { driver };
        if let Err(e) = scout.driver.set_page_load_timeout(PAGE_LOAD_TIMEOUT).await {
            scout.dismiss().await;
            return Err(e.into());
        }
        Ok(scout)
    }

    /// Navigate to `url`, block until `landmark` is visible, return the page
    /// markup.
    pub async fn page_source(&self, url: &str, landmark: &str) -> anyhow::Result<String> {
        self.driver.goto(url).await?;
        self.driver
            .query(By::Css(landmark))
            .wait(LANDMARK_TIMEOUT, LANDMARK_POLL_INTERVAL)
            .and_displayed()
            .first()
            .await
            .with_context(|| format!("waiting for landmark '{}' on {}", landmark, url))?;
        self.driver.source().await.map_err(Into::into)
    }

    /// Tear the session down. Quit failures are logged, not surfaced; the
    /// page source either was captured by now or never will be.
    pub async fn dismiss(self) {
        if let Err(e) = self.driver.quit().await {
            log::error!("Failed to quit webdriver session: {:?}", e);
        }
    }
}

/// Fetch the markup of `url` through a fresh remote session, waiting for
/// `landmark` to become visible. The session is torn down whether or not the
/// fetch succeeded.
pub async fn fetch_page_source(
    remote_url: &str,
    url: &str,
    landmark: &str,
) -> anyhow::Result<String> {
    let scout = Scout::open(remote_url).await?;
    let page = scout.page_source(url, landmark).await;
    scout.dismiss().await;
    page
}
