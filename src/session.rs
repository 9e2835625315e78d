//! Browser session management
//!
//! A `ChromeSession` is one Chrome process, the task pumping its DevTools
//! protocol events, and the single page the run works in. The rest of the
//! crate talks to it through [`PageDriver`] so the scroll and extraction flow
//! can be exercised without a browser.

use crate::{create_browser_config, BrowserSettings, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Operations the page loader needs from a live browser page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageDriver: Send {
    /// Navigate and resolve once the document has loaded.
    async fn navigate(&mut self, url: &str) -> Result<(), ScrapeError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), ScrapeError>;

    /// Current `document.body.scrollHeight`.
    async fn page_height(&mut self) -> Result<u64, ScrapeError>;

    /// Full rendered markup.
    async fn content(&mut self) -> Result<String, ScrapeError>;

    /// Tear down the session. Called exactly once per acquired session.
    async fn close(&mut self) -> Result<(), ScrapeError>;
}

pub struct ChromeSession {
    browser: Browser,
    page: Page,
    /// Background task handling Chrome DevTools Protocol communication
    handler: JoinHandle<Result<(), CdpError>>,
    closed: bool,
}

impl ChromeSession {
    /// Launch Chrome with the given settings and open a blank working page.
    ///
    /// Every failure here is reported as [`ScrapeError::InitFailure`]; a
    /// partially started browser is shut down before returning.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, ScrapeError> {
        let browser_config = create_browser_config(settings)?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScrapeError::InitFailure(e.to_string()))?;

        // The handler implements Stream and must be polled for the browser to make progress
        let handler_task = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        error!("Handler error: {}", e);
                        return Err(e);
                    }
                    None => {
                        debug!("Handler stream ended");
                        break;
                    }
                }
            }
            Ok(())
        });

        let page = match Self::open_page(&browser, settings.stealth).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(e);
            }
        };

        info!(
            "Browser session started (headless={}, stealth={})",
            settings.headless, settings.stealth
        );

        Ok(Self {
            browser,
            page,
            handler: handler_task,
            closed: false,
        })
    }

    async fn open_page(browser: &Browser, stealth: bool) -> Result<Page, ScrapeError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::InitFailure(format!("Failed to open page: {e}")))?;

        if stealth {
            // Must be installed before the first navigation to take effect
            page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
                .await
                .map_err(|e| {
                    ScrapeError::InitFailure(format!("Failed to install stealth script: {e}"))
                })?;
            debug!("Stealth script installed");
        }

        Ok(page)
    }
}

#[async_trait]
impl PageDriver for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrapeError::UnexpectedFailure(format!("Navigation to {url} failed: {e}")))?;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ScrapeError> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await
            .map_err(|e| ScrapeError::UnexpectedFailure(format!("Scroll failed: {e}")))?;
        Ok(())
    }

    async fn page_height(&mut self) -> Result<u64, ScrapeError> {
        let value = self
            .page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(|e| ScrapeError::UnexpectedFailure(format!("Height query failed: {e}")))?;

        value
            .into_value::<u64>()
            .map_err(|e| ScrapeError::UnexpectedFailure(format!("Unexpected height value: {e}")))
    }

    async fn content(&mut self) -> Result<String, ScrapeError> {
        self.page
            .content()
            .await
            .map_err(|e| ScrapeError::UnexpectedFailure(format!("Failed to read page source: {e}")))
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        info!("Closing browser session...");
        let result = self.browser.close().await;
        self.handler.abort();

        match result {
            Ok(_) => {
                info!("Browser session closed");
                Ok(())
            }
            Err(e) => {
                warn!("Browser did not close cleanly: {}", e);
                Err(ScrapeError::UnexpectedFailure(e.to_string()))
            }
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Browser session dropped without close; aborting handler");
            self.handler.abort();
        }
    }
}

/// Masks the usual automation fingerprints before any page script runs.
const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined, configurable: true });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'], configurable: true });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5], configurable: true });

if (!window.chrome) {
    window.chrome = {};
}
if (!window.chrome.runtime) {
    window.chrome.runtime = {
        connect: function() { return { onDisconnect: { addListener: function() {} }, postMessage: function() {} }; },
        sendMessage: function() {},
        onMessage: { addListener: function() {}, removeListener: function() {} },
    };
}

const originalQuery = window.navigator.permissions && window.navigator.permissions.query;
if (originalQuery) {
    window.navigator.permissions.query = (parameters) => (
        parameters.name === 'notifications'
            ? Promise.resolve({ state: Notification.permission })
            : originalQuery(parameters)
    );
}

const getParameter = WebGLRenderingContext.prototype.getParameter;
WebGLRenderingContext.prototype.getParameter = function(parameter) {
    if (parameter === 37445) return 'Intel Inc.';
    if (parameter === 37446) return 'Intel Iris OpenGL Engine';
    return getParameter.apply(this, arguments);
};

delete window.__selenium;
delete window.__webdriver_script_fn;
delete document.__webdriver_evaluate;
delete document.__driver_evaluate;
delete document.__selenium_unwrapped;
"#;
