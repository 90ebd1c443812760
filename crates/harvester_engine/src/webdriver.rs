use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use harvest_logging::{harvest_debug, harvest_info};
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::{Page, PageError};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

const SCROLL_SCRIPT: &str = "arguments[0].scrollIntoView(true);";

/// Reads the text of `arguments[1]` across the shadow boundary of `arguments[0]`.
///
/// Score widgets render like this:
///
/// ```html
/// <score-pairs-deprecated>
///   #shadow-root
///     <slot name="criticsScore"></slot>
///   <rt-text slot="criticsScore">95%</rt-text>
/// </score-pairs-deprecated>
/// ```
///
/// A match inside the shadow root wins. A matched `<slot>` yields the text of the nodes
/// assigned to it, not its own fallback content. Otherwise the selector is tried on the
/// host's light-DOM children, which is where slotted content like the `rt-text` above lives.
const BOUNDARY_SCRIPT: &str = r#"
const host = arguments[0];
const selector = arguments[1];
const textOf = (node) => node.tagName === 'SLOT'
    ? node.assignedNodes({ flatten: true }).map((n) => n.textContent).join('')
    : node.textContent;
const inner = host.shadowRoot ? host.shadowRoot.querySelector(selector) : null;
if (inner) { return textOf(inner); }
const slotted = host.querySelector(selector);
return slotted ? textOf(slotted) : null;
"#;

/// A live browser tab driven over the WebDriver protocol.
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    /// Opens a new session on the WebDriver server at `webdriver_url`.
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, PageError> {
        let mut capabilities = serde_json::Map::new();
        if headless {
            capabilities.insert(
                "moz:firefoxOptions".to_string(),
                json!({ "args": ["-headless"] }),
            );
            capabilities.insert(
                "goog:chromeOptions".to_string(),
                json!({ "args": ["--headless=new"] }),
            );
        }
        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(webdriver_url)
            .await
            .map_err(|err| PageError::Driver(err.to_string()))?;
        harvest_info!("webdriver session opened at {webdriver_url} (headless: {headless})");
        Ok(Self { client })
    }

    async fn is_interactable(element: &Element) -> Result<bool, PageError> {
        let displayed = element.is_displayed().await.map_err(map_cmd_error)?;
        let enabled = element.is_enabled().await.map_err(map_cmd_error)?;
        Ok(displayed && enabled)
    }
}

#[async_trait(?Send)]
impl Page for WebDriverPage {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> Result<(), PageError> {
        self.client
            .goto(url)
            .await
            .map_err(|err| PageError::Navigation {
                url: url.to_string(),
                message: err.to_string(),
            })
    }

    async fn wait_for_all(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Element>, PageError> {
        self.client
            .wait()
            .at_most(timeout)
            .every(POLL_INTERVAL)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|err| map_wait_error(err, selector, timeout))?;
        self.client
            .find_all(Locator::Css(selector))
            .await
            .map_err(map_cmd_error)
    }

    async fn wait_for_interactable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, PageError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.client.find(Locator::Css(selector)).await {
                Ok(element) => {
                    if Self::is_interactable(&element).await? {
                        return Ok(element);
                    }
                    harvest_debug!("`{selector}` present but not interactable yet");
                }
                Err(err) if err.is_no_such_element() => {}
                Err(err) => return Err(map_cmd_error(err)),
            }
            if Instant::now() >= deadline {
                return Err(PageError::Timeout {
                    selector: selector.to_string(),
                    waited: timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_within(
        &self,
        scope: &Element,
        selector: &str,
    ) -> Result<Option<Element>, PageError> {
        match scope.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(element)),
            Err(err) if err.is_no_such_element() => Ok(None),
            Err(err) => Err(map_cmd_error(err)),
        }
    }

    async fn text(&self, element: &Element) -> Result<String, PageError> {
        element.text().await.map_err(map_cmd_error)
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>, PageError> {
        element.attr(name).await.map_err(map_cmd_error)
    }

    async fn boundary_text(
        &self,
        host: &Element,
        selector: &str,
    ) -> Result<Option<String>, PageError> {
        let host = element_arg(host)?;
        let value = self
            .client
            .execute(BOUNDARY_SCRIPT, vec![host, Value::from(selector)])
            .await
            .map_err(map_cmd_error)?;
        Ok(script_text(value))
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<(), PageError> {
        let arg = element_arg(element)?;
        self.client
            .execute(SCROLL_SCRIPT, vec![arg])
            .await
            .map(|_| ())
            .map_err(map_cmd_error)
    }

    async fn click(&mut self, element: &Element) -> Result<(), PageError> {
        element.click().await.map_err(map_cmd_error)
    }

    async fn close(self) -> Result<(), PageError> {
        self.client.close().await.map_err(map_cmd_error)?;
        harvest_info!("webdriver session closed");
        Ok(())
    }
}

/// Text returned by a page-side script; `null` means nothing matched.
fn script_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn element_arg(element: &Element) -> Result<Value, PageError> {
    serde_json::to_value(element).map_err(|err| PageError::Driver(err.to_string()))
}

fn map_wait_error(err: CmdError, selector: &str, timeout: Duration) -> PageError {
    match err {
        CmdError::WaitTimeout => PageError::Timeout {
            selector: selector.to_string(),
            waited: timeout,
        },
        other => map_cmd_error(other),
    }
}

fn map_cmd_error(err: CmdError) -> PageError {
    if err.is_no_such_element() {
        return PageError::NotFound(err.to_string());
    }
    let message = err.to_string();
    if message.contains("stale element") {
        PageError::Stale
    } else if message.contains("not interactable") || message.contains("click intercepted") {
        PageError::NotInteractable(message)
    } else {
        PageError::Driver(message)
    }
}
