use std::time::Duration;

use harvest_logging::{harvest_debug, harvest_info};
use harvester_core::Advance;

use crate::{Page, PageError};

/// Activates the page's "load more" control once per call.
#[derive(Debug, Clone)]
pub struct DisclosureDriver {
    control_selector: String,
    wait_timeout: Duration,
    settle_delay: Duration,
}

impl DisclosureDriver {
    pub fn new(
        control_selector: impl Into<String>,
        wait_timeout: Duration,
        settle_delay: Duration,
    ) -> Self {
        Self {
            control_selector: control_selector.into(),
            wait_timeout,
            settle_delay,
        }
    }

    /// Clicks the control and waits the settle delay.
    ///
    /// A missing, hidden or unclickable control means the listing is exhausted; that is
    /// reported as [`Advance::Exhausted`], never as an error. The cap is the caller's
    /// concern: `current` and `cap` are only logged.
    pub async fn advance<P: Page>(&self, page: &mut P, current: usize, cap: usize) -> Advance {
        match self.activate(page).await {
            Ok(()) => {
                harvest_debug!(
                    "revealed more items ({current}/{cap} collected), settling for {:?}",
                    self.settle_delay
                );
                if !self.settle_delay.is_zero() {
                    tokio::time::sleep(self.settle_delay).await;
                }
                Advance::More
            }
            Err(err) => {
                harvest_info!(
                    "no more items to reveal via `{}` ({current}/{cap} collected): {err}",
                    self.control_selector
                );
                Advance::Exhausted
            }
        }
    }

    async fn activate<P: Page>(&self, page: &mut P) -> Result<(), PageError> {
        let control = page
            .wait_for_interactable(&self.control_selector, self.wait_timeout)
            .await?;
        page.scroll_into_view(&control).await?;
        page.click(&control).await
    }
}
