use std::time::Duration;

use async_trait::async_trait;

use crate::PageError;

/// Capabilities the harvester needs from a rendered listing page.
///
/// Handles returned by one call are only valid until the page navigates again.
/// Futures are not `Send`: a page is driven by a single task from start to close.
#[async_trait(?Send)]
pub trait Page {
    type Element: Clone;

    async fn navigate(&mut self, url: &str) -> Result<(), PageError>;

    /// Waits up to `timeout` for at least one match, then returns all matches.
    async fn wait_for_all(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Self::Element>, PageError>;

    /// Waits up to `timeout` for a visible, enabled match.
    async fn wait_for_interactable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, PageError>;

    /// First match of `selector` among the descendants of `scope`.
    async fn find_within(
        &self,
        scope: &Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>, PageError>;

    async fn text(&self, element: &Self::Element) -> Result<String, PageError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, PageError>;

    /// Text of `selector` inside the encapsulated sub-tree hosted by `host`.
    async fn boundary_text(
        &self,
        host: &Self::Element,
        selector: &str,
    ) -> Result<Option<String>, PageError>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), PageError>;

    async fn click(&mut self, element: &Self::Element) -> Result<(), PageError>;

    /// Releases the underlying session.
    async fn close(self) -> Result<(), PageError>
    where
        Self: Sized;
}
