use std::time::Duration;

use async_trait::async_trait;
use ego_tree::NodeId;
use harvest_logging::harvest_debug;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::fetch::{FetchSettings, HttpFetcher};
use crate::{Page, PageError};

/// A [`Page`] over a static HTML document.
///
/// Nothing renders after load, so waits succeed or fail immediately. Clicking an
/// element that carries an `href` navigates to it, which is how "next page" links on
/// server-rendered listings are followed; any other click is not interactable.
/// Encapsulated sub-trees (declarative shadow roots) are plain descendants here.
pub struct SnapshotPage {
    document: Option<Html>,
    current_url: Option<Url>,
    fetcher: Option<HttpFetcher>,
}

impl SnapshotPage {
    /// A page that fetches over HTTP on every navigation.
    pub fn fetching(settings: FetchSettings) -> Result<Self, PageError> {
        Ok(Self {
            document: None,
            current_url: None,
            fetcher: Some(HttpFetcher::new(settings)?),
        })
    }

    /// A page preloaded with `html`. Navigation is unavailable without a fetcher.
    pub fn from_html(html: &str) -> Self {
        Self {
            document: Some(Html::parse_document(html)),
            current_url: None,
            fetcher: None,
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_ref().map(Url::as_str)
    }

    fn document(&self) -> Result<&Html, PageError> {
        self.document.as_ref().ok_or(PageError::NotLoaded)
    }

    fn element<'a>(&self, doc: &'a Html, id: NodeId) -> Result<ElementRef<'a>, PageError> {
        doc.tree
            .get(id)
            .and_then(ElementRef::wrap)
            .ok_or(PageError::Stale)
    }

    fn select_all(&self, selector: &str) -> Result<Vec<NodeId>, PageError> {
        let parsed = parse_selector(selector)?;
        Ok(self.document()?.select(&parsed).map(|el| el.id()).collect())
    }

    fn resolve_href(&self, href: &str) -> Result<String, PageError> {
        let resolved = match &self.current_url {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        resolved
            .map(|url| url.to_string())
            .map_err(|err| PageError::Navigation {
                url: href.to_string(),
                message: err.to_string(),
            })
    }
}

#[async_trait(?Send)]
impl Page for SnapshotPage {
    type Element = NodeId;

    async fn navigate(&mut self, url: &str) -> Result<(), PageError> {
        let Some(fetcher) = self.fetcher.as_ref() else {
            return Err(PageError::Navigation {
                url: url.to_string(),
                message: "snapshot page has no fetcher".to_string(),
            });
        };
        let fetched = fetcher.fetch(url).await?;
        harvest_debug!("loaded snapshot of {}", fetched.url);
        self.document = Some(Html::parse_document(&fetched.html));
        self.current_url = Some(fetched.url);
        Ok(())
    }

    async fn wait_for_all(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<NodeId>, PageError> {
        let found = self.select_all(selector)?;
        if found.is_empty() {
            return Err(PageError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            });
        }
        Ok(found)
    }

    async fn wait_for_interactable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<NodeId, PageError> {
        let doc = self.document()?;
        let parsed = parse_selector(selector)?;
        let control = doc
            .select(&parsed)
            .find(|el| {
                el.value().attr("disabled").is_none() && el.value().attr("hidden").is_none()
            })
            .ok_or_else(|| PageError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            })?;
        Ok(control.id())
    }

    async fn find_within(
        &self,
        scope: &NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, PageError> {
        let parsed = parse_selector(selector)?;
        let doc = self.document()?;
        let scope = self.element(doc, *scope)?;
        Ok(scope.select(&parsed).next().map(|el| el.id()))
    }

    async fn text(&self, element: &NodeId) -> Result<String, PageError> {
        let doc = self.document()?;
        Ok(self.element(doc, *element)?.text().collect())
    }

    async fn attribute(&self, element: &NodeId, name: &str) -> Result<Option<String>, PageError> {
        let doc = self.document()?;
        Ok(self
            .element(doc, *element)?
            .value()
            .attr(name)
            .map(str::to_string))
    }

    async fn boundary_text(
        &self,
        host: &NodeId,
        selector: &str,
    ) -> Result<Option<String>, PageError> {
        let found = self.find_within(host, selector).await?;
        match found {
            Some(id) => self.text(&id).await.map(Some),
            None => Ok(None),
        }
    }

    async fn scroll_into_view(&self, element: &NodeId) -> Result<(), PageError> {
        let doc = self.document()?;
        self.element(doc, *element).map(|_| ())
    }

    async fn click(&mut self, element: &NodeId) -> Result<(), PageError> {
        let href = {
            let doc = self.document()?;
            let el = self.element(doc, *element)?;
            el.value()
                .attr("href")
                .map(str::to_string)
                .ok_or_else(|| PageError::NotInteractable(el.value().name().to_string()))?
        };
        let target = self.resolve_href(&href)?;
        self.navigate(&target).await
    }

    async fn close(self) -> Result<(), PageError> {
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|err| PageError::Selector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}
