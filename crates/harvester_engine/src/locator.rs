use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Page, PageError};

/// How one field is found inside an item container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldLocator {
    /// Trimmed text of the first match of `selector`.
    Text { selector: String },
    /// Trimmed value of attribute `name` on the first match of `selector`.
    Attribute { selector: String, name: String },
    /// Text of `inner`, queried inside the encapsulated sub-tree of the `host` match.
    Shadow { host: String, inner: String },
}

impl FieldLocator {
    pub fn text(selector: impl Into<String>) -> Self {
        FieldLocator::Text {
            selector: selector.into(),
        }
    }

    pub fn attribute(selector: impl Into<String>, name: impl Into<String>) -> Self {
        FieldLocator::Attribute {
            selector: selector.into(),
            name: name.into(),
        }
    }

    pub fn shadow(host: impl Into<String>, inner: impl Into<String>) -> Self {
        FieldLocator::Shadow {
            host: host.into(),
            inner: inner.into(),
        }
    }

    /// Selector strings this locator depends on.
    pub fn selectors(&self) -> Vec<&str> {
        match self {
            FieldLocator::Text { selector } | FieldLocator::Attribute { selector, .. } => {
                vec![selector.as_str()]
            }
            FieldLocator::Shadow { host, inner } => vec![host.as_str(), inner.as_str()],
        }
    }

    /// Resolves the locator within `container`.
    pub async fn resolve<P: Page>(
        &self,
        page: &P,
        container: &P::Element,
    ) -> Result<String, MissingField> {
        let raw = match self {
            FieldLocator::Text { selector } => {
                let element = find(page, container, selector).await?;
                page.text(&element).await?
            }
            FieldLocator::Attribute { selector, name } => {
                let element = find(page, container, selector).await?;
                page.attribute(&element, name)
                    .await?
                    .ok_or_else(|| MissingField::NotFound(format!("{selector} @{name}")))?
            }
            FieldLocator::Shadow { host, inner } => {
                let host_element = find(page, container, host).await?;
                page.boundary_text(&host_element, inner)
                    .await?
                    .ok_or_else(|| MissingField::NotFound(format!("{host} >>> {inner}")))?
            }
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MissingField::Empty);
        }
        Ok(trimmed.to_string())
    }
}

impl fmt::Display for FieldLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldLocator::Text { selector } => write!(f, "{selector}"),
            FieldLocator::Attribute { selector, name } => write!(f, "{selector} @{name}"),
            FieldLocator::Shadow { host, inner } => write!(f, "{host} >>> {inner}"),
        }
    }
}

/// Why a field could not be read. Never escapes the extractor.
#[derive(Debug, thiserror::Error)]
pub enum MissingField {
    #[error("nothing matches {0}")]
    NotFound(String),
    #[error("matched element has no text")]
    Empty,
    #[error(transparent)]
    Page(#[from] PageError),
}

async fn find<P: Page>(
    page: &P,
    container: &P::Element,
    selector: &str,
) -> Result<P::Element, MissingField> {
    page.find_within(container, selector)
        .await?
        .ok_or_else(|| MissingField::NotFound(selector.to_string()))
}
