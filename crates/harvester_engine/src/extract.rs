use harvest_logging::harvest_debug;
use harvester_core::{Field, FieldValue, ItemRecord};
use serde::{Deserialize, Serialize};

use crate::{FieldLocator, Page};

/// One locator per schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLocators {
    pub title: FieldLocator,
    pub critic_score: FieldLocator,
    pub audience_score: FieldLocator,
    pub availability_date: FieldLocator,
}

impl FieldLocators {
    pub fn get(&self, field: Field) -> &FieldLocator {
        match field {
            Field::Title => &self.title,
            Field::CriticScore => &self.critic_score,
            Field::AudienceScore => &self.audience_score,
            Field::AvailabilityDate => &self.availability_date,
        }
    }
}

/// Pulls a complete [`ItemRecord`] out of one item container.
///
/// Each field is resolved on its own; a failing locator turns into the sentinel
/// for that field and never affects the others.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    locators: FieldLocators,
}

impl RecordExtractor {
    pub fn new(locators: FieldLocators) -> Self {
        Self { locators }
    }

    pub async fn extract<P: Page>(&self, page: &P, container: &P::Element) -> ItemRecord {
        let title = self.title(page, container).await;
        self.complete(page, container, title).await
    }

    /// Reads only the identity field.
    pub async fn title<P: Page>(&self, page: &P, container: &P::Element) -> FieldValue {
        self.field(page, container, Field::Title).await
    }

    /// Reads the remaining fields for a container whose title is already known.
    pub async fn complete<P: Page>(
        &self,
        page: &P,
        container: &P::Element,
        title: FieldValue,
    ) -> ItemRecord {
        let critic_score = self.field(page, container, Field::CriticScore).await;
        let audience_score = self.field(page, container, Field::AudienceScore).await;
        let availability_date = self.field(page, container, Field::AvailabilityDate).await;
        ItemRecord::new(title, critic_score, audience_score, availability_date)
    }

    async fn field<P: Page>(&self, page: &P, container: &P::Element, field: Field) -> FieldValue {
        let locator = self.locators.get(field);
        match locator.resolve(page, container).await {
            Ok(text) => FieldValue::from_text(text),
            Err(missing) => {
                harvest_debug!("{field} missing via `{locator}`: {missing}");
                FieldValue::Missing
            }
        }
    }
}
