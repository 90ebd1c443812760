use std::time::Duration;

use harvester_core::{Field, FieldValue, ItemRecord};
use harvester_engine::{Catalog, FieldLocator, FieldLocators, Page, RecordExtractor, SnapshotPage};
use pretty_assertions::assert_eq;

const LISTING: &str = r#"
<html><body>
  <div data-qa="discovery-media-list-item">
    <span data-qa="discovery-media-list-item-title">  Past Lives  </span>
    <score-pairs-deprecated criticsscore="95" audiencescore="89">
      <template shadowrootmode="open">
        <slot name="criticsScore"></slot>
        <slot name="audienceScore"></slot>
      </template>
      <rt-text slot="criticsScore">95%</rt-text>
      <rt-text slot="audienceScore">89%</rt-text>
    </score-pairs-deprecated>
    <span class="smaller" data-qa="discovery-media-list-item-start-date">Jan 5, 2024</span>
  </div>
  <div data-qa="discovery-media-list-item">
    <span data-qa="discovery-media-list-item-title">Untracked</span>
  </div>
  <div data-qa="discovery-media-list-item"></div>
</body></html>
"#;

fn init_logging() {
    harvest_logging::initialize_for_tests();
}

async fn extract_all(locators: FieldLocators) -> Vec<ItemRecord> {
    let page = SnapshotPage::from_html(LISTING);
    let containers = page
        .wait_for_all(r#"div[data-qa="discovery-media-list-item"]"#, Duration::ZERO)
        .await
        .unwrap();
    let extractor = RecordExtractor::new(locators);
    let mut records = Vec::new();
    for container in &containers {
        records.push(extractor.extract(&page, container).await);
    }
    records
}

#[tokio::test]
async fn text_locators_read_trimmed_text() {
    init_logging();
    let records = extract_all(Catalog::Netflix.settings().fields).await;

    assert_eq!(records.len(), 3);
    assert_eq!(
        records[0],
        ItemRecord::from_raw("Past Lives", "95%", "89%", "Jan 5, 2024")
    );
}

#[tokio::test]
async fn attribute_locators_read_score_attributes() {
    init_logging();
    let records = extract_all(Catalog::PrimeVideo.settings().fields).await;

    assert_eq!(
        records[0].get(Field::CriticScore),
        &FieldValue::Text("95".to_string())
    );
    assert_eq!(
        records[0].get(Field::AudienceScore),
        &FieldValue::Text("89".to_string())
    );
}

#[tokio::test]
async fn boundary_locators_read_slotted_score_text() {
    init_logging();
    let records = extract_all(Catalog::Hulu.settings().fields).await;

    assert_eq!(records[0].get(Field::CriticScore).as_str(), "95%");
    assert_eq!(records[0].get(Field::AudienceScore).as_str(), "89%");
}

#[tokio::test]
async fn missing_fields_fall_back_to_sentinel_individually() {
    init_logging();
    let records = extract_all(Catalog::Netflix.settings().fields).await;

    assert_eq!(
        records[1],
        ItemRecord::from_raw("Untracked", "N/A", "N/A", "N/A")
    );
}

#[tokio::test]
async fn all_locators_failing_yield_a_complete_sentinel_record() {
    init_logging();
    let records = extract_all(Catalog::Netflix.settings().fields).await;

    let empty = &records[2];
    for (_, value) in empty.fields() {
        assert_eq!(value.as_str(), "N/A");
    }
    assert_eq!(empty.identity_key(), None);
}

#[tokio::test]
async fn broken_locator_only_affects_its_own_field() {
    init_logging();
    let mut locators = Catalog::Netflix.settings().fields;
    locators.critic_score = FieldLocator::text("rt-text[[[");
    locators.audience_score = FieldLocator::attribute("score-pairs-deprecated", "nope");

    let records = extract_all(locators).await;
    assert_eq!(
        records[0],
        ItemRecord::from_raw("Past Lives", "N/A", "N/A", "Jan 5, 2024")
    );
}

#[tokio::test]
async fn blank_text_counts_as_missing() {
    init_logging();
    let page = SnapshotPage::from_html(r#"<div class="tile"><span class="t">   </span></div>"#);
    let tile = page.wait_for_all("div.tile", Duration::ZERO).await.unwrap();
    let locator = FieldLocator::text("span.t");

    let err = locator.resolve(&page, &tile[0]).await.unwrap_err();
    assert!(matches!(err, harvester_engine::MissingField::Empty));
}
