use std::collections::{HashSet, VecDeque};

use harvest_logging::{harvest_debug, harvest_error, harvest_info, harvest_warn};
use harvester_core::{
    normalize_key, update, Effect, HarvestState, ItemRecord, Msg, Normalizer, ResultSet, Table,
};

use crate::{
    CsvSink, DisclosureDriver, HarvestError, HarvestSettings, HarvestSummary, Page,
    RecordExtractor,
};

/// Runs one harvest over an already-acquired page.
pub struct Harvester {
    settings: HarvestSettings,
    extractor: RecordExtractor,
    driver: DisclosureDriver,
    normalizer: Normalizer,
    sink: CsvSink,
}

impl Harvester {
    pub fn new(settings: HarvestSettings) -> Result<Self, HarvestError> {
        settings.validate()?;
        Ok(Self {
            extractor: RecordExtractor::new(settings.fields.clone()),
            driver: DisclosureDriver::new(
                settings.control_selector.clone(),
                settings.wait_timeout(),
                settings.settle_delay(),
            ),
            normalizer: Normalizer::new(settings.date_format.clone()),
            sink: CsvSink::new(settings.output_dir.clone()),
            settings,
        })
    }

    /// Navigates to the listing, drives the disclosure loop, then finalizes and
    /// persists whatever was accumulated.
    pub async fn run<P: Page>(&self, page: &mut P) -> Result<HarvestSummary, HarvestError> {
        harvest_info!(
            "harvesting {} (cap {})",
            self.settings.url,
            self.settings.cap
        );
        page.navigate(&self.settings.url)
            .await
            .map_err(HarvestError::Navigation)?;

        let state = self.collect(page).await;
        let table = self.build_table(&state);
        let output_path = self
            .sink
            .persist(&table, &self.settings.output_filename)?;

        Ok(HarvestSummary {
            output_path,
            rows_written: table.len(),
            stats: state.stats().clone(),
        })
    }

    /// Runs the disclosure loop to completion and returns the final state.
    pub async fn collect<P: Page>(&self, page: &mut P) -> HarvestState {
        let (mut state, effects) = update(HarvestState::new(self.settings.cap), Msg::Started);
        let mut pending: VecDeque<Effect> = effects.into();

        while let Some(effect) = pending.pop_front() {
            let msg = match effect {
                Effect::ScrapeBatch => self.scrape_batch(page, state.results()).await,
                Effect::AdvanceDisclosure { current, cap } => {
                    Msg::Advanced(self.driver.advance(page, current, cap).await)
                }
                Effect::Finalize { reason } => {
                    let stats = state.stats();
                    harvest_info!(
                        "stopped ({reason:?}) after {} batch(es): {} accepted, {} duplicate, \
                         {} untitled, {} over cap",
                        stats.batches,
                        stats.accepted,
                        stats.duplicates,
                        stats.missing_key,
                        stats.over_cap
                    );
                    continue;
                }
            };

            let before = state.stats().clone();
            let (next, effects) = update(state, msg);
            state = next;
            let after = state.stats();
            if after.missing_key > before.missing_key {
                harvest_warn!(
                    "skipped {} item(s) without a title",
                    after.missing_key - before.missing_key
                );
            }
            if after.batches > before.batches {
                harvest_info!(
                    "batch {}: {} new, {}/{} collected",
                    after.batches,
                    after.accepted - before.accepted,
                    state.results().len(),
                    self.settings.cap
                );
            }
            pending.extend(effects);
        }

        state
    }

    /// Coerces the accumulated records and applies the configured null policy.
    pub fn build_table(&self, state: &HarvestState) -> Table {
        let mut table = self.normalizer.finalize(state.results());
        self.settings.null_policy.apply(&mut table);
        table
    }

    /// Extracts one record per visible container.
    ///
    /// Only the title is read for containers that cannot be accepted (already known,
    /// untitled, or past the cap); the remaining fields are read for new titles only.
    async fn scrape_batch<P: Page>(&self, page: &P, known: &ResultSet) -> Msg {
        let containers = match page
            .wait_for_all(&self.settings.item_selector, self.settings.wait_timeout())
            .await
        {
            Ok(containers) => containers,
            Err(err) => {
                harvest_warn!(
                    "could not locate items via `{}`: {err}",
                    self.settings.item_selector
                );
                return Msg::BatchLocateFailed(err.to_string());
            }
        };

        let room = known.cap().get() - known.len();
        let mut fresh: HashSet<String> = HashSet::new();
        let mut records = Vec::with_capacity(containers.len());
        for container in &containers {
            let title = self.extractor.title(page, container).await;
            let wanted = title
                .text()
                .filter(|text| !known.contains_title(text))
                .and_then(normalize_key)
                .is_some_and(|key| fresh.len() < room && fresh.insert(key));
            let record = if wanted {
                self.extractor.complete(page, container, title).await
            } else {
                ItemRecord::titled(title)
            };
            records.push(record);
        }
        harvest_debug!(
            "scraped {} container(s), {} new title(s)",
            containers.len(),
            fresh.len()
        );
        Msg::BatchExtracted(records)
    }
}

/// Harvests with `page` and always releases it afterwards, whether or not the
/// harvest succeeded. Once the table is persisted a release failure is only logged.
pub async fn run_session<P: Page>(
    mut page: P,
    settings: HarvestSettings,
) -> Result<HarvestSummary, HarvestError> {
    let outcome = match Harvester::new(settings) {
        Ok(harvester) => harvester.run(&mut page).await,
        Err(err) => Err(err),
    };
    let released = page.close().await;

    if let Err(err) = released {
        harvest_error!("failed to release page: {err}");
    }
    outcome
}
