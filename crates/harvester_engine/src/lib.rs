//! Harvester engine: page capabilities, extraction, the disclosure loop and output.
mod decode;
mod disclosure;
mod extract;
mod fetch;
mod harvest;
mod locator;
mod page;
mod persist;
mod settings;
mod sink;
mod snapshot;
mod types;
mod webdriver;

pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use disclosure::DisclosureDriver;
pub use extract::{FieldLocators, RecordExtractor};
pub use fetch::{FetchError, FetchSettings, FetchedPage, HttpFetcher};
pub use harvest::{run_session, Harvester};
pub use locator::{FieldLocator, MissingField};
pub use page::Page;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use settings::{Catalog, HarvestSettings, SettingsError};
pub use sink::{render_csv, CsvSink};
pub use snapshot::SnapshotPage;
pub use types::{HarvestError, HarvestSummary, PageError};
pub use webdriver::WebDriverPage;
