//! Harvester core: record model, accumulator, table normalization and the pure
//! state machine that decides when the disclosure loop stops.
mod effect;
mod msg;
mod record;
mod result_set;
mod state;
mod table;
mod update;

pub use effect::{Effect, StopReason};
pub use msg::{Advance, Msg};
pub use record::{normalize_key, Field, FieldValue, ItemRecord, SENTINEL};
pub use result_set::{Offer, ResultSet};
pub use state::{HarvestState, HarvestStats, Phase};
pub use table::{
    drop_incomplete, impute_missing, parse_date, parse_score, Normalizer, NullPolicy, Row, Table,
    COLUMNS, DEFAULT_DATE_FORMAT,
};
pub use update::update;
