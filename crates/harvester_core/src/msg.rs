use crate::ItemRecord;

/// Inputs to [`crate::update`], sent by whoever drives the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The listing page is loaded and the harvest may begin.
    Started,
    /// Records extracted from every visible item container in one pass.
    BatchExtracted(Vec<ItemRecord>),
    /// No item containers could be located on this pass.
    BatchLocateFailed(String),
    /// Result of one disclosure attempt.
    Advanced(Advance),
}

/// Whether the "reveal more" control was activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Control was clicked and the settle delay elapsed; scrape again.
    More,
    /// Control absent or not interactable: end of listing.
    Exhausted,
}
