#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Locate all item containers and extract a record from each.
    ScrapeBatch,
    /// Try the disclosure control once.
    AdvanceDisclosure { current: usize, cap: usize },
    /// Stop the loop; build and persist the table.
    Finalize { reason: StopReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CapReached,
    ControlExhausted,
    BatchLocateFailed,
    /// The control was activated but the following batch added nothing new.
    NoProgress,
}
