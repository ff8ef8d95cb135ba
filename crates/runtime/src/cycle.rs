/// Deterministic command-cycle metadata.
///
/// One cycle is opened per applied command (load, toggle, attribute change,
/// draw, clear). The index is the only timebase of the engine, so a recorded
/// command log replays to identical state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cycle {
    /// 0-based cycle index.
    pub index: u64,
}

impl Cycle {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1)
    }
}
