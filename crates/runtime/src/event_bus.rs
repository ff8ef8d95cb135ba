use crate::cycle::Cycle;

/// Kind of pipeline stage that produced an [`Event`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Load,
    Visibility,
    Attribute,
    Domain,
    Selection,
    Aggregation,
    Report,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Load => "load",
            EventKind::Visibility => "visibility",
            EventKind::Attribute => "attribute",
            EventKind::Domain => "domain",
            EventKind::Selection => "selection",
            EventKind::Aggregation => "aggregation",
            EventKind::Report => "report",
        }
    }
}

/// Record of one recomputation step, tagged with the command cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub cycle_index: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Ordered trace of pipeline stages.
///
/// The controller emits one event per stage it recomputes, so tests can assert
/// the fixed recomputation order without scraping log output. Only the most
/// recent `retained_cycles` cycles are kept.
#[derive(Debug)]
pub struct EventBus {
    events: Vec<Event>,
    retained_cycles: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub const DEFAULT_RETAINED_CYCLES: u64 = 64;

    pub fn new() -> Self {
        Self::with_retention(Self::DEFAULT_RETAINED_CYCLES)
    }

    /// Keeps events of the last `cycles` cycles (at least one).
    pub fn with_retention(cycles: u64) -> Self {
        Self {
            events: Vec::new(),
            retained_cycles: cycles.max(1),
        }
    }

    pub fn emit(&mut self, cycle: Cycle, kind: EventKind, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(cycle = cycle.index, stage = kind.as_str(), "{message}");
        self.evict_before(cycle.index.saturating_sub(self.retained_cycles - 1));
        self.events.push(Event {
            cycle_index: cycle.index,
            kind,
            message,
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Stage kinds emitted during `cycle`, in emission order.
    pub fn kinds_for(&self, cycle: Cycle) -> Vec<EventKind> {
        self.events
            .iter()
            .filter(|e| e.cycle_index == cycle.index)
            .map(|e| e.kind)
            .collect()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn evict_before(&mut self, oldest_kept: u64) {
        let stale = self
            .events
            .iter()
            .take_while(|e| e.cycle_index < oldest_kept)
            .count();
        if stale > 0 {
            self.events.drain(..stale);
        }
    }
}
