//! Event containers.

use crate::RawHit;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Run and event numbers identifying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventHeader {
    /// Run number.
    pub run: u32,
    /// Event number within the run.
    pub event: u32,
}

impl EventHeader {
    /// Creates a new header.
    #[inline]
    #[must_use]
    pub fn new(run: u32, event: u32) -> Self {
        Self { run, event }
    }
}

/// Simulated hits of one event.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimEvent {
    /// Event identification.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub header: EventHeader,
    /// Hits in the order delivered by the simulation.
    pub hits: Vec<RawHit>,
}

impl SimEvent {
    /// Creates an event from its header and hits.
    #[must_use]
    pub fn new(header: EventHeader, hits: Vec<RawHit>) -> Self {
        Self { header, hits }
    }

    /// Returns the number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if the event has no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
