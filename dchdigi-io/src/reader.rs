//! Simulated event file readers.
//!
//! Event files are JSON arrays of `{ "run", "event", "hits" }` objects with
//! hit lengths in millimetres.

use crate::{Error, Result};
use dchdigi_core::SimEvent;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Reader for JSON event files.
#[derive(Debug)]
pub struct EventFileReader {
    path: PathBuf,
    events: Vec<SimEvent>,
}

impl EventFileReader {
    /// Opens and parses an event file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid event
    /// list.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let events = serde_json::from_reader(reader)?;
        Ok(Self {
            path: path.to_path_buf(),
            events,
        })
    }

    /// Parses events from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON is not a valid event list.
    pub fn from_json(json: &str) -> Result<Vec<SimEvent>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Source path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed events in file order.
    #[must_use]
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Takes ownership of the parsed events.
    #[must_use]
    pub fn into_events(self) -> Vec<SimEvent> {
        self.events
    }

    /// Statistics over all events.
    #[must_use]
    pub fn summary(&self) -> EventSummary {
        EventSummary::from_events(&self.events)
    }
}

/// Hit statistics of an event sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventSummary {
    /// Number of events.
    pub n_events: usize,
    /// Total number of hits.
    pub n_hits: usize,
    /// Fewest hits in one event.
    pub min_hits: usize,
    /// Most hits in one event.
    pub max_hits: usize,
    /// Sum of all energy deposits in GeV.
    pub total_edep: f64,
    /// Number of distinct runs.
    pub n_runs: usize,
}

impl EventSummary {
    /// Computes statistics over `events`.
    #[must_use]
    pub fn from_events(events: &[SimEvent]) -> Self {
        let mut runs: Vec<u32> = events.iter().map(|e| e.header.run).collect();
        runs.sort_unstable();
        runs.dedup();

        Self {
            n_events: events.len(),
            n_hits: events.iter().map(SimEvent::len).sum(),
            min_hits: events.iter().map(SimEvent::len).min().unwrap_or(0),
            max_hits: events.iter().map(SimEvent::len).max().unwrap_or(0),
            total_edep: events
                .iter()
                .flat_map(|e| e.hits.iter())
                .map(|h| h.edep)
                .sum(),
            n_runs: runs.len(),
        }
    }

    /// Average hits per event.
    #[must_use]
    pub fn mean_hits(&self) -> f64 {
        if self.n_events == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.n_hits as f64 / self.n_events as f64;
        mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dchdigi_core::RawHit;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EVENTS: &str = r#"[
        { "run": 1, "event": 10, "hits": [
            { "cell_id": 17, "position": { "x": 360.0, "y": 1.0, "z": -20.0 },
              "momentum": { "x": 0.5, "y": 0.1, "z": 0.0 },
              "edep": 2.0e-6, "path_length": 9.5, "time": 1.2 },
            { "cell_id": 18, "position": { "x": 370.0, "y": 2.0, "z": 5.0 },
              "momentum": { "x": 0.0, "y": 0.0, "z": 1.0 },
              "edep": 1.0e-6, "path_length": 4.0, "time": 1.3, "mass": 0.000511 }
        ] },
        { "run": 1, "event": 11, "hits": [] },
        { "run": 2, "event": 1, "hits": [
            { "cell_id": 19, "position": { "x": 0.0, "y": 400.0, "z": 0.0 },
              "momentum": { "x": 0.0, "y": 1.0, "z": 0.0 },
              "edep": 3.0e-6, "path_length": 12.0, "time": 0.0 }
        ] }
    ]"#;

    #[test]
    fn test_read_events() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(EVENTS.as_bytes()).unwrap();

        let reader = EventFileReader::open(file.path()).unwrap();
        let events = reader.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].header.event, 10);
        assert_eq!(events[0].hits[0].cell_id, 17);
        assert_relative_eq!(events[0].hits[0].position.z, -20.0);
        // missing mass defaults to a charged pion
        assert_relative_eq!(events[0].hits[0].mass, RawHit::PION_MASS);
        assert_relative_eq!(events[0].hits[1].mass, 0.000_511);
        assert!(events[1].is_empty());
    }

    #[test]
    fn test_summary() {
        let events = EventFileReader::from_json(EVENTS).unwrap();
        let summary = EventSummary::from_events(&events);
        assert_eq!(summary.n_events, 3);
        assert_eq!(summary.n_hits, 3);
        assert_eq!(summary.min_hits, 0);
        assert_eq!(summary.max_hits, 2);
        assert_eq!(summary.n_runs, 2);
        assert_relative_eq!(summary.total_edep, 6.0e-6);
        assert_relative_eq!(summary.mean_hits(), 1.0);
    }

    #[test]
    fn test_missing_and_malformed_files() {
        assert!(matches!(
            EventFileReader::open("/nonexistent/events.json"),
            Err(Error::MissingFile(_))
        ));
        assert!(matches!(
            EventFileReader::from_json(r#"[{ "run": 1 }]"#),
            Err(Error::JsonError(_))
        ));
    }
}
