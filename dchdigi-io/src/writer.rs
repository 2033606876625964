//! Digi file writers.

use crate::{Error, Result};
use dchdigi_core::{DigiCollection, EventHeader};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Magic bytes at the start of binary digi files.
pub const BINARY_MAGIC: &[u8; 4] = b"DCHD";

/// Binary format version.
pub const BINARY_VERSION: u32 = 1;

/// Output file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One row per digi.
    Csv,
    /// Array of events with their digis and links.
    Json,
    /// Little-endian binary records.
    Binary,
}

impl OutputFormat {
    /// Picks the format from a file extension (`csv`, `json`, `bin`).
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] for unknown or missing extensions.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some("bin" | "dat") => Ok(Self::Binary),
            _ => Err(Error::InvalidFormat(format!(
                "cannot infer output format of {}",
                path.display()
            ))),
        }
    }
}

/// Digitized hits of one event, borrowed for serialization.
#[derive(Serialize)]
struct EventDigis<'a> {
    #[serde(flatten)]
    header: EventHeader,
    #[serde(flatten)]
    digis: &'a DigiCollection,
}

/// Writer for digitized events.
pub struct DigiFileWriter {
    writer: BufWriter<File>,
}

impl DigiFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Writes events in the given format.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(
        &mut self,
        format: OutputFormat,
        events: &[(EventHeader, DigiCollection)],
    ) -> Result<()> {
        match format {
            OutputFormat::Csv => self.write_csv(events),
            OutputFormat::Json => self.write_json(events),
            OutputFormat::Binary => self.write_binary(events),
        }
    }

    /// Writes digis as CSV, cluster sizes separated by `;`.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_csv(&mut self, events: &[(EventHeader, DigiCollection)]) -> Result<()> {
        writeln!(
            self.writer,
            "run,event,digi_index,sim_hit_index,cell_id,x_mm,y_mm,z_mm,\
             along_wire_mm,distance_to_wire_mm,along_wire_true_mm,distance_to_wire_true_mm,\
             time_ns,edep_gev,n_clusters,cluster_sizes"
        )?;

        for (header, collection) in events {
            for (digi, link) in collection.iter() {
                let sizes = digi
                    .cluster_sizes
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(";");
                writeln!(
                    self.writer,
                    "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                    header.run,
                    header.event,
                    link.digi_index,
                    link.sim_hit_index,
                    digi.cell_id,
                    digi.position.x,
                    digi.position.y,
                    digi.position.z,
                    digi.along_wire,
                    digi.distance_to_wire,
                    digi.along_wire_true,
                    digi.distance_to_wire_true,
                    digi.time,
                    digi.edep,
                    digi.n_clusters,
                    sizes
                )?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes events as a JSON array.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_json(&mut self, events: &[(EventHeader, DigiCollection)]) -> Result<()> {
        let records: Vec<_> = events
            .iter()
            .map(|(header, digis)| EventDigis {
                header: *header,
                digis,
            })
            .collect();
        serde_json::to_writer_pretty(&mut self.writer, &records)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes events as little-endian binary.
    ///
    /// Format:
    /// - file header: magic `DCHD`, u32 version, u32 event count
    /// - per event: u32 run, u32 event, u32 digi count
    /// - per digi: u64 cell id, u64 sim hit index, 3 x f64 position,
    ///   f64 along wire, f64 distance, f64 true along wire, f64 true distance,
    ///   f64 time, f64 edep, u32 cluster count, one u32 per cluster size
    ///
    /// # Errors
    /// Returns an error if writing fails or a count exceeds `u32`.
    pub fn write_binary(&mut self, events: &[(EventHeader, DigiCollection)]) -> Result<()> {
        self.writer.write_all(BINARY_MAGIC)?;
        self.writer.write_all(&BINARY_VERSION.to_le_bytes())?;
        self.writer.write_all(&count_u32(events.len())?.to_le_bytes())?;

        for (header, collection) in events {
            self.writer.write_all(&header.run.to_le_bytes())?;
            self.writer.write_all(&header.event.to_le_bytes())?;
            self.writer
                .write_all(&count_u32(collection.len())?.to_le_bytes())?;

            for digi in &collection.digis {
                self.writer.write_all(&digi.cell_id.to_le_bytes())?;
                self.writer
                    .write_all(&(digi.sim_hit_index as u64).to_le_bytes())?;
                for value in [
                    digi.position.x,
                    digi.position.y,
                    digi.position.z,
                    digi.along_wire,
                    digi.distance_to_wire,
                    digi.along_wire_true,
                    digi.distance_to_wire_true,
                    digi.time,
                    digi.edep,
                ] {
                    self.writer.write_all(&value.to_le_bytes())?;
                }
                self.writer
                    .write_all(&count_u32(digi.cluster_sizes.len())?.to_le_bytes())?;
                for size in &digi.cluster_sizes {
                    self.writer.write_all(&size.to_le_bytes())?;
                }
            }
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn count_u32(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::InvalidFormat(format!("count {n} exceeds u32")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dchdigi_core::{AssociationLink, DigitizedHit, Vec3};
    use tempfile::NamedTempFile;

    fn sample() -> Vec<(EventHeader, DigiCollection)> {
        let mut collection = DigiCollection::default();
        collection.push(
            DigitizedHit {
                cell_id: 1234,
                position: Vec3::new(360.5, 1.5, -20.0),
                along_wire: -20.0,
                distance_to_wire: 1.25,
                along_wire_true: -19.5,
                distance_to_wire_true: 1.5,
                time: 2.5,
                edep: 0.5,
                n_clusters: 3,
                cluster_sizes: vec![1, 2, 1],
                sim_hit_index: 0,
            },
            AssociationLink {
                digi_index: 0,
                sim_hit_index: 0,
            },
        );
        vec![
            (EventHeader::new(7, 42), collection),
            (EventHeader::new(7, 43), DigiCollection::default()),
        ]
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path("a/digis.csv").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path("digis.JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path("digis.bin").unwrap(), OutputFormat::Binary);
        assert!(OutputFormat::from_path("digis").is_err());
        assert!(OutputFormat::from_path("digis.root").is_err());
    }

    #[test]
    fn test_write_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DigiFileWriter::create(file.path()).unwrap();
        writer.write_csv(&sample()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("run,event,digi_index"));
        assert_eq!(
            lines[1],
            "7,42,0,0,1234,360.5,1.5,-20,-20,1.25,-19.5,1.5,2.5,0.5,3,1;2;1"
        );
    }

    #[test]
    fn test_write_json() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DigiFileWriter::create(file.path()).unwrap();
        writer.write(OutputFormat::Json, &sample()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[0]["run"], 7);
        assert_eq!(value[0]["event"], 42);
        assert_eq!(value[0]["digis"][0]["cell_id"], 1234);
        assert_eq!(value[0]["links"][0]["sim_hit_index"], 0);
        assert_eq!(value[1]["digis"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_write_binary() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DigiFileWriter::create(file.path()).unwrap();
        writer.write_binary(&sample()).unwrap();

        let data = std::fs::read(file.path()).unwrap();
        // header 12 + two event headers 24 + digi (16 + 72 + 4 + 12)
        assert_eq!(data.len(), 12 + 24 + 104);
        assert_eq!(&data[0..4], BINARY_MAGIC);
        assert_eq!(u32::from_le_bytes(data[8..12].try_into().unwrap()), 2);
        assert_eq!(u64::from_le_bytes(data[24..32].try_into().unwrap()), 1234);
    }
}
