//! Per-event digitization.

use crate::assembler::DigiAssembler;
use crate::calibration::ClusterCalibration;
use crate::clusters::{incidence_angle, ClusterEstimator};
use crate::config::DigitizerConfig;
use crate::debug::DebugHistograms;
use crate::seed::{EventRng, SeedGenerator};
use crate::smearing::ResolutionSmearer;
use crate::{Error, Result};
use dchdigi_core::{DigiCollection, EventHeader, RawHit, SimEvent, MM_TO_CM};
use dchdigi_geometry::{project_onto_wire, BitFieldCoder, CellIdDecoder, WireGeometryModel};
use rayon::prelude::*;
use std::sync::Arc;

/// Turns simulated drift chamber hits into digitized hits.
///
/// All members are read-only after construction. Mutable state (the random
/// stream and the debug histograms) lives in the caller of
/// [`Digitizer::process_event`], so one digitizer can serve many threads.
#[derive(Clone)]
pub struct Digitizer {
    config: DigitizerConfig,
    geometry: Arc<WireGeometryModel>,
    decoder: Arc<dyn CellIdDecoder>,
    smearer: ResolutionSmearer,
    estimator: ClusterEstimator,
    assembler: DigiAssembler,
    seeds: SeedGenerator,
}

impl std::fmt::Debug for Digitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digitizer")
            .field("config", &self.config)
            .field("smearer", &self.smearer)
            .field("seeds", &self.seeds)
            .finish_non_exhaustive()
    }
}

impl Digitizer {
    /// Creates a digitizer from its collaborators.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: DigitizerConfig,
        geometry: Arc<WireGeometryModel>,
        decoder: Arc<dyn CellIdDecoder>,
        calibration: Arc<dyn ClusterCalibration>,
    ) -> Result<Self> {
        config.validate()?;
        let smearer = ResolutionSmearer::new(config.z_resolution_cm(), config.xy_resolution_cm())?;
        let seeds = SeedGenerator::new(config.seed, &config.uid_svc_name);

        if geometry.config().name != config.detector_name {
            log::warn!(
                "detector '{}' requested but geometry describes '{}'",
                config.detector_name,
                geometry.config().name
            );
        }
        log::info!("{}", config.summary());
        log::info!(
            "drift chamber '{}': {} layers",
            geometry.config().name,
            geometry.nlayers()
        );

        Ok(Self {
            config,
            geometry,
            decoder,
            smearer,
            estimator: ClusterEstimator::new(calibration),
            assembler: DigiAssembler::new(),
            seeds,
        })
    }

    /// Creates a digitizer that decodes cell identifiers with the
    /// configured bit-field layout.
    ///
    /// # Errors
    /// Returns an error if the configuration or the encoding is invalid.
    pub fn with_bitfield_decoder(
        config: DigitizerConfig,
        geometry: Arc<WireGeometryModel>,
        calibration: Arc<dyn ClusterCalibration>,
    ) -> Result<Self> {
        let decoder = BitFieldCoder::new(&config.cell_id_encoding)?;
        Self::new(config, geometry, Arc::new(decoder), calibration)
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &DigitizerConfig {
        &self.config
    }

    /// Wire geometry in use.
    #[must_use]
    pub fn geometry(&self) -> &WireGeometryModel {
        &self.geometry
    }

    /// Seed generator in use.
    #[must_use]
    pub fn seeds(&self) -> &SeedGenerator {
        &self.seeds
    }

    /// Empty histograms binned for the configured resolutions.
    #[must_use]
    pub fn new_debug_histograms(&self) -> DebugHistograms {
        DebugHistograms::new(
            self.smearer.along_sigma(),
            self.smearer.perpendicular_sigma(),
        )
    }

    /// Digitizes all hits of one event.
    ///
    /// Hits are processed in input order with one random stream seeded from
    /// the event header; the nth digi and link belong to the nth hit.
    ///
    /// # Errors
    /// Returns [`Error::EventAborted`] if any hit cannot be placed on a wire.
    /// No partial output is returned.
    pub fn process_event(
        &self,
        header: EventHeader,
        hits: &[RawHit],
        mut debug: Option<&mut DebugHistograms>,
    ) -> Result<DigiCollection> {
        let mut rng = self.seeds.event_rng(header);
        let mut output = DigiCollection::with_capacity(hits.len());

        for (index, hit) in hits.iter().enumerate() {
            self.process_hit(index, hit, output.len(), &mut rng, &mut output, debug.as_deref_mut())
                .map_err(|e| Error::EventAborted {
                    run: header.run,
                    event: header.event,
                    hit_index: index,
                    source: Box::new(e),
                })?;
        }

        log::debug!(
            "run {} event {}: {} hits digitized",
            header.run,
            header.event,
            output.len()
        );
        Ok(output)
    }

    fn process_hit(
        &self,
        index: usize,
        hit: &RawHit,
        digi_index: usize,
        rng: &mut EventRng,
        output: &mut DigiCollection,
        debug: Option<&mut DebugHistograms>,
    ) -> Result<()> {
        let address = self.decoder.decode(hit.cell_id)?;
        let wire = self.geometry.wire_for_cell(&address)?;

        let coords = project_onto_wire(hit.position.scaled(MM_TO_CM), &wire)?;
        let smeared = self.smearer.smear(coords.along_wire, coords.distance, rng);

        let angle = incidence_angle(hit.momentum, wire.direction());
        let clusters =
            self.estimator
                .estimate(hit.edep, hit.path_length * MM_TO_CM, angle, hit.mass, rng);

        if let Some(histos) = debug {
            let on_wire = project_onto_wire(coords.closest_point, &wire)?;
            histos.distance_hit_wire.fill(coords.distance);
            histos.distance_projection_wire.fill(on_wire.distance);
            histos.smearing_along.fill(smeared.delta_along);
            histos.smearing_perpendicular.fill(smeared.delta_distance);
            if clusters.clamped {
                histos.clamped_lookups += 1;
            }
        }

        let (digi, link) =
            self.assembler
                .assemble(hit, index, digi_index, &wire, &coords, &smeared, clusters);
        output.push(digi, link);
        Ok(())
    }

    /// Digitizes many events in parallel.
    ///
    /// Each event uses its own random stream, so the output does not depend
    /// on scheduling. Results are returned in input order.
    ///
    /// # Errors
    /// Returns the error of a failing event.
    pub fn process_events(&self, events: &[SimEvent]) -> Result<Vec<DigiCollection>> {
        events
            .par_iter()
            .map(|event| self.process_event(event.header, &event.hits, None))
            .collect()
    }

    /// Digitizes many events in parallel and accumulates debug histograms.
    ///
    /// # Errors
    /// Returns the error of a failing event.
    pub fn process_events_with_debug(
        &self,
        events: &[SimEvent],
    ) -> Result<(Vec<DigiCollection>, DebugHistograms)> {
        let per_event = events
            .par_iter()
            .map(|event| {
                let mut histos = self.new_debug_histograms();
                let digis = self.process_event(event.header, &event.hits, Some(&mut histos))?;
                Ok((event.header, digis, histos))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut total = self.new_debug_histograms();
        let collections = per_event
            .into_iter()
            .map(|(header, digis, histos)| {
                merge_event_histograms(&mut total, &histos, header);
                digis
            })
            .collect();
        Ok((collections, total))
    }
}

/// Adds one event's histograms to the run total, warning if any binning differs.
fn merge_event_histograms(
    total: &mut DebugHistograms,
    event: &DebugHistograms,
    header: EventHeader,
) -> bool {
    let merged = total.merge(event);
    if !merged {
        log::warn!(
            "run {} event {}: debug histogram binning differs, contents dropped",
            header.run,
            header.event
        );
    }
    merged
}
