// ─────────────────────────────────────────────────────────────────────
// SCPN Dose Kernel — Run Aggregation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-run histogram state and end-of-run statistics.
//!
//! The aggregator walks Idle → Running → Finalized. Fill operations are
//! legal only while Running; calling them outside Running signals a
//! lifecycle violation between the transport engine and the scorer and is
//! surfaced immediately rather than swallowed. Parallel workers each own a
//! private aggregator and merge bin-wise before finalization.

use crate::histogram::{Histogram1D, HistogramSnapshot};
use dose_types::config::{HistogramSpec, HistogramsConfig};
use dose_types::error::{DoseError, DoseResult};
use dose_types::geometry::PhantomGeometry;
use serde::Serialize;
use std::fmt;

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Finalized,
}

/// Read-only end-of-run report.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub num_events: usize,
    pub total_energy_mev: f64,
    pub average_energy_mev: f64,
    pub average_track_length_mm: f64,
    /// Mean absorbed phantom dose per event [Gy].
    pub average_dose_gray: f64,
    /// Mean energy per event in each depth bin (scaled by 1/num_events).
    pub depth_dose: HistogramSnapshot,
    pub event_energy: HistogramSnapshot,
    pub particle_energy: HistogramSnapshot,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Run Summary ===")?;
        writeln!(f, "Number of events: {}", self.num_events)?;
        writeln!(f, "Total energy deposited: {:.6} MeV", self.total_energy_mev)?;
        writeln!(
            f,
            "Average energy deposited per event: {:.6} MeV",
            self.average_energy_mev
        )?;
        writeln!(
            f,
            "Average track length per event: {:.6} mm",
            self.average_track_length_mm
        )?;
        writeln!(
            f,
            "Average dose per event: {:.3e} Gy",
            self.average_dose_gray
        )?;
        write!(f, "===================")
    }
}

/// Owns the three run histograms and the scalar accumulators.
#[derive(Debug, Clone)]
pub struct RunAggregator {
    phase: RunPhase,
    total_energy_mev: f64,
    total_track_length_mm: f64,
    depth_dose: Histogram1D,
    event_energy: Histogram1D,
    particle_energy: Histogram1D,
}

impl RunAggregator {
    pub fn new(
        depth_dose: HistogramSpec,
        event_energy: HistogramSpec,
        particle_energy: HistogramSpec,
    ) -> DoseResult<Self> {
        Ok(RunAggregator {
            phase: RunPhase::Idle,
            total_energy_mev: 0.0,
            total_track_length_mm: 0.0,
            depth_dose: Histogram1D::new(depth_dose)?,
            event_energy: Histogram1D::new(event_energy)?,
            particle_energy: Histogram1D::new(particle_energy)?,
        })
    }

    pub fn from_config(cfg: &HistogramsConfig) -> DoseResult<Self> {
        RunAggregator::new(cfg.depth_dose, cfg.event_energy, cfg.particle_energy)
    }

    /// Reference binning: depth-dose 200×[0, 50 mm], event energy
    /// 100×[0, 1 MeV], primary spectrum 100×[0, 20 MeV].
    pub fn with_defaults() -> DoseResult<Self> {
        RunAggregator::from_config(&HistogramsConfig::default())
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn total_energy_mev(&self) -> f64 {
        self.total_energy_mev
    }

    pub fn total_track_length_mm(&self) -> f64 {
        self.total_track_length_mm
    }

    /// Reset all accumulators and histograms and enter Running. Legal from
    /// any phase, so one aggregator can serve consecutive runs.
    pub fn begin_run(&mut self) {
        self.total_energy_mev = 0.0;
        self.total_track_length_mm = 0.0;
        self.depth_dose.reset();
        self.event_energy.reset();
        self.particle_energy.reset();
        self.phase = RunPhase::Running;
    }

    fn ensure_running(&self, op: &'static str) -> DoseResult<()> {
        if self.phase == RunPhase::Running {
            Ok(())
        } else {
            Err(DoseError::LifecycleViolation {
                op,
                phase: format!("{:?}", self.phase),
            })
        }
    }

    /// Weight the depth bin by the deposited energy [MeV].
    pub fn fill_depth_dose(&mut self, depth_mm: f64, energy_mev: f64) -> DoseResult<()> {
        self.ensure_running("fill_depth_dose")?;
        self.depth_dose.fill(depth_mm, energy_mev);
        Ok(())
    }

    /// Count one event at its total deposited energy [MeV].
    pub fn fill_event_energy(&mut self, energy_mev: f64) -> DoseResult<()> {
        self.ensure_running("fill_event_energy")?;
        self.event_energy.fill(energy_mev, 1.0);
        Ok(())
    }

    /// Count one primary at its first-step kinetic energy [MeV].
    pub fn fill_particle_energy(&mut self, energy_mev: f64) -> DoseResult<()> {
        self.ensure_running("fill_particle_energy")?;
        self.particle_energy.fill(energy_mev, 1.0);
        Ok(())
    }

    pub fn add_energy_deposition(&mut self, energy_mev: f64) -> DoseResult<()> {
        self.ensure_running("add_energy_deposition")?;
        self.total_energy_mev += energy_mev;
        Ok(())
    }

    pub fn add_track_length(&mut self, length_mm: f64) -> DoseResult<()> {
        self.ensure_running("add_track_length")?;
        self.total_track_length_mm += length_mm;
        Ok(())
    }

    /// Fold a worker's partial results into this aggregator: bin-wise
    /// histogram sums plus scalar accumulator sums. Both sides must still be
    /// Running and share identical binning. Merge order does not affect the
    /// result beyond floating-point rounding.
    pub fn merge(&mut self, other: RunAggregator) -> DoseResult<()> {
        self.ensure_running("merge")?;
        if other.phase != RunPhase::Running {
            return Err(DoseError::LifecycleViolation {
                op: "merge (partial)",
                phase: format!("{:?}", other.phase),
            });
        }
        self.depth_dose.merge(&other.depth_dose)?;
        self.event_energy.merge(&other.event_energy)?;
        self.particle_energy.merge(&other.particle_energy)?;
        self.total_energy_mev += other.total_energy_mev;
        self.total_track_length_mm += other.total_track_length_mm;
        Ok(())
    }

    /// Finalize the run: scale every depth-dose bin by 1/num_events (mean
    /// per event, not a per-bin-width density), average the scalar
    /// accumulators, and convert the mean energy to absorbed dose using the
    /// phantom mass. A zero-event run yields a defined all-zero summary
    /// with no division.
    pub fn end_run(
        &mut self,
        num_events: usize,
        geometry: &PhantomGeometry,
    ) -> DoseResult<RunSummary> {
        self.ensure_running("end_run")?;

        let (average_energy_mev, average_track_length_mm) = if num_events > 0 {
            let inv = 1.0 / num_events as f64;
            self.depth_dose.scale(inv);
            (
                self.total_energy_mev * inv,
                self.total_track_length_mm * inv,
            )
        } else {
            (0.0, 0.0)
        };

        self.phase = RunPhase::Finalized;

        Ok(RunSummary {
            num_events,
            total_energy_mev: self.total_energy_mev,
            average_energy_mev,
            average_track_length_mm,
            average_dose_gray: geometry.dose_gray(average_energy_mev),
            depth_dose: self.depth_dose.snapshot(),
            event_energy: self.event_energy.snapshot(),
            particle_energy: self.particle_energy.snapshot(),
        })
    }
}
