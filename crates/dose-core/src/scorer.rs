// ─────────────────────────────────────────────────────────────────────
// SCPN Dose Kernel — Scorer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Sensitive-region hit handler.
//!
//! The transport engine reports one [`Deposition`] per step; depositions
//! inside the phantom update the depth-dose profile and the run totals.
//! The scorer itself holds only the geometry — all mutable state lives in
//! the [`RunAggregator`] passed in by the caller, so parallel workers can
//! score into private aggregators without locking.

use crate::run::RunAggregator;
use dose_types::error::DoseResult;
use dose_types::geometry::{PhantomGeometry, Region};
use dose_types::vec3::Vec3;

/// One transport-step report from the engine.
#[derive(Debug, Clone, Copy)]
pub struct Deposition {
    /// Energy deposited on this step [MeV].
    pub energy_mev: f64,
    /// Pre-step point [mm].
    pub position_mm: Vec3,
    /// Step length [mm].
    pub step_length_mm: f64,
    /// Region the pre-step point lies in, resolved by the engine once at
    /// the geometry boundary.
    pub region: Region,
    /// True on the first step of a track.
    pub is_primary_first_step: bool,
    /// True when the track has no parent (a primary).
    pub parent_is_primary: bool,
    /// Pre-step kinetic energy of the track [MeV]; routed to the primary
    /// spectrum on the first step of a primary track.
    pub kinetic_energy_mev: f64,
}

/// Converts qualifying depositions into histogram fills and run totals.
#[derive(Debug, Clone)]
pub struct Scorer {
    geometry: PhantomGeometry,
}

impl Scorer {
    pub fn new(geometry: PhantomGeometry) -> Self {
        Scorer { geometry }
    }

    pub fn geometry(&self) -> &PhantomGeometry {
        &self.geometry
    }

    /// Depth of a position into the phantom along the beam axis, clamped
    /// to [0, phantom depth].
    pub fn depth_in_phantom_mm(&self, position_mm: Vec3) -> f64 {
        let depth = position_mm.z - self.geometry.front_face_z_mm();
        depth.clamp(0.0, self.geometry.phantom_depth_mm())
    }

    /// Score one step report. Returns `Ok(false)` when the record was
    /// ignored (no energy deposited, non-finite energy, or outside the
    /// phantom) — the expected common case, not an error. Lifecycle
    /// violations from the aggregator propagate.
    pub fn on_deposition(
        &self,
        record: &Deposition,
        run: &mut RunAggregator,
    ) -> DoseResult<bool> {
        if !record.energy_mev.is_finite()
            || record.energy_mev <= 0.0
            || record.region != Region::Phantom
        {
            return Ok(false);
        }

        run.add_energy_deposition(record.energy_mev)?;
        run.add_track_length(record.step_length_mm)?;

        let depth = self.depth_in_phantom_mm(record.position_mm);
        run.fill_depth_dose(depth, record.energy_mev)?;

        // Exactly once per primary track: its first-step kinetic energy.
        if record.is_primary_first_step && record.parent_is_primary {
            run.fill_particle_energy(record.kinetic_energy_mev)?;
        }

        Ok(true)
    }

    /// Absorbed dose [Gy] for an energy deposit [MeV]; derived, not stored.
    pub fn dose_gray(&self, energy_mev: f64) -> f64 {
        self.geometry.dose_gray(energy_mev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunAggregator;

    fn running_aggregator() -> RunAggregator {
        let mut run = RunAggregator::with_defaults().unwrap();
        run.begin_run();
        run
    }

    fn phantom_hit(energy_mev: f64, z_mm: f64) -> Deposition {
        Deposition {
            energy_mev,
            position_mm: Vec3::new(0.0, 0.0, z_mm),
            step_length_mm: 0.5,
            region: Region::Phantom,
            is_primary_first_step: false,
            parent_is_primary: false,
            kinetic_energy_mev: 0.0,
        }
    }

    #[test]
    fn test_ignores_non_positive_energy() {
        let scorer = Scorer::new(PhantomGeometry::default());
        let mut run = running_aggregator();
        assert!(!scorer.on_deposition(&phantom_hit(0.0, -99.0), &mut run).unwrap());
        assert!(!scorer.on_deposition(&phantom_hit(-1.0, -99.0), &mut run).unwrap());
        assert!((run.total_energy_mev()).abs() < 1e-15);
    }

    #[test]
    fn test_ignores_non_finite_energy() {
        // NaN and +inf must not poison the run totals while the histogram
        // drops them: keep totals and histogram integral consistent.
        let scorer = Scorer::new(PhantomGeometry::default());
        let mut run = running_aggregator();
        assert!(!scorer
            .on_deposition(&phantom_hit(f64::NAN, -99.0), &mut run)
            .unwrap());
        assert!(!scorer
            .on_deposition(&phantom_hit(f64::INFINITY, -99.0), &mut run)
            .unwrap());
        assert!((run.total_energy_mev()).abs() < 1e-15);
        assert!((run.total_track_length_mm()).abs() < 1e-15);
    }

    #[test]
    fn test_ignores_other_region() {
        let scorer = Scorer::new(PhantomGeometry::default());
        let mut run = running_aggregator();
        let mut record = phantom_hit(1.0, -99.0);
        record.region = Region::Other;
        assert!(!scorer.on_deposition(&record, &mut run).unwrap());
        assert!((run.total_energy_mev()).abs() < 1e-15);
    }

    #[test]
    fn test_scores_phantom_hit() {
        let scorer = Scorer::new(PhantomGeometry::default());
        let mut run = running_aggregator();
        // Front face at z = -100 mm; a hit at z = -99.9 mm is 0.1 mm deep.
        assert!(scorer.on_deposition(&phantom_hit(2.0, -99.9), &mut run).unwrap());
        assert!((run.total_energy_mev() - 2.0).abs() < 1e-15);
        assert!((run.total_track_length_mm() - 0.5).abs() < 1e-15);
        let summary = run.end_run(1, scorer.geometry()).unwrap();
        assert!((summary.depth_dose.bins[0] - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_depth_clamped_to_phantom_bounds() {
        let scorer = Scorer::new(PhantomGeometry::default());
        // Default phantom spans z ∈ [-100, 100] mm, depth ∈ [0, 200] mm.
        assert!((scorer.depth_in_phantom_mm(Vec3::new(0.0, 0.0, -250.0)) - 0.0).abs() < 1e-12);
        assert!((scorer.depth_in_phantom_mm(Vec3::new(0.0, 0.0, 250.0)) - 200.0).abs() < 1e-12);
        assert!((scorer.depth_in_phantom_mm(Vec3::new(0.0, 0.0, -50.0)) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_primary_spectrum_filled_once() {
        let scorer = Scorer::new(PhantomGeometry::default());
        let mut run = running_aggregator();

        let mut first = phantom_hit(0.5, -99.0);
        first.is_primary_first_step = true;
        first.parent_is_primary = true;
        first.kinetic_energy_mev = 6.0;
        scorer.on_deposition(&first, &mut run).unwrap();

        // Later steps of the same primary must not refill the spectrum.
        let mut later = phantom_hit(0.5, -95.0);
        later.parent_is_primary = true;
        later.kinetic_energy_mev = 5.5;
        scorer.on_deposition(&later, &mut run).unwrap();

        // First step of a secondary must not fill it either.
        let mut secondary = phantom_hit(0.5, -95.0);
        secondary.is_primary_first_step = true;
        secondary.kinetic_energy_mev = 1.0;
        scorer.on_deposition(&secondary, &mut run).unwrap();

        let summary = run.end_run(1, scorer.geometry()).unwrap();
        let total: f64 = summary.particle_energy.bins.iter().sum();
        assert!((total - 1.0).abs() < 1e-15, "spectrum entries: {total}");
    }

    #[test]
    fn test_lifecycle_violation_propagates() {
        let scorer = Scorer::new(PhantomGeometry::default());
        let mut run = RunAggregator::with_defaults().unwrap(); // Idle
        let err = scorer.on_deposition(&phantom_hit(1.0, -99.0), &mut run);
        assert!(err.is_err());
    }
}
