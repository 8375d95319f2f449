// ─────────────────────────────────────────────────────────────────────
// SCPN Dose Kernel — Beam Source
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Primary particle source.
//!
//! Samples one primary state (energy, start position, emission direction)
//! per event from a discrete energy spectrum, a transverse spatial profile,
//! and an optional angular divergence. Randomness comes from a caller-owned
//! `rand::Rng` handle so parallel workers can each drive their own
//! reproducible stream.

use dose_types::config::{BeamConfig, SpatialProfile};
use dose_types::constants::DEG_TO_RAD;
use dose_types::error::{DoseError, DoseResult};
use dose_types::vec3::Vec3;
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Tolerance on the energy-table probability sum.
const PROBABILITY_SUM_TOL: f64 = 1e-6;

/// |direction·ẑ| above which the frame reference switches to x̂.
const AXIS_ALIGNMENT_LIMIT: f64 = 0.99;

/// Primary particle species the gun can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Electron,
    Photon,
    Positron,
    Proton,
}

impl ParticleKind {
    /// Resolve a configured particle name; unknown names fall back to
    /// electron, the default gun species.
    pub fn from_name(name: &str) -> ParticleKind {
        match name {
            "electron" | "e-" => ParticleKind::Electron,
            "photon" | "gamma" => ParticleKind::Photon,
            "positron" | "e+" => ParticleKind::Positron,
            "proton" => ParticleKind::Proton,
            _ => ParticleKind::Electron,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParticleKind::Electron => "electron",
            ParticleKind::Photon => "photon",
            ParticleKind::Positron => "positron",
            ParticleKind::Proton => "proton",
        }
    }
}

/// One discrete spectrum entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBin {
    pub energy_mev: f64,
    pub probability: f64,
}

/// Validated discrete energy spectrum sampled by inverse CDF.
#[derive(Debug, Clone)]
pub struct EnergyTable {
    entries: Vec<EnergyBin>,
}

impl EnergyTable {
    /// Validate and build the table: non-empty, strictly ascending energies,
    /// non-negative probabilities summing to 1 within tolerance. An invalid
    /// table is rejected here so no event is ever sampled from one.
    pub fn new(entries: Vec<EnergyBin>) -> DoseResult<Self> {
        if entries.is_empty() {
            return Err(DoseError::ConfigError(
                "energy table must not be empty".to_string(),
            ));
        }
        let mut sum = 0.0;
        for (i, bin) in entries.iter().enumerate() {
            if !bin.energy_mev.is_finite() || bin.energy_mev <= 0.0 {
                return Err(DoseError::ConfigError(format!(
                    "energy table entry {i}: energy must be finite and > 0, got {}",
                    bin.energy_mev
                )));
            }
            if !bin.probability.is_finite() || bin.probability < 0.0 {
                return Err(DoseError::ConfigError(format!(
                    "energy table entry {i}: probability must be finite and >= 0, got {}",
                    bin.probability
                )));
            }
            if i > 0 && bin.energy_mev <= entries[i - 1].energy_mev {
                return Err(DoseError::ConfigError(format!(
                    "energy table entries must be strictly ascending: {} MeV follows {} MeV",
                    bin.energy_mev,
                    entries[i - 1].energy_mev
                )));
            }
            sum += bin.probability;
        }
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOL {
            return Err(DoseError::ConfigError(format!(
                "energy table probabilities must sum to 1, got {sum}"
            )));
        }
        Ok(EnergyTable { entries })
    }

    /// Single fixed beam energy.
    pub fn monoenergetic(energy_mev: f64) -> DoseResult<Self> {
        EnergyTable::new(vec![EnergyBin {
            energy_mev,
            probability: 1.0,
        }])
    }

    pub fn entries(&self) -> &[EnergyBin] {
        &self.entries
    }

    /// Inverse-CDF draw: walk the table accumulating probability mass and
    /// return the first energy whose cumulative sum reaches `u`. Rounding
    /// overshoot past the final cumulative sum falls back to the last entry.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        let mut cumulative = 0.0;
        for bin in &self.entries {
            cumulative += bin.probability;
            if cumulative >= u {
                return bin.energy_mev;
            }
        }
        self.entries[self.entries.len() - 1].energy_mev
    }
}

/// Complete primary state handed to the transport engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primary {
    pub particle: ParticleKind,
    pub energy_mev: f64,
    pub position_mm: Vec3,
    pub direction: Vec3,
}

/// Configurable particle gun.
#[derive(Debug, Clone)]
pub struct BeamSource {
    particle: ParticleKind,
    table: EnergyTable,
    profile: SpatialProfile,
    position_mm: Vec3,
    direction: Vec3,
    divergence_rad: f64,
}

impl BeamSource {
    pub fn new(
        particle: ParticleKind,
        table: EnergyTable,
        profile: SpatialProfile,
        position_mm: Vec3,
        direction: Vec3,
        divergence_rad: f64,
    ) -> DoseResult<Self> {
        let direction = direction.normalized().ok_or_else(|| {
            DoseError::ConfigError("beam direction must be a non-zero vector".to_string())
        })?;
        if !divergence_rad.is_finite() || divergence_rad < 0.0 {
            return Err(DoseError::ConfigError(format!(
                "beam divergence must be >= 0, got {divergence_rad} rad"
            )));
        }
        validate_profile(&profile)?;
        Ok(BeamSource {
            particle,
            table,
            profile,
            position_mm,
            direction,
            divergence_rad,
        })
    }

    pub fn from_config(cfg: &BeamConfig) -> DoseResult<Self> {
        let entries = cfg
            .energy_table
            .iter()
            .map(|e| EnergyBin {
                energy_mev: e.energy_mev,
                probability: e.probability,
            })
            .collect();
        BeamSource::new(
            ParticleKind::from_name(&cfg.particle),
            EnergyTable::new(entries)?,
            cfg.spatial,
            Vec3::from(cfg.position_mm),
            Vec3::from(cfg.direction),
            cfg.divergence_rad,
        )
    }

    /// Reference medical electron beam: 2 mm Gaussian spot, 2° divergence,
    /// source 150 mm upstream on the axis.
    pub fn electron_preset(table: EnergyTable) -> Self {
        BeamSource::new(
            ParticleKind::Electron,
            table,
            SpatialProfile::Gaussian { sigma_mm: 2.0 },
            Vec3::new(0.0, 0.0, -150.0),
            Vec3::Z,
            2.0 * DEG_TO_RAD,
        )
        .expect("electron preset parameters are valid")
    }

    /// Reference photon beam: 3 mm Gaussian spot, 1.5° divergence,
    /// source 200 mm upstream on the axis.
    pub fn photon_preset(table: EnergyTable) -> Self {
        BeamSource::new(
            ParticleKind::Photon,
            table,
            SpatialProfile::Gaussian { sigma_mm: 3.0 },
            Vec3::new(0.0, 0.0, -200.0),
            Vec3::Z,
            1.5 * DEG_TO_RAD,
        )
        .expect("photon preset parameters are valid")
    }

    pub fn particle(&self) -> ParticleKind {
        self.particle
    }

    pub fn energy_table(&self) -> &EnergyTable {
        &self.table
    }

    pub fn profile(&self) -> SpatialProfile {
        self.profile
    }

    pub fn position_mm(&self) -> Vec3 {
        self.position_mm
    }

    /// Unit emission axis.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn divergence_rad(&self) -> f64 {
        self.divergence_rad
    }

    pub fn set_position(&mut self, position_mm: Vec3) {
        self.position_mm = position_mm;
    }

    /// Change the beam axis; the stored direction is always re-normalized.
    pub fn set_direction(&mut self, direction: Vec3) -> DoseResult<()> {
        self.direction = direction.normalized().ok_or_else(|| {
            DoseError::ConfigError("beam direction must be a non-zero vector".to_string())
        })?;
        Ok(())
    }

    pub fn set_profile(&mut self, profile: SpatialProfile) -> DoseResult<()> {
        validate_profile(&profile)?;
        self.profile = profile;
        Ok(())
    }

    pub fn set_divergence(&mut self, divergence_rad: f64) -> DoseResult<()> {
        if !divergence_rad.is_finite() || divergence_rad < 0.0 {
            return Err(DoseError::ConfigError(format!(
                "beam divergence must be >= 0, got {divergence_rad} rad"
            )));
        }
        self.divergence_rad = divergence_rad;
        Ok(())
    }

    /// Draw one complete primary state. No side effects beyond advancing
    /// the caller's random stream.
    pub fn sample_primary<R: Rng + ?Sized>(&self, rng: &mut R) -> Primary {
        let energy_mev = self.table.sample(rng);
        let position_mm = self.sample_position(rng);
        let direction = self.sample_direction(rng);
        Primary {
            particle: self.particle,
            energy_mev,
            position_mm,
            direction,
        }
    }

    fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match self.profile {
            SpatialProfile::Point => self.position_mm,
            SpatialProfile::Gaussian { sigma_mm } => {
                let (axis_x, axis_y) = transverse_frame(self.direction);
                let gx: f64 = rng.sample(StandardNormal);
                let gy: f64 = rng.sample(StandardNormal);
                self.position_mm + axis_x * (gx * sigma_mm) + axis_y * (gy * sigma_mm)
            }
            SpatialProfile::Disk { radius_mm } => {
                let (axis_x, axis_y) = transverse_frame(self.direction);
                // sqrt(u) radius for uniform areal density; clamp guards
                // against negative numerical noise.
                let u1: f64 = rng.gen();
                let r = radius_mm * u1.max(0.0).sqrt();
                let theta = 2.0 * PI * rng.gen::<f64>();
                self.position_mm + axis_x * (r * theta.cos()) + axis_y * (r * theta.sin())
            }
            SpatialProfile::RectangularPlane {
                width_mm,
                height_mm,
            } => {
                let (axis_x, axis_y) = transverse_frame(self.direction);
                let dx = rng.gen_range(-width_mm / 2.0..=width_mm / 2.0);
                let dy = rng.gen_range(-height_mm / 2.0..=height_mm / 2.0);
                self.position_mm + axis_x * dx + axis_y * dy
            }
        }
    }

    fn sample_direction<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        if self.divergence_rad <= 0.0 {
            return self.direction;
        }
        let g: f64 = rng.sample(StandardNormal);
        let theta = g * self.divergence_rad;
        let phi = 2.0 * PI * rng.gen::<f64>();
        let (axis_x, axis_y) = transverse_frame(self.direction);
        let transverse = axis_x * phi.cos() + axis_y * phi.sin();
        let tilted = self.direction * theta.cos() + transverse * theta.sin();
        // cos/sin combination of orthonormal vectors is already unit length
        // up to rounding; the fallback can only fire on pathological input.
        tilted.normalized().unwrap_or(self.direction)
    }
}

/// Orthonormal pair spanning the plane perpendicular to the beam axis.
///
/// The reference vector is ẑ unless the beam is nearly aligned with ẑ,
/// in which case x̂ is used instead.
pub fn transverse_frame(direction: Vec3) -> (Vec3, Vec3) {
    let reference = if direction.z.abs() < AXIS_ALIGNMENT_LIMIT {
        Vec3::Z
    } else {
        Vec3::X
    };
    let axis_x = direction
        .cross(reference)
        .normalized()
        .expect("reference vector is never parallel to the beam axis");
    let axis_y = direction
        .cross(axis_x)
        .normalized()
        .expect("cross of orthogonal unit vectors is non-zero");
    (axis_x, axis_y)
}

fn validate_profile(profile: &SpatialProfile) -> DoseResult<()> {
    match *profile {
        SpatialProfile::Point => Ok(()),
        SpatialProfile::Gaussian { sigma_mm } => {
            if !sigma_mm.is_finite() || sigma_mm <= 0.0 {
                Err(DoseError::ConfigError(format!(
                    "Gaussian profile sigma must be > 0, got {sigma_mm} mm"
                )))
            } else {
                Ok(())
            }
        }
        SpatialProfile::Disk { radius_mm } => {
            if !radius_mm.is_finite() || radius_mm <= 0.0 {
                Err(DoseError::ConfigError(format!(
                    "disk profile radius must be > 0, got {radius_mm} mm"
                )))
            } else {
                Ok(())
            }
        }
        SpatialProfile::RectangularPlane {
            width_mm,
            height_mm,
        } => {
            if !width_mm.is_finite() || width_mm <= 0.0 || !height_mm.is_finite()
                || height_mm <= 0.0
            {
                Err(DoseError::ConfigError(format!(
                    "plane profile extent must be > 0, got {width_mm}×{height_mm} mm"
                )))
            } else {
                Ok(())
            }
        }
    }
}
