// ─────────────────────────────────────────────────────────────────────
// SCPN Dose Kernel — Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Layered phantom geometry for the dosimetry experiment.
//!
//! A world cube encloses a box phantom centered at the origin with its local
//! z axis aligned to the beam axis, optionally preceded by an absorber slab
//! flush against the phantom front face. The phantom mass is derived once at
//! construction and drives the energy → dose conversion.

use crate::config::GeometryConfig;
use crate::constants::{ALUMINUM_DENSITY, MEV_TO_JOULE, MM3_TO_M3};
use crate::error::{DoseError, DoseResult};
use crate::vec3::Vec3;

/// Default world cube extent [mm].
pub const DEFAULT_WORLD_SIZE_MM: f64 = 500.0;

/// Default phantom box dimensions [mm].
pub const DEFAULT_PHANTOM_SIZE_MM: Vec3 = Vec3::new(300.0, 300.0, 200.0);

/// Default absorber slab thickness [mm].
pub const DEFAULT_ABSORBER_THICKNESS_MM: f64 = 5.0;

/// Geometric region a transport step lands in, resolved once at the
/// geometry/transport boundary so the scoring hot path never compares names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Phantom,
    Other,
}

/// Static layered geometry: world cube, scored phantom box, optional
/// upstream absorber slab (purely geometric, never scored).
#[derive(Debug, Clone)]
pub struct PhantomGeometry {
    /// World cube extent [mm]; invisible container enclosing everything.
    pub world_size_mm: f64,
    /// Phantom box dimensions [mm], centered at the origin.
    pub phantom_size_mm: Vec3,
    /// Phantom material density [kg/m³].
    pub phantom_density_kg_m3: f64,
    /// Absorber slab thickness [mm].
    pub absorber_thickness_mm: f64,
    /// Whether the absorber slab is placed.
    pub use_absorber: bool,
    /// Derived phantom mass [kg]; immutable after construction.
    phantom_mass_kg: f64,
}

impl PhantomGeometry {
    /// Build the geometry and derive the phantom mass. Fails fast on
    /// non-positive phantom dimensions or density so that the mass is
    /// strictly positive whenever scoring is active.
    pub fn new(
        world_size_mm: f64,
        phantom_size_mm: Vec3,
        phantom_density_kg_m3: f64,
        absorber_thickness_mm: f64,
        use_absorber: bool,
    ) -> DoseResult<Self> {
        if world_size_mm <= 0.0 {
            return Err(DoseError::ConfigError(format!(
                "world size must be > 0, got {world_size_mm} mm"
            )));
        }
        if phantom_size_mm.x <= 0.0 || phantom_size_mm.y <= 0.0 || phantom_size_mm.z <= 0.0 {
            return Err(DoseError::ConfigError(format!(
                "phantom dimensions must all be > 0, got ({}, {}, {}) mm",
                phantom_size_mm.x, phantom_size_mm.y, phantom_size_mm.z
            )));
        }
        if phantom_density_kg_m3 <= 0.0 {
            return Err(DoseError::ConfigError(format!(
                "phantom density must be > 0, got {phantom_density_kg_m3} kg/m³"
            )));
        }
        if use_absorber && absorber_thickness_mm <= 0.0 {
            return Err(DoseError::ConfigError(format!(
                "absorber thickness must be > 0 when enabled, got {absorber_thickness_mm} mm"
            )));
        }

        let volume_m3 =
            phantom_size_mm.x * phantom_size_mm.y * phantom_size_mm.z * MM3_TO_M3;
        let phantom_mass_kg = volume_m3 * phantom_density_kg_m3;

        Ok(PhantomGeometry {
            world_size_mm,
            phantom_size_mm,
            phantom_density_kg_m3,
            absorber_thickness_mm,
            use_absorber,
            phantom_mass_kg,
        })
    }

    pub fn from_config(cfg: &GeometryConfig) -> DoseResult<Self> {
        PhantomGeometry::new(
            cfg.world_size_mm,
            Vec3::from(cfg.phantom_size_mm),
            cfg.phantom_density_kg_m3,
            cfg.absorber_thickness_mm,
            cfg.use_absorber,
        )
    }

    /// Phantom mass [kg], derived at construction.
    pub fn phantom_mass_kg(&self) -> f64 {
        self.phantom_mass_kg
    }

    /// z coordinate of the upstream phantom face [mm].
    pub fn front_face_z_mm(&self) -> f64 {
        -self.phantom_size_mm.z / 2.0
    }

    /// Phantom depth along the beam axis [mm].
    pub fn phantom_depth_mm(&self) -> f64 {
        self.phantom_size_mm.z
    }

    /// Absorber slab center z [mm], flush against the phantom front face.
    pub fn absorber_center_z_mm(&self) -> Option<f64> {
        self.use_absorber
            .then(|| self.front_face_z_mm() - self.absorber_thickness_mm / 2.0)
    }

    /// Classify a position against the phantom box.
    pub fn region_of(&self, position_mm: Vec3) -> Region {
        let h = self.phantom_size_mm * 0.5;
        if position_mm.x.abs() <= h.x && position_mm.y.abs() <= h.y && position_mm.z.abs() <= h.z
        {
            Region::Phantom
        } else {
            Region::Other
        }
    }

    /// Deposited energy [MeV] converted to absorbed dose [Gy].
    pub fn dose_gray(&self, energy_mev: f64) -> f64 {
        energy_mev * MEV_TO_JOULE / self.phantom_mass_kg
    }
}

impl Default for PhantomGeometry {
    /// Aluminum phantom behind a lead absorber, the reference bench setup.
    fn default() -> Self {
        PhantomGeometry::new(
            DEFAULT_WORLD_SIZE_MM,
            DEFAULT_PHANTOM_SIZE_MM,
            ALUMINUM_DENSITY,
            DEFAULT_ABSORBER_THICKNESS_MM,
            true,
        )
        .expect("default geometry parameters are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phantom_mass() {
        let geom = PhantomGeometry::default();
        // 300×300×200 mm³ = 0.018 m³ of aluminum
        let expected = 0.018 * ALUMINUM_DENSITY;
        assert!((geom.phantom_mass_kg() - expected).abs() < 1e-9);
        assert!(geom.phantom_mass_kg() > 0.0);
    }

    #[test]
    fn test_water_phantom_mass() {
        use crate::constants::WATER_DENSITY;
        let geom =
            PhantomGeometry::new(500.0, DEFAULT_PHANTOM_SIZE_MM, WATER_DENSITY, 0.0, false)
                .unwrap();
        // 0.018 m³ of water is 18 kg exactly.
        assert!((geom.phantom_mass_kg() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_front_face_and_depth() {
        let geom = PhantomGeometry::default();
        assert!((geom.front_face_z_mm() - (-100.0)).abs() < 1e-12);
        assert!((geom.phantom_depth_mm() - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_absorber_flush_against_front_face() {
        let geom = PhantomGeometry::default();
        let z = geom.absorber_center_z_mm().unwrap();
        assert!((z - (-102.5)).abs() < 1e-12);

        let no_absorber =
            PhantomGeometry::new(500.0, DEFAULT_PHANTOM_SIZE_MM, 1000.0, 0.0, false).unwrap();
        assert!(no_absorber.absorber_center_z_mm().is_none());
    }

    #[test]
    fn test_region_classification() {
        let geom = PhantomGeometry::default();
        assert_eq!(geom.region_of(Vec3::ZERO), Region::Phantom);
        assert_eq!(geom.region_of(Vec3::new(0.0, 0.0, -99.9)), Region::Phantom);
        assert_eq!(geom.region_of(Vec3::new(0.0, 0.0, -150.0)), Region::Other);
        assert_eq!(geom.region_of(Vec3::new(151.0, 0.0, 0.0)), Region::Other);
    }

    #[test]
    fn test_rejects_degenerate_phantom() {
        let bad = PhantomGeometry::new(500.0, Vec3::new(300.0, 0.0, 200.0), 1000.0, 5.0, true);
        assert!(bad.is_err());
        let bad = PhantomGeometry::new(500.0, DEFAULT_PHANTOM_SIZE_MM, -1.0, 5.0, true);
        assert!(bad.is_err());
    }

    #[test]
    fn test_dose_conversion() {
        let geom = PhantomGeometry::default();
        let dose = geom.dose_gray(1.0);
        let expected = MEV_TO_JOULE / geom.phantom_mass_kg();
        assert!((dose - expected).abs() < 1e-30);
    }
}
