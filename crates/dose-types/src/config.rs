// ─────────────────────────────────────────────────────────────────────
// SCPN Dose Kernel — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! JSON-backed run configuration.
//!
//! Deserialization only describes the experiment; semantic validation
//! (energy table normalization, positive dimensions) happens when the
//! geometry and beam source are constructed from these blocks.

use serde::{Deserialize, Serialize};

/// Top-level experiment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_run_name")]
    pub run_name: String,
    /// Number of primary events (histories) to simulate.
    #[serde(default = "default_events")]
    pub events: usize,
    #[serde(default)]
    pub geometry: GeometryConfig,
    pub beam: BeamConfig,
    #[serde(default)]
    pub histograms: HistogramsConfig,
}

fn default_run_name() -> String {
    "dose-run".to_string()
}
fn default_events() -> usize {
    10_000
}

/// Layered phantom geometry block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    #[serde(default = "default_world_size")]
    pub world_size_mm: f64,
    #[serde(default = "default_phantom_size")]
    pub phantom_size_mm: [f64; 3],
    #[serde(default = "default_phantom_density")]
    pub phantom_density_kg_m3: f64,
    #[serde(default = "default_absorber_thickness")]
    pub absorber_thickness_mm: f64,
    #[serde(default = "default_use_absorber")]
    pub use_absorber: bool,
}

fn default_world_size() -> f64 {
    500.0
}
fn default_phantom_size() -> [f64; 3] {
    [300.0, 300.0, 200.0]
}
fn default_phantom_density() -> f64 {
    crate::constants::ALUMINUM_DENSITY
}
fn default_absorber_thickness() -> f64 {
    5.0
}
fn default_use_absorber() -> bool {
    true
}

impl Default for GeometryConfig {
    fn default() -> Self {
        GeometryConfig {
            world_size_mm: default_world_size(),
            phantom_size_mm: default_phantom_size(),
            phantom_density_kg_m3: default_phantom_density(),
            absorber_thickness_mm: default_absorber_thickness(),
            use_absorber: default_use_absorber(),
        }
    }
}

/// Beam source block: energy spectrum, spatial profile, pose, divergence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Primary particle name ("electron", "photon", "positron", "proton").
    /// Unknown names fall back to electron at beam construction.
    #[serde(default = "default_particle")]
    pub particle: String,
    /// Ordered (energy, probability) spectrum bins.
    pub energy_table: Vec<EnergyBinConfig>,
    #[serde(default)]
    pub spatial: SpatialProfile,
    #[serde(default = "default_beam_position")]
    pub position_mm: [f64; 3],
    #[serde(default = "default_beam_direction")]
    pub direction: [f64; 3],
    /// Half-angle divergence about the beam direction [rad].
    #[serde(default)]
    pub divergence_rad: f64,
}

fn default_particle() -> String {
    "electron".to_string()
}
fn default_beam_position() -> [f64; 3] {
    [0.0, 0.0, -150.0]
}
fn default_beam_direction() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

/// One spectrum entry: a discrete beam energy and its sampling probability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnergyBinConfig {
    pub energy_mev: f64,
    pub probability: f64,
}

/// Transverse spatial profile of the emission plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SpatialProfile {
    #[default]
    Point,
    Gaussian {
        sigma_mm: f64,
    },
    Disk {
        radius_mm: f64,
    },
    RectangularPlane {
        width_mm: f64,
        height_mm: f64,
    },
}

/// Uniform histogram binning: [low_edge, high_edge) split into `bins`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    pub low_edge: f64,
    pub high_edge: f64,
    pub bins: usize,
}

impl HistogramSpec {
    pub const fn new(low_edge: f64, high_edge: f64, bins: usize) -> Self {
        HistogramSpec {
            low_edge,
            high_edge,
            bins,
        }
    }
}

/// Binning of the three run histograms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistogramsConfig {
    /// Depth-dose profile along the beam axis.
    #[serde(default = "default_depth_dose_spec")]
    pub depth_dose: HistogramSpec,
    /// Energy deposited per event.
    #[serde(default = "default_event_energy_spec")]
    pub event_energy: HistogramSpec,
    /// Primary particle energy spectrum.
    #[serde(default = "default_particle_energy_spec")]
    pub particle_energy: HistogramSpec,
}

fn default_depth_dose_spec() -> HistogramSpec {
    HistogramSpec::new(0.0, 50.0, 200)
}
fn default_event_energy_spec() -> HistogramSpec {
    HistogramSpec::new(0.0, 1.0, 100)
}
fn default_particle_energy_spec() -> HistogramSpec {
    HistogramSpec::new(0.0, 20.0, 100)
}

impl Default for HistogramsConfig {
    fn default() -> Self {
        HistogramsConfig {
            depth_dose: default_depth_dose_spec(),
            event_energy: default_event_energy_spec(),
            particle_energy: default_particle_energy_spec(),
        }
    }
}

impl RunConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> crate::error::DoseResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let json = r#"{
            "beam": {
                "energy_table": [
                    { "energy_mev": 6.0, "probability": 1.0 }
                ]
            }
        }"#;
        let cfg: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.run_name, "dose-run");
        assert_eq!(cfg.events, 10_000);
        assert_eq!(cfg.geometry.phantom_size_mm, [300.0, 300.0, 200.0]);
        assert!(cfg.geometry.use_absorber);
        assert_eq!(cfg.beam.particle, "electron");
        assert_eq!(cfg.beam.spatial, SpatialProfile::Point);
        assert_eq!(cfg.beam.position_mm, [0.0, 0.0, -150.0]);
        assert_eq!(cfg.histograms.depth_dose.bins, 200);
        assert!((cfg.histograms.particle_energy.high_edge - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_spatial_profile_tagged_encoding() {
        let json = r#"{ "mode": "gaussian", "sigma_mm": 2.0 }"#;
        let p: SpatialProfile = serde_json::from_str(json).unwrap();
        assert_eq!(p, SpatialProfile::Gaussian { sigma_mm: 2.0 });

        let json = r#"{ "mode": "rectangular_plane", "width_mm": 40.0, "height_mm": 40.0 }"#;
        let p: SpatialProfile = serde_json::from_str(json).unwrap();
        assert_eq!(
            p,
            SpatialProfile::RectangularPlane {
                width_mm: 40.0,
                height_mm: 40.0
            }
        );
    }

    #[test]
    fn test_roundtrip_serialization() {
        let json = r#"{
            "run_name": "electron-bench",
            "events": 500,
            "beam": {
                "particle": "photon",
                "energy_table": [
                    { "energy_mev": 1.0, "probability": 0.3 },
                    { "energy_mev": 2.0, "probability": 0.7 }
                ],
                "spatial": { "mode": "disk", "radius_mm": 5.0 },
                "divergence_rad": 0.01
            }
        }"#;
        let cfg: RunConfig = serde_json::from_str(json).unwrap();
        let text = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: RunConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(cfg.run_name, cfg2.run_name);
        assert_eq!(cfg.events, cfg2.events);
        assert_eq!(cfg.beam.energy_table.len(), cfg2.beam.energy_table.len());
        assert_eq!(cfg.beam.spatial, cfg2.beam.spatial);
    }
}
