// ─────────────────────────────────────────────────────────────────────
// SCPN Dose Kernel — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Unit conventions for the dose kernel: energies in MeV, lengths in mm,
//! densities in kg/m³, masses in kg, dose in gray (J/kg).

/// MeV → joule.
pub const MEV_TO_JOULE: f64 = 1.602176634e-13;

/// mm³ → m³.
pub const MM3_TO_M3: f64 = 1.0e-9;

/// Degree → radian.
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Liquid water density [kg/m³] (tissue-equivalent phantom material).
pub const WATER_DENSITY: f64 = 1.000e3;

/// Aluminum density [kg/m³] (default phantom material).
pub const ALUMINUM_DENSITY: f64 = 2.699e3;
