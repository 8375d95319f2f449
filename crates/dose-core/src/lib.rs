//! Beam-source sampling and dose-scoring pipeline.
//!
//! The external transport engine asks [`beam::BeamSource`] for a primary
//! state at the start of each event, reports per-step depositions to
//! [`scorer::Scorer`], and brackets the run with
//! [`run::RunAggregator::begin_run`] / [`run::RunAggregator::end_run`].

pub mod beam;
pub mod histogram;
pub mod run;
pub mod scorer;
