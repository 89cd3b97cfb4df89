//! Geometry optimization for woodwind instrument tuning.
//!
//! The crate turns a mutable instrument geometry (bore profile, tone
//! holes) into flat parameter vectors that derivative-free optimizers
//! can search, and scores candidate geometries against fingering
//! targets in cents. The pieces:
//!
//! - [`geometry`]: the instrument model, with bore points, tone holes,
//!   and interpolation over the bore profile.
//! - [`tuning`]: fingering targets and the [`tuning::TuningEvaluator`]
//!   trait scoring a geometry against them.
//! - [`bore`]: the bore-length-adjustment policies that translate a
//!   new bore length into bore-point moves.
//! - [`optimization`]: mappings, objectives, merged composition,
//!   backends, and the dispatcher. See that module for a worked
//!   example.

pub mod bore;
pub mod error;
pub mod geometry;
pub mod optimization;
pub mod tuning;

pub use error::{Error, Result};
