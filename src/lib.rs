//! # robot-reach
//!
//! Maps the reachable workspace of an articulated manipulator.
//!
//! A box-shaped sampling volume is laid out as an integer grid ([`SamplingGrid`]). Every
//! sampled point is handed to a [`Kinematics`] model for inverse kinematics, and the
//! returned joints are run back through forward kinematics ([`ReachProbe`]). Points whose
//! round trip lands within tolerance on every axis are recorded as reached, together with
//! their joint solution, in a [`ReachabilityMap`]. The map can then be dumped to text
//! with the [`serializer`] functions.
//!
//! The crate ships a serial [`KinematicChain`] model, but any solver implementing
//! [`Kinematics`] can be scanned.

use std::path::PathBuf;

pub mod chain;
pub mod config;
pub mod grid;
pub mod kinematics;
pub mod map;
pub mod probe;
pub mod scan;
pub mod serializer;

pub use chain::*;
pub use config::*;
pub use grid::*;
pub use kinematics::*;
pub use map::*;
pub use probe::*;
pub use scan::*;
pub use serializer::{write_solutions, write_success_grid};

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for reachability scans.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open {} for writing: {source}", .path.display())]
    Destination {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid scan configuration: {0}")]
    InvalidConfig(String),

    #[error("Sampling volume for start corner {0:?} is too large")]
    GridTooLarge([i32; 3]),

    #[error("Index {index:?} is outside a map of shape {shape:?}")]
    IndexOutOfBounds { index: [usize; 3], shape: [usize; 3] },

    #[error("Inconsistent reachability map: {0}")]
    InvalidMap(String),

    #[error("Grid coordinate {0:?} lies outside the sampling volume")]
    CoordinateOutsideGrid([i64; 3]),

    #[error("Model file error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Kinematic model error: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
