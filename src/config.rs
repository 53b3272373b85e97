//! Scan configuration and the on-disk model description.
//!
//! A model file is TOML with a `[scan]` table and a `[chain]` table:
//!
//! ```toml
//! [scan]
//! start_corner = [-1, -1, -1]
//! conversion = 10
//! tolerance = 0.01
//!
//! [chain]
//! tip = [0.0, 0.0, 0.3]
//!
//! [[chain.joints]]
//! name = "base_yaw"
//! joint_type = "Hinge"
//! axis = [0.0, 0.0, 1.0]
//! ```

use crate::chain::KinematicChain;
use crate::grid::{DEFAULT_STRIDE, SamplingGrid};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of one reachability scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Corner of the sampling volume in world units; the volume spans to the mirrored corner.
    pub start_corner: [i32; 3],
    /// Grid indices per world unit (100 turns meters into centimeters).
    pub conversion: u32,
    /// Maximum per-axis error (world units) for a solution to count as reached.
    pub tolerance: f64,
    /// Index step per axis. Z defaults to 10 (coarse Z sampling).
    pub stride: [usize; 3],
    /// Worker threads; `None` lets the pool pick.
    pub workers: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start_corner: [-2, -2, -2],
            conversion: 100,
            tolerance: 0.01,
            stride: DEFAULT_STRIDE,
            workers: None,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if self.workers == Some(0) {
            return Err(Error::InvalidConfig("workers must be at least 1".into()));
        }
        self.grid().map(|_| ())
    }

    /// The sampling volume described by this config.
    pub fn grid(&self) -> Result<SamplingGrid> {
        SamplingGrid::new(self.start_corner, self.conversion, self.stride)
    }
}

/// A scan configuration together with the manipulator to scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReachModel {
    #[serde(default)]
    pub scan: ScanConfig,
    pub chain: KinematicChain,
}

impl ReachModel {
    /// Parses and validates a model description.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let model: Self = toml::from_str(text)?;
        model.scan.validate()?;
        let chain = model.chain.validated()?;
        log::info!(
            "Loaded chain with {} joints ({} active)",
            chain.joints.len(),
            chain.dof()
        );
        Ok(Self {
            scan: model.scan,
            chain,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::info!("Reading model from {}", path.display());
        Self::from_toml_str(&text)
    }
}
