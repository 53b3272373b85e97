//! The scan loop: sample every grid coordinate, probe it, record the result.
//!
//! Cells are independent, so probes run on a rayon pool. Each worker job gets its
//! own kinematics handle from a factory (`scan_with`), or all workers share one
//! `Sync` model (`scan`). Results are collected before anything is written, so the
//! map has a single writer and is complete when returned.

use crate::config::ScanConfig;
use crate::grid::SamplingGrid;
use crate::kinematics::Kinematics;
use crate::map::{Cell, ReachabilityMap};
use crate::probe::{ProbeOutcome, ReachProbe};
use crate::{Error, Result};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Progress is logged at `info` this many times over a scan.
const PROGRESS_REPORTS: usize = 100;

/// Number of finished samples between two progress lines.
fn progress_step(total: usize) -> usize {
    (total / PROGRESS_REPORTS).max(1)
}

/// The finished map plus bookkeeping about the run.
#[derive(Clone, Debug)]
pub struct ScanReport {
    pub map: ReachabilityMap,
    /// Number of coordinates probed.
    pub sampled: usize,
    /// Number of coordinates reached.
    pub reached: usize,
    /// Wall-clock time spent probing.
    pub elapsed: Duration,
}

/// Drives a reachability scan for one [`ScanConfig`].
#[derive(Clone, Debug)]
pub struct ReachScanner {
    config: ScanConfig,
    grid: SamplingGrid,
}

impl ReachScanner {
    /// Validates `config` and derives its sampling grid.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let grid = config.grid()?;
        Ok(Self { config, grid })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    /// Scans with one model shared by every worker.
    pub fn scan<K>(&self, kinematics: &K) -> Result<ScanReport>
    where
        K: Kinematics + Sync + ?Sized,
    {
        self.scan_with(|| kinematics)
    }

    /// Scans with a model built per worker job by `factory`, for solvers that are
    /// not safe to share across threads.
    pub fn scan_with<K, F>(&self, factory: F) -> Result<ScanReport>
    where
        K: Kinematics,
        F: Fn() -> K + Sync + Send,
    {
        let grid = &self.grid;
        let probe = ReachProbe::new(self.config.tolerance);

        log::info!(
            "Checking reach with tolerance {} over start corner {:?} (conversion {}, stride {:?})",
            self.config.tolerance,
            self.config.start_corner,
            self.config.conversion,
            self.config.stride
        );
        log::info!(
            "Map shape {:?}, {} coordinates to probe",
            grid.shape(),
            grid.sample_count()
        );

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(workers) = self.config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder.build()?;

        let total = grid.sample_count();
        let step = progress_step(total);
        let done = AtomicUsize::new(0);

        let start = Instant::now();
        let results: Vec<_> = pool.install(|| {
            (0..total)
                .into_par_iter()
                .filter_map(|n| grid.coordinate_at(n))
                .map_init(&factory, |kinematics, coord| {
                    let target = grid.real_position(coord);
                    let outcome = probe.verify(&*kinematics, target);
                    match &outcome {
                        ProbeOutcome::Reached { joints, .. } => {
                            log::debug!("Checking IK for {target:?}: success");
                            log::trace!("IK solution {joints:?}");
                        }
                        ProbeOutcome::Unreached(reason) => {
                            log::debug!("Checking IK for {target:?}: failed ({reason:?})");
                        }
                    }

                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if finished % step == 0 || finished == total {
                        log::info!(
                            "Checked {finished}/{total} coordinates ({:.1}%)",
                            100.0 * finished as f64 / total as f64
                        );
                    }
                    (coord, outcome.into_joints())
                })
                .collect()
        });
        let elapsed = start.elapsed();

        let mut map = ReachabilityMap::new(grid.half_extents());
        let sampled = results.len();
        let mut reached = 0;
        for (coord, joints) in results {
            let index = grid
                .array_index(coord)
                .ok_or(Error::CoordinateOutsideGrid(coord))?;
            if joints.is_some() {
                reached += 1;
            }
            map.record(index, Cell::from(joints))?;
        }

        log::info!(
            "Scan finished: {reached}/{sampled} coordinates reached in {:.2?}",
            elapsed
        );

        Ok(ScanReport {
            map,
            sampled,
            reached,
            elapsed,
        })
    }
}
