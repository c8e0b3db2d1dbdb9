//! Run-length deduplication of stuck or flat-lined sensor streams.
//!
//! Per sensor, in timestamp order, consecutive readings within `tol` of their
//! predecessor form a run. Runs of at least `min_run` readings collapse to
//! their first reading; shorter runs are kept whole.

use crate::config::DedupCfg;
use crate::reading::SensorReading;

/// A maximal run of equal (within tolerance) values inside one sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Run {
    pub start: usize,
    pub len: usize,
    /// Value of the run's first member.
    pub value: f64,
}

/// Pass 1: `true` where a value differs from its predecessor by more than `tol`.
/// The first element is always a change. A NaN never matches its neighbours,
/// so missing values survive to interpolation.
pub fn change_flags(values: &[f64], tol: f64) -> Vec<bool> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let changed = match prev {
            None => true,
            // NaN is a change on purpose; `(v - p).abs() > tol` alone would be false
            Some(p) => v.is_nan() || p.is_nan() || (v - p).abs() > tol,
        };
        out.push(changed);
        prev = Some(v);
    }
    out
}

/// Pass 2: run id per position, the running count of changes (first run is 1).
pub fn run_ids(changed: &[bool]) -> Vec<usize> {
    changed
        .iter()
        .scan(0usize, |acc, &c| {
            if c {
                *acc += 1;
            }
            Some(*acc)
        })
        .collect()
}

/// Partition `values` into contiguous runs.
pub fn runs(values: &[f64], tol: f64) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::new();
    for (i, changed) in change_flags(values, tol).into_iter().enumerate() {
        match out.last_mut() {
            Some(run) if !changed => run.len += 1,
            _ => out.push(Run {
                start: i,
                len: 1,
                value: values[i],
            }),
        }
    }
    out
}

/// Keep mask for one time-ordered sequence.
fn keep_mask(values: &[f64], min_run: usize, tol: f64) -> Vec<bool> {
    let changed = change_flags(values, tol);
    let ids = run_ids(&changed);
    let mut run_len = vec![0usize; ids.last().copied().unwrap_or(0) + 1];
    for &id in &ids {
        run_len[id] += 1;
    }
    changed
        .iter()
        .zip(&ids)
        .map(|(&c, &id)| run_len[id] < min_run || c)
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunLengthDeduplicator {
    cfg: DedupCfg,
}

impl RunLengthDeduplicator {
    pub fn new(cfg: DedupCfg) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> DedupCfg {
        self.cfg
    }

    /// Collapse long flat runs; the result is ordered by (sensor_id, timestamp).
    pub fn collapse(&self, readings: &[SensorReading]) -> Vec<SensorReading> {
        collapse(readings, self.cfg.min_run, self.cfg.tol)
    }
}

/// See [`RunLengthDeduplicator::collapse`].
pub fn collapse(readings: &[SensorReading], min_run: usize, tol: f64) -> Vec<SensorReading> {
    if readings.is_empty() {
        return Vec::new();
    }
    let mut sorted = readings.to_vec();
    sorted.sort_by(|a, b| {
        a.sensor_id
            .cmp(&b.sensor_id)
            .then(a.timestamp.cmp(&b.timestamp))
    });

    let mut out = Vec::with_capacity(sorted.len());
    for group in sorted.chunk_by(|a, b| a.sensor_id == b.sensor_id) {
        let values: Vec<f64> = group.iter().map(|r| r.value).collect();
        let keep = keep_mask(&values, min_run, tol);
        let before = out.len();
        out.extend(
            group
                .iter()
                .zip(keep)
                .filter(|(_, k)| *k)
                .map(|(r, _)| r.clone()),
        );
        tracing::debug!(
            sensor_id = %group[0].sensor_id,
            readings = group.len(),
            kept = out.len() - before,
            "collapsed runs"
        );
    }
    tracing::info!(
        readings = readings.len(),
        kept = out.len(),
        min_run,
        "run-length deduplication done"
    );
    out
}
