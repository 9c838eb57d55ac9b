//! Results snapshot data model and loading
//!
//! The snapshot is a single JSON document produced by the scoring pipeline;
//! all counts and rates are precomputed. This module only parses and
//! normalizes it, it never computes scores.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Complete results snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsDoc {
    /// Timestamp of the test run (ISO-8601)
    pub t: String,
    /// Aggregate counts across all cases
    pub stats: AggregateStats,
    /// Aggregate scores across all cases
    pub scores: AggregateScores,
    /// Per-case detection results
    #[serde(default)]
    pub results: Vec<CaseResult>,
    /// Recognizer names exercised in this run
    #[serde(default)]
    pub recognizers: Vec<String>,
}

/// Aggregate counts across all test cases
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AggregateStats {
    #[serde(default)]
    pub truth_count: usize,
    #[serde(default)]
    pub detected_count: usize,
    #[serde(default)]
    pub segment_count: usize,
}

/// Aggregate frame and event scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateScores {
    pub frame_scores: FrameScore,
    pub event_scores: EventScores,
}

/// One ground-truth file evaluated against one recognizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    /// Path of the ground truth file
    #[serde(default)]
    pub labels_file: String,
    /// Recognizer class name
    #[serde(default)]
    pub recognizer: String,
    /// Ground truth intervals
    #[serde(default)]
    pub labels: Vec<IntervalRecord>,
    /// Detected intervals
    #[serde(default)]
    pub detected: Vec<IntervalRecord>,
    /// Precomputed scores for this case
    pub scores: CaseScores,
    /// Free-form subject metadata shown in the overview box
    #[serde(default)]
    pub subject: Option<BTreeMap<String, String>>,
    /// Named auxiliary sample-interval groups (e.g. sensor readings)
    #[serde(default)]
    pub sample_intervals: Option<BTreeMap<String, SampleIntervalGroup>>,
}

impl CaseResult {
    /// Stable identifier used for anchors, derived from inputs
    pub fn case_id(&self) -> String {
        format!("{}__to__{}", self.labels_file, self.recognizer)
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }
}

/// Scores attached to a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseScores {
    /// Scored timeline segments, ordered by start time
    #[serde(default)]
    pub segments: Vec<SegmentRecord>,
    pub frame_score: FrameScore,
    pub events: EventScores,
}

/// A labeled time interval (ground truth or detected)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub t1: String,
    pub t2: String,
    #[serde(default)]
    pub label: String,
}

/// A scored sub-interval of the case timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub t1: String,
    pub t2: String,
    /// TP | TN | FP | FN
    pub score: String,
    /// Error class for FP/FN segments (I, D, M, F, Os, Oe, Us, Ue)
    #[serde(default)]
    pub err: Option<String>,
}

/// A named group of auxiliary intervals with its sample count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleIntervalGroup {
    #[serde(default)]
    pub intervals: Vec<IntervalRecord>,
    #[serde(default)]
    pub count: u64,
}

/// Frame-level scores (rates keyed by score code; values may be null when
/// the corresponding frame population is empty)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FrameScore {
    #[serde(default)]
    pub p_rates: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    pub n_rates: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    pub frame_counts: BTreeMap<String, f64>,
    #[serde(default)]
    pub p_rate: Option<f64>,
    #[serde(default)]
    pub n_rate: Option<f64>,
    #[serde(default)]
    pub acc: Option<f64>,
}

/// Event-level scores: raw nine-category counts plus derived rates
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventScores {
    #[serde(default)]
    pub t_counts: RawTruthCounts,
    #[serde(default)]
    pub d_counts: RawDetectionCounts,
    #[serde(default)]
    pub t_rates: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    pub d_rates: BTreeMap<String, Option<f64>>,
}

impl EventScores {
    /// Normalize both count records in one step, enforcing the shared
    /// Correct invariant (the detection-side value is authoritative).
    pub fn normalized_counts(&self) -> (TruthCounts, DetectionCounts) {
        let mut t = self.t_counts.normalize();
        let d = self.d_counts.normalize();
        if t.correct != d.correct {
            warn!(
                "truth-side C={} differs from detection-side C={}, using detection side",
                t.correct, d.correct
            );
            t.correct = d.correct;
        }
        (t, d)
    }
}

/// Truth-side event counts as they appear on the wire; categories may be
/// absent in older snapshots
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawTruthCounts {
    #[serde(rename = "D", default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
    #[serde(rename = "F", default, skip_serializing_if = "Option::is_none")]
    pub fragmented: Option<u64>,
    #[serde(rename = "FM", default, skip_serializing_if = "Option::is_none")]
    pub frag_merged: Option<u64>,
    #[serde(rename = "M", default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<u64>,
    #[serde(rename = "C", default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<u64>,
}

impl RawTruthCounts {
    /// Default-to-zero normalization, performed once at the boundary.
    /// Absent categories are tolerated but warned about.
    pub fn normalize(&self) -> TruthCounts {
        TruthCounts {
            deleted: require_count("truth", "D", self.deleted),
            fragmented: require_count("truth", "F", self.fragmented),
            frag_merged: require_count("truth", "FM", self.frag_merged),
            merged: require_count("truth", "M", self.merged),
            correct: require_count("truth", "C", self.correct),
        }
    }
}

/// Detection-side event counts as they appear on the wire
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawDetectionCounts {
    #[serde(rename = "C", default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<u64>,
    #[serde(rename = "M'", default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<u64>,
    #[serde(rename = "FM'", default, skip_serializing_if = "Option::is_none")]
    pub frag_merged: Option<u64>,
    #[serde(rename = "F'", default, skip_serializing_if = "Option::is_none")]
    pub fragmented: Option<u64>,
    #[serde(rename = "I'", default, skip_serializing_if = "Option::is_none")]
    pub inserted: Option<u64>,
}

impl RawDetectionCounts {
    pub fn normalize(&self) -> DetectionCounts {
        DetectionCounts {
            correct: require_count("detection", "C", self.correct),
            merged: require_count("detection", "M'", self.merged),
            frag_merged: require_count("detection", "FM'", self.frag_merged),
            fragmented: require_count("detection", "F'", self.fragmented),
            inserted: require_count("detection", "I'", self.inserted),
        }
    }
}

fn require_count(side: &str, code: &str, value: Option<u64>) -> u64 {
    match value {
        Some(v) => v,
        None => {
            warn!("{} event counts missing category {}, treating as 0", side, code);
            0
        }
    }
}

/// Fully populated truth-side event counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruthCounts {
    pub deleted: u64,
    pub fragmented: u64,
    pub frag_merged: u64,
    pub merged: u64,
    pub correct: u64,
}

impl TruthCounts {
    /// Total ground-truth events
    pub fn actual_events(&self) -> u64 {
        self.deleted + self.fragmented + self.frag_merged + self.merged + self.correct
    }
}

/// Fully populated detection-side event counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionCounts {
    pub correct: u64,
    pub merged: u64,
    pub frag_merged: u64,
    pub fragmented: u64,
    pub inserted: u64,
}

impl DetectionCounts {
    /// Total detector-reported events
    pub fn returned_events(&self) -> u64 {
        self.correct + self.merged + self.frag_merged + self.fragmented + self.inserted
    }
}

/// Parse an ISO-8601 instant. Accepts an explicit offset; otherwise any
/// fractional seconds are dropped and the timestamp is taken as-is.
pub fn parse_instant(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    // get() rather than indexing: byte 19 may fall inside a multi-byte
    // character on malformed input, which must surface as a parse error
    let truncated = s.get(..19).unwrap_or(s);
    NaiveDateTime::parse_from_str(truncated, "%Y-%m-%dT%H:%M:%S")
        .with_context(|| format!("invalid timestamp: {}", s))
}

impl IntervalRecord {
    pub fn span(&self) -> Result<(NaiveDateTime, NaiveDateTime)> {
        Ok((parse_instant(&self.t1)?, parse_instant(&self.t2)?))
    }
}

impl SegmentRecord {
    pub fn span(&self) -> Result<(NaiveDateTime, NaiveDateTime)> {
        Ok((parse_instant(&self.t1)?, parse_instant(&self.t2)?))
    }
}

fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = flate2::read::GzDecoder::new(bytes);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .context("failed to decompress gzipped results")?;
    Ok(decompressed)
}

/// Parse a snapshot from raw bytes, gunzipping when the content is gzipped
pub fn parse_results(bytes: &[u8], gzipped: bool) -> Result<ResultsDoc> {
    let doc = if gzipped {
        serde_json::from_slice(&gunzip(bytes)?)?
    } else {
        serde_json::from_slice(bytes)?
    };
    Ok(doc)
}

/// Read a snapshot file into its plain JSON bytes. `.gz` files are
/// decompressed; the bytes are otherwise untouched, so fields outside the
/// parsed model survive for anything that re-serves the snapshot.
pub fn read_snapshot(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read results file: {}", path.display()))?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        gunzip(&bytes).with_context(|| format!("failed to decompress: {}", path.display()))
    } else {
        Ok(bytes)
    }
}

/// Load a results snapshot from disk. `.gz` files are decompressed.
pub fn load_results(path: &Path) -> Result<ResultsDoc> {
    let bytes = read_snapshot(path)?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse results file: {}", path.display()))
}
