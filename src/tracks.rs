//! Interval track layout
//!
//! Maps labeled time intervals onto horizontal bar tracks sharing one time
//! axis: ground truth, detected, and scored segments stack vertically but
//! stay horizontally co-aligned through the shared mapper.

use crate::axis::{AxisMapper, LayoutError};
use crate::results::{IntervalRecord, SegmentRecord};
use anyhow::Result;
use chrono::NaiveDateTime;

/// Which track an interval belongs to; determines tooltip wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Truth,
    Detected,
    Segment,
    /// Auxiliary sample-interval rows (no label, times only)
    Sample,
}

/// A parsed interval ready for layout
#[derive(Debug, Clone)]
pub struct TrackInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Activity label, or the score code for segments
    pub label: String,
    /// Segment error annotation, when present
    pub err: Option<String>,
    /// True for TP/TN segments, which get the filled style
    pub emphasized: bool,
}

impl TrackInterval {
    /// Parse a truth or detected interval record
    pub fn from_label(rec: &IntervalRecord) -> Result<Self> {
        let (start, end) = rec.span()?;
        Ok(TrackInterval {
            start,
            end,
            label: rec.label.clone(),
            err: None,
            emphasized: false,
        })
    }

    /// Parse a scored segment record
    pub fn from_segment(rec: &SegmentRecord) -> Result<Self> {
        let (start, end) = rec.span()?;
        Ok(TrackInterval {
            start,
            end,
            emphasized: rec.score == "TP" || rec.score == "TN",
            label: rec.score.clone(),
            err: rec.err.clone(),
        })
    }

    /// Bare interval with no label (sample rows)
    pub fn from_span(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        TrackInterval {
            start,
            end,
            label: String::new(),
            err: None,
            emphasized: false,
        }
    }

    fn start_millis(&self) -> f64 {
        self.start.and_utc().timestamp_millis() as f64
    }

    fn end_millis(&self) -> f64 {
        self.end.and_utc().timestamp_millis() as f64
    }
}

/// One positioned bar
#[derive(Debug, Clone)]
pub struct TrackBar {
    pub x: f64,
    pub width: f64,
    pub y: f64,
    pub height: f64,
    pub tooltip: String,
    pub emphasized: bool,
}

/// Lay one track out against the shared mapper.
///
/// Every bar gets `x = map(start)`, `width = map(end) - map(start)`, the
/// track's fixed `y_offset` and `bar_height`. An interval ending before it
/// starts is rejected with `InvalidInterval`; the caller skips the whole
/// chart rather than drawing a negative-width rectangle. A zero-length
/// interval is valid and yields a zero-width marker. An empty track yields
/// an empty layout, not an error.
pub fn layout_track(
    kind: TrackKind,
    items: &[TrackInterval],
    mapper: &AxisMapper,
    y_offset: f64,
    bar_height: f64,
) -> Result<Vec<TrackBar>, LayoutError> {
    let mut bars = Vec::with_capacity(items.len());
    for item in items {
        let start = item.start_millis();
        let end = item.end_millis();
        if end < start {
            return Err(LayoutError::InvalidInterval { start, end });
        }
        bars.push(TrackBar {
            x: mapper.map(start),
            width: mapper.map(end) - mapper.map(start),
            y: y_offset,
            height: bar_height,
            tooltip: tooltip(kind, item),
            emphasized: item.emphasized,
        });
    }
    Ok(bars)
}

fn tooltip(kind: TrackKind, item: &TrackInterval) -> String {
    let times = format!(
        "{} - {}",
        item.start.format("%I:%M:%S %p"),
        item.end.format("%I:%M:%S %p")
    );
    match kind {
        TrackKind::Truth => format!("{} (Ground truth) - {}", times, item.label),
        TrackKind::Detected => format!("{} (Detected) - {}", times, item.label),
        TrackKind::Segment => {
            let err = item
                .err
                .as_deref()
                .map(|e| format!(" {}", e))
                .unwrap_or_default();
            format!("{} (Segment {}){}", times, item.label, err)
        }
        TrackKind::Sample => times,
    }
}
