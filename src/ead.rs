//! Event analysis diagram layout
//!
//! Lays out the nine event-outcome categories as one proportional segmented
//! bar on a shared scale, plus two guide lines whose overlap shows the
//! Correct mass shared between the truth and detection perspectives. The
//! alignment of the two lines is the point of the widget and must be
//! numerically exact.

use crate::axis::AxisMapper;
use crate::results::{DetectionCounts, TruthCounts};
use serde::Serialize;

/// The nine event-outcome categories, in fixed diagram order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventCategory {
    /// D: truth event with no matching detection
    Deleted,
    /// F: truth event split across several detections
    Fragmented,
    /// FM: truth event both fragmented and merged
    FragMerged,
    /// M: truth event merged with a neighbor
    Merged,
    /// C: correctly matched (shared between perspectives)
    Correct,
    /// M': detection merging several truth events
    MergedReturn,
    /// FM': detection both fragmenting and merging
    FragMergedReturn,
    /// F': detection covering a fragment of a truth event
    FragmentedReturn,
    /// I': detection with no matching truth event
    InsertedReturn,
}

impl EventCategory {
    pub fn code(&self) -> &'static str {
        match self {
            EventCategory::Deleted => "D",
            EventCategory::Fragmented => "F",
            EventCategory::FragMerged => "FM",
            EventCategory::Merged => "M",
            EventCategory::Correct => "C",
            EventCategory::MergedReturn => "M'",
            EventCategory::FragMergedReturn => "FM'",
            EventCategory::FragmentedReturn => "F'",
            EventCategory::InsertedReturn => "I'",
        }
    }

    /// Visual class for the diagram. Primes share the class of their truth
    /// counterpart (M with M', F with F'), even though the pie legend
    /// colors them separately.
    pub fn visual_class(&self) -> VisualClass {
        match self {
            EventCategory::Deleted => VisualClass::Deletion,
            EventCategory::Fragmented | EventCategory::FragmentedReturn => {
                VisualClass::Fragmentation
            }
            EventCategory::FragMerged | EventCategory::FragMergedReturn => VisualClass::FragMerge,
            EventCategory::Merged | EventCategory::MergedReturn => VisualClass::Merge,
            EventCategory::Correct => VisualClass::Correct,
            EventCategory::InsertedReturn => VisualClass::Insertion,
        }
    }
}

/// Color class of a diagram segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VisualClass {
    Deletion,
    Fragmentation,
    FragMerge,
    Merge,
    Correct,
    Insertion,
}

impl VisualClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            VisualClass::Deletion => "ead_D",
            VisualClass::Fragmentation => "ead_F",
            VisualClass::FragMerge => "ead_FM",
            VisualClass::Merge => "ead_M",
            VisualClass::Correct => "ead_C",
            VisualClass::Insertion => "ead_I",
        }
    }
}

/// One positioned diagram segment
#[derive(Debug, Clone, Serialize)]
pub struct EadSegment {
    pub category: EventCategory,
    /// "<code>:<count>"
    pub label: String,
    pub x: f64,
    pub width: f64,
}

impl EadSegment {
    pub fn css_class(&self) -> &'static str {
        self.category.visual_class().css_class()
    }
}

/// A horizontal guide line marking an event total
#[derive(Debug, Clone, Serialize)]
pub struct GuideLine {
    pub x1: f64,
    pub x2: f64,
    pub label: String,
}

/// Computed diagram layout
#[derive(Debug, Clone, Serialize)]
pub struct EadLayout {
    /// Contiguous non-overlapping segments, left to right in category order;
    /// zero-count categories are omitted
    pub segments: Vec<EadSegment>,
    /// "Detected (total=N)" line, aligned so its Correct span coincides
    /// with the tail of the truth line
    pub detected_line: GuideLine,
    /// "Truth (total=N)" line from the origin
    pub truth_line: GuideLine,
}

impl EadLayout {
    /// Lay the nine categories out over `[0, width]` pixels.
    ///
    /// Returns `None` when every count is zero; the caller skips the chart.
    pub fn compute(t: &TruthCounts, d: &DetectionCounts, width: f64) -> Option<EadLayout> {
        // Correct is counted exactly once, from the detection side
        let xmax = t.deleted
            + t.fragmented
            + t.frag_merged
            + t.merged
            + d.correct
            + d.merged
            + d.frag_merged
            + d.fragmented
            + d.inserted;
        if xmax == 0 {
            return None;
        }
        let scale = AxisMapper::build(0.0, xmax as f64, 0.0, width).ok()?;

        let ordered = [
            (EventCategory::Deleted, t.deleted),
            (EventCategory::Fragmented, t.fragmented),
            (EventCategory::FragMerged, t.frag_merged),
            (EventCategory::Merged, t.merged),
            (EventCategory::Correct, d.correct),
            (EventCategory::MergedReturn, d.merged),
            (EventCategory::FragMergedReturn, d.frag_merged),
            (EventCategory::FragmentedReturn, d.fragmented),
            (EventCategory::InsertedReturn, d.inserted),
        ];

        let mut segments = Vec::new();
        let mut cumulative = 0u64;
        for (category, count) in ordered {
            if count > 0 {
                segments.push(EadSegment {
                    category,
                    label: format!("{}:{}", category.code(), count),
                    x: scale.map(cumulative as f64),
                    width: scale.map(count as f64),
                });
            }
            cumulative += count;
        }

        let correct = d.correct;
        let actual = t.deleted + t.fragmented + t.frag_merged + t.merged + correct;
        let returned = d.returned_events();

        let detected_line = GuideLine {
            x1: scale.map((actual - correct) as f64),
            x2: scale.map((actual + returned - correct) as f64),
            label: format!("Detected (total={})", returned),
        };
        let truth_line = GuideLine {
            x1: scale.map(0.0),
            x2: scale.map(actual as f64),
            label: format!("Truth (total={})", actual),
        };

        Some(EadLayout {
            segments,
            detected_line,
            truth_line,
        })
    }
}
