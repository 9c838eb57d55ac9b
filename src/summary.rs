//! Display-ready summaries for the stat boxes and pie charts
//!
//! Groups the raw rate maps into the fixed red/yellow/green rows the
//! dashboard shows, with explicit NA handling so an absent rate never
//! renders as NaN.

use crate::results::{EventScores, FrameScore};
use std::collections::BTreeMap;

/// Visual tone of a stat row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Yellow,
    Green,
}

impl Tone {
    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Red => "st_red",
            Tone::Yellow => "st_yellow",
            Tone::Green => "st_green",
        }
    }
}

/// One labeled rate in a stat box; `None` renders as NA
#[derive(Debug, Clone)]
pub struct StatRow {
    pub label: &'static str,
    pub value: Option<f64>,
    pub tone: Tone,
}

/// A titled group of stat rows
#[derive(Debug, Clone)]
pub struct StatBox {
    pub title: String,
    pub rows: Vec<StatRow>,
}

fn rate(map: &BTreeMap<String, Option<f64>>, key: &str) -> Option<f64> {
    map.get(key).copied().flatten()
}

/// Sum the named rates, treating absent entries as zero. Only a group with
/// no present entry at all is absent as a whole.
fn rate_sum(map: &BTreeMap<String, Option<f64>>, keys: &[&str]) -> Option<f64> {
    let present: Vec<f64> = keys.iter().filter_map(|k| rate(map, k)).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum())
    }
}

/// "12.34%" with two decimals
pub fn pct_str(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Stat-row rendering of an optional rate; NA when absent or non-finite
pub fn format_rate(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => pct_str(v),
        _ => "NA".to_string(),
    }
}

fn titled_rate(name: &str, rate: Option<f64>) -> String {
    match rate {
        Some(r) if r.is_finite() => format!("{} ({})", name, pct_str(r)),
        _ => format!("{} (NA)", name),
    }
}

/// Positive-frame stat box: deletion / timing errors / true positive
pub fn positive_frame_box(fs: &FrameScore) -> StatBox {
    StatBox {
        title: titled_rate("Positive frames", fs.p_rate),
        rows: vec![
            StatRow {
                label: "Deletion",
                value: rate(&fs.p_rates, "Dr"),
                tone: Tone::Red,
            },
            StatRow {
                label: "Timing errors",
                value: rate_sum(&fs.p_rates, &["Uer", "Usr", "Fr"]),
                tone: Tone::Yellow,
            },
            StatRow {
                label: "True positive",
                value: rate(&fs.p_rates, "TPr"),
                tone: Tone::Green,
            },
        ],
    }
}

/// Negative-frame stat box: insertion / timing errors / true negative
pub fn negative_frame_box(fs: &FrameScore) -> StatBox {
    StatBox {
        title: titled_rate("Negative frames", fs.n_rate),
        rows: vec![
            StatRow {
                label: "Insertion",
                value: rate(&fs.n_rates, "Ir"),
                tone: Tone::Red,
            },
            StatRow {
                label: "Timing errors",
                value: rate_sum(&fs.n_rates, &["Oer", "Osr", "Mr"]),
                tone: Tone::Yellow,
            },
            StatRow {
                label: "True negative",
                value: rate(&fs.n_rates, "TNr"),
                tone: Tone::Green,
            },
        ],
    }
}

/// Truth-event stat box: deletion / split-merged / correct
pub fn truth_event_box(ev: &EventScores, truth_count: usize) -> StatBox {
    StatBox {
        title: format!("Truth events ({})", truth_count),
        rows: vec![
            StatRow {
                label: "Deletion",
                value: rate(&ev.t_rates, "D"),
                tone: Tone::Red,
            },
            StatRow {
                label: "Split / Merged",
                value: rate_sum(&ev.t_rates, &["F", "FM", "M"]),
                tone: Tone::Yellow,
            },
            StatRow {
                label: "Correct",
                value: rate(&ev.t_rates, "C"),
                tone: Tone::Green,
            },
        ],
    }
}

/// Detected-event stat box: insertion / split-merged / correct
pub fn detected_event_box(ev: &EventScores, detected_count: usize) -> StatBox {
    StatBox {
        title: format!("Detected events ({})", detected_count),
        rows: vec![
            StatRow {
                label: "Insertion",
                value: rate(&ev.d_rates, "I'"),
                tone: Tone::Red,
            },
            StatRow {
                label: "Split / Merged",
                value: rate_sum(&ev.d_rates, &["F'", "FM'", "M'"]),
                tone: Tone::Yellow,
            },
            StatRow {
                label: "Correct",
                value: rate(&ev.d_rates, "C"),
                tone: Tone::Green,
            },
        ],
    }
}

/// One pie slice derived from a rate map entry
#[derive(Debug, Clone)]
pub struct PieSlice {
    pub code: String,
    pub display_label: String,
    pub fraction: f64,
    pub color: &'static str,
}

/// Build pie slices from a rate map. Null, zero, and non-finite entries
/// are skipped; an empty result means the pie is skipped entirely.
pub fn pie_slices(rates: &BTreeMap<String, Option<f64>>) -> Vec<PieSlice> {
    rates
        .iter()
        .filter_map(|(code, value)| {
            let fraction = (*value)?;
            if !fraction.is_finite() || fraction <= 0.0 {
                return None;
            }
            Some(PieSlice {
                code: code.clone(),
                display_label: display_label(code),
                fraction,
                color: slice_color(code),
            })
        })
        .collect()
}

/// Score-code color table shared by the pie legends
fn slice_color(code: &str) -> &'static str {
    match code {
        "TPr" | "C" | "TNr" => "#77AB13",
        "Usr" | "Osr" | "M'" | "M" => "#fdd0a2",
        "Uer" | "Oer" | "FM" | "FM'" => "#fdae6b",
        "I'" | "Ir" | "Dr" | "D" => "#AE432E",
        "Fr" | "F" | "F'" | "Mr" => "#B5712E",
        _ => "#cccccc",
    }
}

/// Greek-letter display substitutions for the timing-error codes
fn display_label(code: &str) -> String {
    match code {
        "Usr" => "U\u{03C9}r".to_string(),
        "Uer" => "U\u{03B1}r".to_string(),
        "Osr" => "O\u{03C9}r".to_string(),
        "Oer" => "O\u{03B1}r".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(entries: &[(&str, Option<f64>)]) -> BTreeMap<String, Option<f64>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_positive_frame_grouping() {
        let fs = FrameScore {
            p_rates: rates(&[
                ("Dr", Some(0.1)),
                ("Uer", Some(0.05)),
                ("Usr", Some(0.05)),
                ("Fr", Some(0.1)),
                ("TPr", Some(0.7)),
            ]),
            p_rate: Some(0.4),
            ..Default::default()
        };
        let stat = positive_frame_box(&fs);
        assert_eq!(stat.title, "Positive frames (40.00%)");
        assert_eq!(stat.rows[0].value, Some(0.1));
        assert!((stat.rows[1].value.unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(stat.rows[2].value, Some(0.7));
        assert_eq!(stat.rows[2].tone, Tone::Green);
    }

    #[test]
    fn test_missing_rates_sum_as_zero_but_absent_group_is_na() {
        let fs = FrameScore {
            n_rates: rates(&[("Ir", Some(0.2)), ("Mr", Some(0.1))]),
            ..Default::default()
        };
        let stat = negative_frame_box(&fs);
        // Oer/Osr absent, Mr present: sum over present entries only
        assert_eq!(stat.rows[1].value, Some(0.1));
        // TNr fully absent
        assert_eq!(stat.rows[2].value, None);
        assert_eq!(format_rate(stat.rows[2].value), "NA");
        assert_eq!(stat.title, "Negative frames (NA)");
    }

    #[test]
    fn test_event_boxes_use_prime_keys() {
        let ev = EventScores {
            d_rates: rates(&[
                ("I'", Some(0.25)),
                ("F'", Some(0.05)),
                ("FM'", Some(0.05)),
                ("M'", Some(0.05)),
                ("C", Some(0.6)),
            ]),
            ..Default::default()
        };
        let stat = detected_event_box(&ev, 12);
        assert_eq!(stat.title, "Detected events (12)");
        assert_eq!(stat.rows[0].value, Some(0.25));
        assert!((stat.rows[1].value.unwrap() - 0.15).abs() < 1e-12);
        assert_eq!(stat.rows[2].value, Some(0.6));
    }

    #[test]
    fn test_format_rate_never_emits_nan() {
        assert_eq!(format_rate(Some(f64::NAN)), "NA");
        assert_eq!(format_rate(None), "NA");
        assert_eq!(format_rate(Some(0.125)), "12.50%");
    }

    #[test]
    fn test_pie_slices_skip_null_and_zero() {
        let slices = pie_slices(&rates(&[
            ("TPr", Some(0.8)),
            ("Dr", Some(0.0)),
            ("Fr", None),
            ("Usr", Some(0.2)),
        ]));
        let codes: Vec<_> = slices.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, ["TPr", "Usr"]);
        assert_eq!(slices[0].color, "#77AB13");
        assert_eq!(slices[1].display_label, "U\u{03C9}r");
    }

    #[test]
    fn test_empty_rates_yield_no_slices() {
        assert!(pie_slices(&rates(&[("C", None)])).is_empty());
        assert!(pie_slices(&BTreeMap::new()).is_empty());
    }
}
