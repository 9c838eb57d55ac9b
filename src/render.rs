//! SVG/HTML generation from the computed layouts
//!
//! Pure text generation: each widget renders from its layout primitives
//! into an SVG fragment, and `dashboard_html` assembles the full page.
//! A widget whose preconditions fail (degenerate time domain, zero counts,
//! empty tracks) is skipped; the rest of the page still renders.

use crate::axis::AxisMapper;
use crate::ead::EadLayout;
use crate::results::{parse_instant, CaseResult, ResultsDoc, SampleIntervalGroup};
use crate::summary::{self, StatBox};
use crate::tracks::{layout_track, TrackBar, TrackInterval, TrackKind};
use chrono::{DateTime, NaiveDateTime};
use log::{error, warn};
use std::collections::BTreeMap;
use std::fmt::Write as _;

// Interval chart geometry, shared across the three tracks
pub const CHART_WIDTH: f64 = 1082.0;
pub const BAR_H: f64 = 24.0;
pub const BAR_PAD: f64 = 6.0;
pub const LABEL_PAD: f64 = 32.0;
pub const X_OFFSET: f64 = 24.0;
pub const CHART_HEIGHT: f64 = 3.0 * BAR_H + 3.0 * BAR_PAD + LABEL_PAD;
pub const GRIDLINE_COUNT: usize = 12;

// Event analysis diagram geometry
const EAD_WIDTH: f64 = 1110.0;
const EAD_HEIGHT: f64 = 85.0;
const EAD_BAR_H: f64 = 32.0;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn millis_label(ms: f64, fmt: &str) -> String {
    DateTime::from_timestamp_millis(ms as i64)
        .map(|dt| dt.naive_utc().format(fmt).to_string())
        .unwrap_or_default()
}

/// Build the shared time axis for a case from its scored segments.
///
/// Returns `None` when there are no segments or the span is degenerate;
/// the interval chart and the sample rows are then skipped.
pub fn case_time_axis(case: &CaseResult) -> Option<AxisMapper> {
    let first = case.scores.segments.first()?;
    let last = case.scores.segments.last()?;
    let (start, _) = match first.span() {
        Ok(span) => span,
        Err(e) => {
            error!("case {}: {}", case.case_id(), e);
            return None;
        }
    };
    let (_, end) = match last.span() {
        Ok(span) => span,
        Err(e) => {
            error!("case {}: {}", case.case_id(), e);
            return None;
        }
    };
    match AxisMapper::from_time_range(start, end, 0.0, CHART_WIDTH) {
        Ok(mapper) => Some(mapper),
        Err(e) => {
            warn!("case {}: skipping interval chart, {}", case.case_id(), e);
            None
        }
    }
}

fn push_track(svg: &mut String, class: &str, bars: &[TrackBar]) {
    let _ = writeln!(svg, "  <g class=\"{}\">", class);
    for bar in bars {
        let style = if bar.emphasized {
            " style=\"stroke:#343738;fill:#77AB13;\""
        } else {
            ""
        };
        let _ = writeln!(
            svg,
            "    <rect rx=\"2\" ry=\"2\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\"{}><title>{}</title></rect>",
            X_OFFSET + bar.x,
            bar.y,
            bar.width,
            bar.height,
            style,
            html_escape(&bar.tooltip)
        );
    }
    let _ = writeln!(svg, "  </g>");
}

/// Render the three co-aligned tracks (truth / detected / segments) with
/// gridlines and time labels. `None` when the chart cannot be drawn.
pub fn case_chart_svg(case: &CaseResult, mapper: &AxisMapper) -> Option<String> {
    let parse = |records: &[crate::results::IntervalRecord]| -> Option<Vec<TrackInterval>> {
        records
            .iter()
            .map(|r| TrackInterval::from_label(r).ok())
            .collect()
    };
    let truth = match parse(&case.labels) {
        Some(items) => items,
        None => {
            error!("case {}: unparseable truth interval", case.case_id());
            return None;
        }
    };
    let detected = match parse(&case.detected) {
        Some(items) => items,
        None => {
            error!("case {}: unparseable detected interval", case.case_id());
            return None;
        }
    };
    let segments: Option<Vec<TrackInterval>> = case
        .scores
        .segments
        .iter()
        .map(|r| TrackInterval::from_segment(r).ok())
        .collect();
    let segments = match segments {
        Some(items) => items,
        None => {
            error!("case {}: unparseable segment", case.case_id());
            return None;
        }
    };

    let lay = |kind, items: &[TrackInterval], y| match layout_track(kind, items, mapper, y, BAR_H) {
        Ok(bars) => Some(bars),
        Err(e) => {
            error!("case {}: skipping interval chart, {}", case.case_id(), e);
            None
        }
    };
    let truth_bars = lay(TrackKind::Truth, &truth, BAR_PAD)?;
    let detected_bars = lay(TrackKind::Detected, &detected, BAR_H + 2.0 * BAR_PAD)?;
    let segment_bars = lay(TrackKind::Segment, &segments, 2.0 * BAR_H + 3.0 * BAR_PAD)?;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\">\n",
        CHART_WIDTH + 2.0 * X_OFFSET,
        CHART_HEIGHT
    );

    let ticks = mapper.ticks(GRIDLINE_COUNT);
    for t in &ticks {
        let x = X_OFFSET + mapper.map(*t);
        let _ = writeln!(
            svg,
            "  <line x1=\"{:.1}\" y1=\"0\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#555\"/>",
            x,
            x,
            CHART_HEIGHT - 18.0
        );
    }

    push_track(&mut svg, "truth_chart", &truth_bars);
    push_track(&mut svg, "detected_chart", &detected_bars);
    push_track(&mut svg, "segment_chart", &segment_bars);

    for t in &ticks {
        let _ = writeln!(
            svg,
            "  <text class=\"xlabel\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            X_OFFSET + mapper.map(*t),
            CHART_HEIGHT - 4.0,
            millis_label(*t, "%I:%M %p")
        );
    }

    svg.push_str("</svg>\n");
    Some(svg)
}

/// Render the event analysis diagram. `None` when all counts are zero.
pub fn ead_svg(layout: &EadLayout) -> String {
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\">\n  <g transform=\"translate(0,20)\">\n",
        EAD_WIDTH, EAD_HEIGHT
    );

    for seg in &layout.segments {
        let _ = writeln!(
            svg,
            "    <rect class=\"ead {}\" x=\"{:.1}\" width=\"{:.1}\" height=\"{:.0}\"/>",
            seg.css_class(),
            seg.x,
            seg.width,
            EAD_BAR_H
        );
        let _ = writeln!(
            svg,
            "    <text class=\"ead_lbl\" x=\"{:.1}\" y=\"{:.0}\">{}</text>",
            seg.x + 6.0,
            EAD_BAR_H / 2.0 + 5.0,
            html_escape(&seg.label)
        );
    }

    // Detected line along the top edge, truth line along the bottom edge;
    // their overlap is the shared Correct span
    let _ = writeln!(
        svg,
        "    <line x1=\"{:.1}\" x2=\"{:.1}\" y1=\"0\" y2=\"0\" stroke=\"#ddd\" stroke-width=\"2\"/>",
        layout.detected_line.x1, layout.detected_line.x2
    );
    let _ = writeln!(
        svg,
        "    <text class=\"event_lbl\" x=\"{:.0}\" y=\"-8\">{}</text>",
        EAD_WIDTH - 100.0,
        html_escape(&layout.detected_line.label)
    );
    let _ = writeln!(
        svg,
        "    <line x1=\"{:.1}\" x2=\"{:.1}\" y1=\"{:.0}\" y2=\"{:.0}\" stroke=\"#ddd\" stroke-width=\"2\"/>",
        layout.truth_line.x1, layout.truth_line.x2, EAD_BAR_H, EAD_BAR_H
    );
    let _ = writeln!(
        svg,
        "    <text class=\"event_lbl\" x=\"12\" y=\"{:.0}\">{}</text>",
        EAD_BAR_H + 18.0,
        html_escape(&layout.truth_line.label)
    );

    svg.push_str("  </g>\n</svg>\n");
    svg
}

/// Render a pie with its legend. `None` when there is no mass to show.
pub fn pie_svg(title: &str, rates: &BTreeMap<String, Option<f64>>) -> Option<String> {
    let slices = summary::pie_slices(rates);
    if slices.is_empty() {
        return None;
    }

    let w = 260.0;
    let r = 65.0;
    let rd = r + 2.0;
    let h = r * 2.0 + 4.0;
    let box_h = 18.0;
    let leg_y_off = 8.0;

    let total: f64 = slices.iter().map(|s| s.fraction).sum();

    let mut svg = format!(
        "<div class=\"stbox st_pie2\"><div class=\"stlblpie\">{}</div>\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\">\n  <g transform=\"translate({:.0},{:.0})\">\n",
        html_escape(title),
        w,
        h,
        rd,
        rd
    );

    // Slices start at 12 o'clock and run clockwise
    let mut angle = -std::f64::consts::FRAC_PI_2;
    for slice in &slices {
        let sweep = slice.fraction / total * std::f64::consts::TAU;
        svg.push_str(&pie_slice_path(r, angle, sweep, slice.color, &slice.code));
        angle += sweep;
    }

    for (i, slice) in slices.iter().enumerate() {
        let y = i as f64 * (box_h + 4.0) - r + leg_y_off;
        let _ = writeln!(
            svg,
            "    <rect class=\"legend_color\" width=\"{:.0}\" height=\"{:.0}\" fill=\"{}\" x=\"{:.0}\" y=\"{:.1}\"/>",
            box_h,
            box_h,
            slice.color,
            r + 18.0,
            y
        );
        let _ = writeln!(
            svg,
            "    <text class=\"legend_text\" x=\"{:.0}\" y=\"{:.1}\">{}</text>",
            r + box_h + 24.0,
            y + 14.0,
            html_escape(&slice.display_label)
        );
        let _ = writeln!(
            svg,
            "    <text class=\"legend_val\" x=\"{:.0}\" y=\"{:.1}\">{:.1} %</text>",
            r + box_h + 52.0,
            y + 14.0,
            slice.fraction * 100.0
        );
    }

    svg.push_str("  </g>\n</svg></div>\n");
    Some(svg)
}

fn pie_slice_path(r: f64, start_angle: f64, sweep: f64, color: &str, code: &str) -> String {
    if sweep >= std::f64::consts::TAU - 1e-9 {
        // A single full-circle slice cannot be expressed as one arc
        return format!(
            "    <circle class=\"pie_path\" r=\"{:.1}\" fill=\"{}\"><title>{}</title></circle>\n",
            r,
            color,
            html_escape(code)
        );
    }
    let (x0, y0) = (r * start_angle.cos(), r * start_angle.sin());
    let end = start_angle + sweep;
    let (x1, y1) = (r * end.cos(), r * end.sin());
    let large_arc = if sweep > std::f64::consts::PI { 1 } else { 0 };
    format!(
        "    <path class=\"pie_path\" fill=\"{}\" d=\"M0,0 L{:.2},{:.2} A{:.1},{:.1} 0 {} 1 {:.2},{:.2} Z\"><title>{}</title></path>\n",
        color,
        x0,
        y0,
        r,
        r,
        large_arc,
        x1,
        y1,
        html_escape(code)
    )
}

/// Render one named sample-interval row against the case's time axis
pub fn sample_intervals_svg(
    name: &str,
    group: &SampleIntervalGroup,
    mapper: &AxisMapper,
) -> Option<String> {
    let items: Option<Vec<TrackInterval>> = group
        .intervals
        .iter()
        .map(|r| r.span().ok().map(|(t1, t2)| TrackInterval::from_span(t1, t2)))
        .collect();
    let items = match items {
        Some(items) => items,
        None => {
            error!("sample group {}: unparseable interval", name);
            return None;
        }
    };
    let bars = match layout_track(TrackKind::Sample, &items, mapper, 0.0, 16.0) {
        Ok(bars) => bars,
        Err(e) => {
            error!("sample group {}: {}", name, e);
            return None;
        }
    };

    let span_secs = (mapper.domain_max() - mapper.domain_min()) / 1000.0;
    let title = if group.count > 0 {
        format!(
            "<b>{}</b> | count: {} | rate: {:.1}s",
            html_escape(name),
            group.count,
            span_secs / group.count as f64
        )
    } else {
        format!("<b>{}</b> | count: 0", html_escape(name))
    };

    let mut svg = format!(
        "<div class=\"stbox\"><svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"16\">\n  <g class=\"ti_chart\">\n",
        CHART_WIDTH + 2.0 * X_OFFSET
    );
    for bar in &bars {
        let _ = writeln!(
            svg,
            "    <rect rx=\"2\" ry=\"2\" x=\"{:.1}\" y=\"0\" width=\"{:.1}\" height=\"16\"><title>{}</title></rect>",
            X_OFFSET + bar.x,
            bar.width,
            html_escape(&bar.tooltip)
        );
    }
    let _ = writeln!(
        svg,
        "  </g>\n</svg>\n<div class=\"ti_title\">{}</div></div>",
        title
    );
    Some(svg)
}

/// "08:01" renders as "8:01"; the AM/PM marker is styled separately
fn short_time(dt: NaiveDateTime) -> (String, String) {
    let time = dt.format("%I:%M").to_string();
    let time = time.strip_prefix('0').map(str::to_string).unwrap_or(time);
    (time, dt.format("%p").to_string())
}

/// Date-time box for the test run timestamp
fn test_time_box_html(t: &str) -> Option<String> {
    let dt = match parse_instant(t) {
        Ok(dt) => dt,
        Err(e) => {
            warn!("skipping test time box, {}", e);
            return None;
        }
    };
    let (time, ampm) = short_time(dt);
    Some(format!(
        "<div class=\"stbox stbox1\"><div class=\"stlbl1\">Test Time</div>\n  <div class=\"strow\"><div class=\"stval\">{}<span class=\"ampm\">{}</span></div></div>\n  <div class=\"strow\"><div class=\"stval3\">{}</div><div class=\"stval3l\">{}</div></div>\n</div>\n",
        time,
        ampm,
        dt.format("%A"),
        dt.format("%e %b %Y")
    ))
}

/// Per-case overview box: first-label start to last-label end, the date,
/// and the free-form subject metadata. `None` when there are no labels or
/// the boundary timestamps do not parse.
fn overview_box_html(case: &CaseResult) -> Option<String> {
    let first = case.labels.first()?;
    let last = case.labels.last()?;
    let (start, end) = match (parse_instant(&first.t1), parse_instant(&last.t2)) {
        (Ok(start), Ok(end)) => (start, end),
        _ => {
            warn!("case {}: skipping overview box, unparseable label time", case.case_id());
            return None;
        }
    };

    let (t1, ampm1) = short_time(start);
    let (t2, ampm2) = short_time(end);
    let mut html = format!(
        "<div class=\"stbox stbox1\"><div class=\"stlbl1\">Overview</div>\n  <div class=\"strow\"><div class=\"stval4\">{}<span class=\"ampm2\">{}</span> - {}<span class=\"ampm2\">{}</span></div></div>\n  <div class=\"strow\"><div class=\"stval5\">{}</div></div>\n",
        t1,
        ampm1,
        t2,
        ampm2,
        start.format("%e %b %Y")
    );
    if let Some(subject) = &case.subject {
        for (key, value) in subject {
            let _ = writeln!(
                html,
                "  <div class=\"strow stdat\">{}<span class=\"stdatval\">{}</span></div>",
                html_escape(key),
                html_escape(value)
            );
        }
    }
    html.push_str("</div>\n");
    Some(html)
}

fn stat_box_html(stat: &StatBox) -> String {
    let mut html = format!(
        "<div class=\"stbox stbox3\"><div class=\"stlbl1\">{}</div>\n",
        html_escape(&stat.title)
    );
    for row in &stat.rows {
        let _ = writeln!(
            html,
            "  <div class=\"strow\"><div class=\"stlbl2\">{}</div><div class=\"stval2 {}\">{}</div></div>",
            row.label,
            row.tone.css_class(),
            summary::format_rate(row.value)
        );
    }
    html.push_str("</div>\n");
    html
}

fn count_box_html(title: &str, counts: &[(&str, usize)]) -> String {
    let mut html = format!(
        "<div class=\"stbox stbox2\"><div class=\"stlbl1\">{}</div>\n",
        html_escape(title)
    );
    for (label, value) in counts {
        let _ = writeln!(
            html,
            "  <div class=\"strow\"><div class=\"stlbl2\">{}</div><div class=\"stval2\">{}</div></div>",
            label, value
        );
    }
    html.push_str("</div>\n");
    html
}

fn case_section_html(case_num: usize, case: &CaseResult) -> String {
    let mut html = String::new();

    let _ = writeln!(
        html,
        "<div class=\"stbox sttitle\" id=\"case_{}\">Case {}: <code>{} --&gt; {}</code></div><div class=\"clear\"></div>",
        case.case_id(),
        case_num,
        html_escape(&case.labels_file),
        html_escape(&case.recognizer)
    );

    html.push_str("<div class=\"brow\">\n");
    if let Some(overview) = overview_box_html(case) {
        html.push_str(&overview);
    }
    html.push_str(&count_box_html(
        "Test Case",
        &[
            ("Labels", case.labels.len()),
            ("Detected", case.detected.len()),
            ("Segments", case.scores.segments.len()),
        ],
    ));
    html.push_str(&stat_box_html(&summary::positive_frame_box(
        &case.scores.frame_score,
    )));
    html.push_str(&stat_box_html(&summary::negative_frame_box(
        &case.scores.frame_score,
    )));
    html.push_str(&stat_box_html(&summary::truth_event_box(
        &case.scores.events,
        case.labels.len(),
    )));
    html.push_str(&stat_box_html(&summary::detected_event_box(
        &case.scores.events,
        case.detected.len(),
    )));
    html.push_str("</div><div class=\"clear\"></div>\n");

    if let Some(mapper) = case_time_axis(case) {
        if let Some(chart) = case_chart_svg(case, &mapper) {
            html.push_str("<div class=\"stbox st_interval_box\">\n");
            html.push_str(&chart);
            html.push_str("</div><div class=\"clear\"></div>\n");
        }
        if let Some(groups) = &case.sample_intervals {
            for (name, group) in groups {
                if let Some(row) = sample_intervals_svg(name, group, &mapper) {
                    html.push_str(&row);
                }
            }
            html.push_str("<div class=\"clear\"></div>\n");
        }
    }

    html.push_str("<div class=\"brow\">\n");
    let fs = &case.scores.frame_score;
    let title = summary::positive_frame_box(fs).title;
    if let Some(pie) = pie_svg(&title, &fs.p_rates) {
        html.push_str(&pie);
    }
    let title = summary::negative_frame_box(fs).title;
    if let Some(pie) = pie_svg(&title, &fs.n_rates) {
        html.push_str(&pie);
    }
    let ev = &case.scores.events;
    if !case.labels.is_empty() {
        let title = format!("Truth events ({})", case.labels.len());
        if let Some(pie) = pie_svg(&title, &ev.t_rates) {
            html.push_str(&pie);
        }
    }
    if !case.detected.is_empty() {
        let title = format!("Detected events ({})", case.detected.len());
        if let Some(pie) = pie_svg(&title, &ev.d_rates) {
            html.push_str(&pie);
        }
    }
    html.push_str("</div><div class=\"clear\"></div>\n");

    let (t_counts, d_counts) = case.scores.events.normalized_counts();
    if let Some(layout) = EadLayout::compute(&t_counts, &d_counts, EAD_WIDTH) {
        html.push_str("<div class=\"stead\"><div class=\"stlblead\">Event analysis diagram</div>\n");
        html.push_str(&ead_svg(&layout));
        html.push_str("</div><div class=\"clear\"></div>\n");
    }

    html
}

/// Assemble the complete dashboard page for one results snapshot
pub fn dashboard_html(doc: &ResultsDoc) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"/>\n");
    let _ = writeln!(
        html,
        "<title>Performance Results: {}</title>",
        html_escape(&doc.t)
    );
    html.push_str(STYLESHEET);
    html.push_str("</head><body>\n<a name=\"top\"></a>\n");

    let _ = writeln!(
        html,
        "<div class=\"stbox sttitle\">Performance Overview &mdash; {}</div><div class=\"clear\"></div>",
        html_escape(&doc.t)
    );

    html.push_str("<div class=\"brow\">\n");
    if let Some(dt_box) = test_time_box_html(&doc.t) {
        html.push_str(&dt_box);
    }
    html.push_str(&count_box_html(
        "Test Cases",
        &[
            ("Cases", doc.results.len()),
            ("Truths", doc.stats.truth_count),
            ("Detected", doc.stats.detected_count),
        ],
    ));
    html.push_str(&stat_box_html(&summary::positive_frame_box(
        &doc.scores.frame_scores,
    )));
    html.push_str(&stat_box_html(&summary::negative_frame_box(
        &doc.scores.frame_scores,
    )));
    html.push_str(&stat_box_html(&summary::truth_event_box(
        &doc.scores.event_scores,
        doc.stats.truth_count,
    )));
    html.push_str(&stat_box_html(&summary::detected_event_box(
        &doc.scores.event_scores,
        doc.stats.detected_count,
    )));
    html.push_str("</div><div class=\"clear\"></div>\n");

    html.push_str("<div class=\"brow\">\n");
    let frsc = &doc.scores.frame_scores;
    // only an explicit zero rate suppresses the pie; an absent rate does not
    if frsc.p_rate != Some(0.0) {
        let title = summary::positive_frame_box(frsc).title;
        if let Some(pie) = pie_svg(&title, &frsc.p_rates) {
            html.push_str(&pie);
        }
    }
    if frsc.n_rate != Some(0.0) {
        let title = summary::negative_frame_box(frsc).title;
        if let Some(pie) = pie_svg(&title, &frsc.n_rates) {
            html.push_str(&pie);
        }
    }
    let esc = &doc.scores.event_scores;
    let title = format!("Truth events ({})", doc.stats.truth_count);
    if let Some(pie) = pie_svg(&title, &esc.t_rates) {
        html.push_str(&pie);
    }
    if doc.stats.detected_count > 0 {
        let title = format!("Detected events ({})", doc.stats.detected_count);
        if let Some(pie) = pie_svg(&title, &esc.d_rates) {
            html.push_str(&pie);
        }
    }
    html.push_str("</div><div class=\"clear\"></div>\n");

    for (i, case) in doc.results.iter().enumerate() {
        html.push_str(&case_section_html(i + 1, case));
    }

    html.push_str(FOOTER);
    html.push_str("</body></html>\n");
    html
}

const STYLESHEET: &str = r#"<style>
body { font-family: Helvetica, Arial, sans-serif; background: #343738; color: #eee; margin: 12px; }
.brow { display: flex; flex-wrap: wrap; gap: 12px; margin-bottom: 12px; }
.clear { clear: both; padding: 6px; }
.stbox { background: #2a2c2d; border-radius: 4px; padding: 10px 14px; }
.sttitle { font-size: 18px; font-weight: bold; margin-bottom: 12px; }
.sttitle code { font-size: 14px; color: #bbb; }
.stlbl1, .stlblpie, .stlblead { font-size: 12px; color: #999; margin-bottom: 6px; }
.strow { display: flex; justify-content: space-between; gap: 18px; font-size: 14px; }
.stlbl2 { color: #bbb; }
.stval2 { font-weight: bold; }
.stval { font-size: 26px; font-weight: bold; }
.stval3 { font-size: 14px; color: #ddd; padding-right: 12px; }
.stval3l { font-size: 14px; color: #999; }
.stval4 { font-size: 20px; font-weight: bold; }
.stval5 { font-size: 13px; color: #999; }
.ampm, .ampm2 { font-size: 11px; color: #999; padding-left: 3px; }
.stdat { font-size: 12px; color: #bbb; }
.stdatval { float: right; color: #eee; padding-left: 12px; }
.st_red { color: #AE432E; }
.st_yellow { color: #fdae6b; }
.st_green { color: #77AB13; }
.st_interval_box svg, .stead svg { display: block; }
.truth_chart rect { fill: #43A2CA; }
.detected_chart rect { fill: #A8DDB5; }
.segment_chart rect { fill: #7f8485; stroke: #343738; }
.ti_chart rect { fill: #7BCCC4; }
.ti_title { text-align: center; font-size: 11px; padding-top: 6px; color: #bbb; }
.xlabel { font-size: 10px; fill: #999; }
.ead_lbl { font-size: 11px; fill: #222; }
.event_lbl { font-size: 11px; fill: #ddd; }
.ead_D { fill: #AE432E; }
.ead_F { fill: #B5712E; }
.ead_FM { fill: #fdae6b; }
.ead_M { fill: #fdd0a2; }
.ead_C { fill: #77AB13; }
.ead_I { fill: #AE432E; }
.legend_text, .legend_val { font-size: 11px; fill: #ccc; }
.pie_path { stroke: #343738; }
.footer { color: #ccc; font-size: 12px; margin: 24px 12px; }
</style>
"#;

const FOOTER: &str = r#"<p class="footer">For a description of the metrics used here, see:
[1] <b>Ward, J. A., Lukowicz, P., &amp; Gellersen, H. W. (2011). Performance metrics for activity recognition.</b>
ACM Transactions on Intelligent Systems and Technology (TIST), 2(1), 1-23. doi:10.1145/1889681.1889687</p>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::parse_results;

    fn sample_doc() -> ResultsDoc {
        let json = r#"{
            "t": "2011-03-01T10:00:00",
            "stats": {"truth_count": 2, "detected_count": 2, "segment_count": 4},
            "scores": {
                "frame_scores": {
                    "p_rates": {"TPr": 0.8, "Dr": 0.2},
                    "n_rates": {"TNr": 0.9, "Ir": 0.1},
                    "p_rate": 0.4, "n_rate": 0.6
                },
                "event_scores": {
                    "t_counts": {"D": 1, "F": 0, "FM": 0, "M": 0, "C": 1},
                    "d_counts": {"C": 1, "M'": 0, "FM'": 0, "F'": 0, "I'": 1},
                    "t_rates": {"D": 0.5, "C": 0.5},
                    "d_rates": {"I'": 0.5, "C": 0.5}
                }
            },
            "results": [{
                "labels_file": "day1.json",
                "recognizer": "test.Walker",
                "subject": {"age": "27", "gender": "f"},
                "labels": [
                    {"t1": "2011-03-01T08:00:00", "t2": "2011-03-01T08:10:00", "label": "walking"}
                ],
                "detected": [
                    {"t1": "2011-03-01T08:02:00", "t2": "2011-03-01T08:10:00", "label": "walking"}
                ],
                "scores": {
                    "segments": [
                        {"t1": "2011-03-01T08:00:00", "t2": "2011-03-01T08:02:00", "score": "FN", "err": "Us"},
                        {"t1": "2011-03-01T08:02:00", "t2": "2011-03-01T08:10:00", "score": "TP"}
                    ],
                    "frame_score": {
                        "p_rates": {"TPr": 0.8, "Usr": 0.2},
                        "n_rates": {"TNr": 1.0},
                        "p_rate": 0.5, "n_rate": 0.5
                    },
                    "events": {
                        "t_counts": {"D": 0, "F": 0, "FM": 0, "M": 0, "C": 1},
                        "d_counts": {"C": 1, "M'": 0, "FM'": 0, "F'": 0, "I'": 0},
                        "t_rates": {"C": 1.0},
                        "d_rates": {"C": 1.0}
                    }
                },
                "sample_intervals": {
                    "accel": {
                        "count": 10,
                        "intervals": [
                            {"t1": "2011-03-01T08:00:00", "t2": "2011-03-01T08:00:05"}
                        ]
                    }
                }
            }]
        }"#;
        parse_results(json.as_bytes(), false).unwrap()
    }

    #[test]
    fn test_case_chart_renders_three_tracks() {
        let doc = sample_doc();
        let case = &doc.results[0];
        let mapper = case_time_axis(case).unwrap();
        let svg = case_chart_svg(case, &mapper).unwrap();
        assert!(svg.contains("truth_chart"));
        assert!(svg.contains("detected_chart"));
        assert!(svg.contains("segment_chart"));
        assert!(svg.contains("(Ground truth) - walking"));
        assert!(svg.contains("(Segment FN) Us"));
        // TP segment gets the filled style
        assert!(svg.contains("stroke:#343738;fill:#77AB13;"));
    }

    #[test]
    fn test_no_segments_means_no_axis() {
        let mut doc = sample_doc();
        doc.results[0].scores.segments.clear();
        assert!(case_time_axis(&doc.results[0]).is_none());
    }

    #[test]
    fn test_single_instant_span_is_skipped() {
        let mut doc = sample_doc();
        let case = &mut doc.results[0];
        case.scores.segments.truncate(1);
        case.scores.segments[0].t2 = case.scores.segments[0].t1.clone();
        assert!(case_time_axis(case).is_none());
    }

    #[test]
    fn test_ead_svg_contains_labels_and_lines() {
        let doc = sample_doc();
        let (t, d) = doc.scores.event_scores.normalized_counts();
        let layout = EadLayout::compute(&t, &d, EAD_WIDTH).unwrap();
        let svg = ead_svg(&layout);
        assert!(svg.contains("ead ead_D"));
        assert!(svg.contains("D:1"));
        assert!(svg.contains("I&#39;:1") || svg.contains("I':1"));
        assert!(svg.contains("Truth (total=2)"));
        assert!(svg.contains("Detected (total=2)"));
    }

    #[test]
    fn test_pie_svg_skips_empty_rates() {
        assert!(pie_svg("Empty", &BTreeMap::new()).is_none());
        let mut rates = BTreeMap::new();
        rates.insert("TPr".to_string(), Some(1.0));
        let svg = pie_svg("Full", &rates).unwrap();
        // A single full slice renders as a circle
        assert!(svg.contains("<circle"));
        assert!(svg.contains("#77AB13"));
    }

    #[test]
    fn test_dashboard_html_assembles_all_sections() {
        let doc = sample_doc();
        let html = dashboard_html(&doc);
        assert!(html.contains("Performance Overview"));
        assert!(html.contains("Test Time"));
        assert!(html.contains("Case 1:"));
        assert!(html.contains("Event analysis diagram"));
        assert!(html.contains("accel"));
        assert!(html.contains("Ward, J. A."));
        assert!(!html.contains("NaN"));
    }

    #[test]
    fn test_test_time_box_formats_run_timestamp() {
        let html = test_time_box_html("2011-03-01T10:00:00").unwrap();
        assert!(html.contains("Test Time"));
        assert!(html.contains("10:00<span class=\"ampm\">AM</span>"));
        assert!(html.contains("Tuesday"));
        assert!(html.contains(" 1 Mar 2011"));
        // leading zero on the hour is stripped
        let early = test_time_box_html("2011-03-01T08:05:00").unwrap();
        assert!(early.contains(">8:05<span"));
        assert!(test_time_box_html("garbage").is_none());
    }

    #[test]
    fn test_overview_box_shows_label_span_and_subject() {
        let doc = sample_doc();
        let html = overview_box_html(&doc.results[0]).unwrap();
        assert!(html.contains("Overview"));
        assert!(html.contains("8:00<span class=\"ampm2\">AM</span>"));
        assert!(html.contains("- 8:10<span class=\"ampm2\">AM</span>"));
        assert!(html.contains(" 1 Mar 2011"));
        assert!(html.contains("age<span class=\"stdatval\">27</span>"));
        assert!(html.contains("gender<span class=\"stdatval\">f</span>"));

        let mut doc = sample_doc();
        doc.results[0].labels.clear();
        assert!(overview_box_html(&doc.results[0]).is_none());
    }

    #[test]
    fn test_overall_frame_pies_drawn_unless_rate_is_exactly_zero() {
        let mut doc = sample_doc();
        doc.results.clear();
        doc.scores.frame_scores.p_rate = None;
        let html = dashboard_html(&doc);
        assert!(html.contains("stlblpie\">Positive frames (NA)</div>"));

        doc.scores.frame_scores.p_rate = Some(0.0);
        let html = dashboard_html(&doc);
        assert!(!html.contains("stlblpie\">Positive frames"));
        // the negative pie is unaffected
        assert!(html.contains("stlblpie\">Negative frames"));
    }

    #[test]
    fn test_invalid_interval_skips_chart_but_not_page() {
        let mut doc = sample_doc();
        // Reverse a detected interval
        let det = &mut doc.results[0].detected[0];
        std::mem::swap(&mut det.t1, &mut det.t2);
        let case = &doc.results[0];
        let mapper = case_time_axis(case).unwrap();
        assert!(case_chart_svg(case, &mapper).is_none());
        let html = dashboard_html(&doc);
        assert!(html.contains("Case 1:"));
    }
}
