use std::collections::BTreeSet;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use timetable_core::ClassTime;

use crate::config::ParsingConfig;

/// A time range like `9:30-10:20`, `09.30 – 10.20` or `11:10—12:00`.
///
/// Only the start is word-bounded: OCR often glues a suffix to the end (`10:50am`).
static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[:.](\d{2})\s*[-–—]\s*(\d{1,2})[:.](\d{2})").unwrap()
});

/// A bare `H:MM` / `HH:MM` time, possibly followed by `am`, `PM` and the like.
static BARE_TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})").unwrap());

fn time_from(caps: &Captures, hour: usize, minute: usize) -> Option<ClassTime> {
    ClassTime::new(caps[hour].parse().ok()?, caps[minute].parse().ok()?)
}

/// Byte spans of every time range on `line`, with the range's start time.
///
/// Ranges whose start is not a valid clock time keep their span but carry `None`.
pub(crate) fn time_ranges(line: &str) -> Vec<(Range<usize>, Option<ClassTime>)> {
    RANGE_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let span = caps.get(0)?.range();
            Some((span, time_from(&caps, 1, 2)))
        })
        .collect()
}

/// Byte spans of all time tokens on `line`: ranges and bare times alike.
pub(crate) fn time_spans(line: &str) -> Vec<Range<usize>> {
    let ranges: Vec<Range<usize>> = time_ranges(line).into_iter().map(|(r, _)| r).collect();
    let mut spans = ranges.clone();
    spans.extend(
        BARE_TIME_RE
            .find_iter(line)
            .map(|m| m.range())
            .filter(|r| !ranges.iter().any(|outer| overlaps(outer, r))),
    );
    spans
}

/// Time tokens on `line` in left-to-right order.
///
/// A range contributes its start time; a bare time outside any range
/// contributes itself. Invalid clock values are dropped.
pub fn time_tokens(line: &str) -> Vec<ClassTime> {
    let ranges = time_ranges(line);
    let mut found: Vec<(usize, ClassTime)> = ranges
        .iter()
        .filter_map(|(span, t)| t.map(|t| (span.start, t)))
        .collect();

    for caps in BARE_TIME_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        let span = whole.range();
        if ranges.iter().any(|(outer, _)| overlaps(outer, &span)) {
            continue;
        }
        if let Some(t) = time_from(&caps, 1, 2) {
            found.push((span.start, t));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, t)| t).collect()
}

/// Every `H:MM` time on `line` in left-to-right order, range ends included.
pub(crate) fn bare_times(line: &str) -> Vec<ClassTime> {
    BARE_TIME_RE
        .captures_iter(line)
        .filter_map(|caps| time_from(&caps, 1, 2))
        .collect()
}

/// Start times from the first line carrying at least `min_ranges` time ranges.
///
/// Duplicates are dropped, first occurrence wins.
pub fn detect_header_slots<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    min_ranges: usize,
) -> Option<Vec<ClassTime>> {
    lines.into_iter().find_map(|line| {
        let ranges = time_ranges(line);
        if ranges.len() < min_ranges.max(1) {
            return None;
        }
        let mut slots: Vec<ClassTime> = Vec::with_capacity(ranges.len());
        for t in ranges.into_iter().filter_map(|(_, t)| t) {
            if !slots.contains(&t) {
                slots.push(t);
            }
        }
        Some(slots)
    })
}

/// Infer the time slots shared by every day in one parse.
///
/// Uses the header row when there is one; otherwise every time token in the
/// text, deduplicated and sorted.
pub fn infer_time_slots(lines: &[&str]) -> Vec<ClassTime> {
    infer_time_slots_with_config(lines, &ParsingConfig::default())
}

/// Config-aware version of [`infer_time_slots`].
pub(crate) fn infer_time_slots_with_config(
    lines: &[&str],
    config: &ParsingConfig,
) -> Vec<ClassTime> {
    if let Some(slots) = detect_header_slots(lines.iter().copied(), config.header_min_ranges) {
        tracing::debug!(slots = slots.len(), "time slots from header row");
        return slots;
    }

    let slots: BTreeSet<ClassTime> = lines.iter().flat_map(|l| time_tokens(l)).collect();
    tracing::debug!(slots = slots.len(), "no header row, time slots from loose tokens");
    slots.into_iter().collect()
}

pub(crate) fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
