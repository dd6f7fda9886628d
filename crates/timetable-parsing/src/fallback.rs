use timetable_core::{ClassTime, ScheduleEntry, Weekday, text_lines};

use crate::config::ParsingConfig;
use crate::time_slots::bare_times;
use crate::{tokens, vocabulary};

/// Everything the fallback scan saw, deduplicated, in discovery order.
#[derive(Debug, Default)]
struct Sightings {
    subjects: Vec<String>,
    rooms: Vec<String>,
    times: Vec<ClassTime>,
    days: Vec<Weekday>,
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

impl Sightings {
    fn observe(mut self, line: &str, config: &ParsingConfig) -> Self {
        for (_, subject) in config.subjects().find_all(line) {
            push_unique(&mut self.subjects, subject.to_string());
        }
        for room in tokens::find_rooms(line, config) {
            push_unique(&mut self.rooms, room.text);
        }
        for time in bare_times(line) {
            push_unique(&mut self.times, time);
        }
        for day in vocabulary::full_weekday_names(line) {
            push_unique(&mut self.days, day);
        }
        self
    }
}

/// Parse recognized text without relying on its layout.
///
/// Collects known subjects, rooms, times and days from anywhere in the text and
/// spreads the subjects over (days × time slots), a few per day. Days default to
/// Monday–Friday and slots to a fixed set when the text names none. This is a
/// best-effort reconstruction for text the structural parser cannot follow.
pub fn parse_fallback(text: &str) -> Vec<ScheduleEntry> {
    parse_fallback_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`parse_fallback`].
pub(crate) fn parse_fallback_with_config(text: &str, config: &ParsingConfig) -> Vec<ScheduleEntry> {
    let seen = text_lines(text).fold(Sightings::default(), |seen, line| {
        seen.observe(line, config)
    });

    let days = if seen.days.is_empty() {
        Weekday::WORKDAYS.to_vec()
    } else {
        seen.days
    };
    let times: Vec<ClassTime> = if seen.times.is_empty() {
        config.default_slots.clone()
    } else {
        seen.times
    };
    let rooms = seen.rooms;

    let mut subjects = seen.subjects.into_iter();
    let mut entries: Vec<ScheduleEntry> = Vec::new();

    'days: for &day in days.iter().take(config.fallback_max_days) {
        for &time in times
            .iter()
            .take(config.fallback_max_times)
            .take(config.fallback_slots_per_day)
        {
            let Some(subject) = subjects.next() else {
                break 'days;
            };
            let room = if rooms.is_empty() {
                ScheduleEntry::UNASSIGNED_ROOM.to_string()
            } else {
                rooms[entries.len() % rooms.len()].clone()
            };
            entries.push(ScheduleEntry::new(day, time, subject, room));
        }
    }

    tracing::debug!(
        days = days.len(),
        times = times.len(),
        rooms = rooms.len(),
        entries = entries.len(),
        "fallback parse complete"
    );
    entries
}
