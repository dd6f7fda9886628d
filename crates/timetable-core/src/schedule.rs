use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{ClassTime, CoreError, ScheduleEntry, Weekday};

/// A user's class schedule.
///
/// Entries are only ever appended or removed whole; nothing edits an entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the parsed entries whose `day|time|subject` key is not already present.
    ///
    /// Returns the accepted entries in their original order. Keys accepted earlier
    /// in the same batch count as present, so merging the same batch twice adds
    /// nothing the second time.
    pub fn merge(&mut self, parsed: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
        let mut seen: HashSet<String> = self.entries.iter().map(ScheduleEntry::key).collect();
        let offered = parsed.len();

        let accepted: Vec<ScheduleEntry> = parsed
            .into_iter()
            .filter(|entry| seen.insert(entry.key()))
            .collect();

        tracing::debug!(
            offered,
            accepted = accepted.len(),
            existing = self.entries.len(),
            "merged parsed entries"
        );

        self.entries.extend(accepted.iter().cloned());
        accepted
    }

    /// Add a class by hand. Subject and room must not be blank.
    pub fn add_class(
        &mut self,
        day: Weekday,
        time: ClassTime,
        subject: &str,
        room: &str,
    ) -> Result<ScheduleEntry, CoreError> {
        let subject = subject.trim();
        let room = room.trim();
        if subject.is_empty() {
            return Err(CoreError::Validation("subject must not be empty".into()));
        }
        if room.is_empty() {
            return Err(CoreError::Validation("room must not be empty".into()));
        }
        let entry = ScheduleEntry::new(day, time, subject, room);
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Remove the entry with the given id, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<ScheduleEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Classes held on `day`, earliest first.
    pub fn classes_for_day(&self, day: Weekday) -> Vec<&ScheduleEntry> {
        let mut classes: Vec<&ScheduleEntry> =
            self.entries.iter().filter(|e| e.day == day).collect();
        classes.sort_by_key(|e| e.time);
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u8, m: u8) -> ClassTime {
        ClassTime::new(h, m).unwrap()
    }

    fn physics() -> ScheduleEntry {
        ScheduleEntry::new(Weekday::Monday, at(9, 30), "Physics", "L-313")
    }

    #[test]
    fn test_merge_skips_existing_triple() {
        let mut schedule = Schedule::from_entries(vec![physics()]);
        let accepted = schedule.merge(vec![physics()]);
        assert!(accepted.is_empty());
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_merge_ignores_room_and_id() {
        let mut schedule = Schedule::from_entries(vec![physics()]);
        let moved = ScheduleEntry::new(Weekday::Monday, at(9, 30), "Physics", "B-201");
        assert!(schedule.merge(vec![moved]).is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let batch = vec![
            physics(),
            ScheduleEntry::new(Weekday::Tuesday, at(10, 20), "Chemistry", "TBD"),
        ];
        let mut once = Schedule::new();
        once.merge(batch.clone());

        let mut twice = once.clone();
        let second = twice.merge(batch);
        assert!(second.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_drops_duplicates_within_batch() {
        let mut schedule = Schedule::new();
        let accepted = schedule.merge(vec![physics(), physics()]);
        assert_eq!(accepted.len(), 1);
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_merge_preserves_order() {
        let mut schedule = Schedule::new();
        let batch = vec![
            ScheduleEntry::new(Weekday::Friday, at(14, 0), "Biology", "TBD"),
            ScheduleEntry::new(Weekday::Monday, at(9, 0), "History", "TBD"),
        ];
        let accepted = schedule.merge(batch);
        let subjects: Vec<&str> = accepted.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Biology", "History"]);
    }

    #[test]
    fn test_add_class_validates() {
        let mut schedule = Schedule::new();
        assert!(matches!(
            schedule.add_class(Weekday::Monday, at(9, 0), "  ", "L-1"),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            schedule.add_class(Weekday::Monday, at(9, 0), "Physics", ""),
            Err(CoreError::Validation(_))
        ));
        let entry = schedule
            .add_class(Weekday::Monday, at(9, 0), " Physics ", "L-313")
            .unwrap();
        assert_eq!(entry.subject, "Physics");
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_remove_by_id() {
        let mut schedule = Schedule::new();
        let entry = schedule
            .add_class(Weekday::Monday, at(9, 0), "Physics", "L-313")
            .unwrap();
        assert!(schedule.remove("missing").is_none());
        assert_eq!(schedule.remove(&entry.id).unwrap().subject, "Physics");
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_classes_for_day_sorted_by_time() {
        let schedule = Schedule::from_entries(vec![
            ScheduleEntry::new(Weekday::Monday, at(13, 0), "Biology", "TBD"),
            ScheduleEntry::new(Weekday::Tuesday, at(8, 0), "History", "TBD"),
            ScheduleEntry::new(Weekday::Monday, at(9, 30), "Physics", "L-313"),
        ]);
        let monday: Vec<&str> = schedule
            .classes_for_day(Weekday::Monday)
            .iter()
            .map(|e| e.subject.as_str())
            .collect();
        assert_eq!(monday, vec!["Physics", "Biology"]);
        assert!(schedule.classes_for_day(Weekday::Sunday).is_empty());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let schedule = Schedule::from_entries(vec![physics()]);
        let value = serde_json::to_value(&schedule).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["subject"], "Physics");
    }
}
