use timetable_core::{ClassTime, RecognizedText, Schedule, ScheduleEntry, text_lines};

use crate::config::ParsingConfig;
use crate::{fallback, structural, time_slots};

/// Which parser produced an [`Extraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Structural,
    Fallback,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Structural => f.write_str("structural"),
            Strategy::Fallback => f.write_str("fallback"),
        }
    }
}

/// Result of running the extraction pipeline on one text.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub entries: Vec<ScheduleEntry>,
    pub strategy: Strategy,
    /// How many entries the structural parser found, whether or not they were used.
    pub primary_count: usize,
}

/// A configurable timetable extraction pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use [`TimetableExtractor::with_config`]
/// to supply custom vocabularies and thresholds.
pub struct TimetableExtractor {
    config: ParsingConfig,
}

impl Default for TimetableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParsingConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Infer the shared time slots of a text.
    pub fn time_slots(&self, text: &str) -> Vec<ClassTime> {
        let lines: Vec<&str> = text_lines(text).collect();
        time_slots::infer_time_slots_with_config(&lines, &self.config)
    }

    /// Run only the structural parser.
    pub fn parse_structural(&self, text: &str) -> Vec<ScheduleEntry> {
        structural::parse_structural_with_config(text, &self.config)
    }

    /// Run only the fallback parser.
    pub fn parse_fallback(&self, text: &str) -> Vec<ScheduleEntry> {
        fallback::parse_fallback_with_config(text, &self.config)
    }

    /// Run the full pipeline: structural first, fallback when it finds too little.
    pub fn extract(&self, text: &str) -> Extraction {
        let primary = self.parse_structural(text);
        let primary_count = primary.len();

        if primary_count >= self.config.min_primary_entries {
            tracing::debug!(entries = primary_count, "structural parse accepted");
            return Extraction {
                entries: primary,
                strategy: Strategy::Structural,
                primary_count,
            };
        }

        let entries = self.parse_fallback(text);
        tracing::debug!(
            primary = primary_count,
            threshold = self.config.min_primary_entries,
            entries = entries.len(),
            "structural parse too sparse, used fallback"
        );
        Extraction {
            entries,
            strategy: Strategy::Fallback,
            primary_count,
        }
    }

    pub fn extract_recognized(&self, text: &RecognizedText) -> Extraction {
        self.extract(text.as_str())
    }

    /// Extract entries from `text` and merge them into `schedule`.
    ///
    /// Returns the entries that were actually added.
    pub fn import_into(&self, schedule: &mut Schedule, text: &str) -> Vec<ScheduleEntry> {
        let extraction = self.extract(text);
        schedule.merge(extraction.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParsingConfigBuilder;
    use timetable_core::Weekday;

    const TABLE: &str = "\
        9:30-10:20 10:20-11:10 11:10-12:00\n\
        Monday Physics L-313 Chemistry L-314\n\
        Tuesday Mathematics Biology\n";

    #[test]
    fn test_structural_accepted_at_threshold() {
        let extraction = TimetableExtractor::new().extract(TABLE);
        assert_eq!(extraction.strategy, Strategy::Structural);
        assert_eq!(extraction.primary_count, 4);
        assert_eq!(extraction.entries.len(), 4);
    }

    #[test]
    fn test_sparse_structural_falls_back() {
        let extraction = TimetableExtractor::new().extract("Monday Physics\nnoise Chemistry");
        assert_eq!(extraction.strategy, Strategy::Fallback);
        assert_eq!(extraction.primary_count, 2);
        let subjects: Vec<&str> = extraction.entries.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Physics", "Chemistry"]);
        assert!(extraction.entries.iter().all(|e| e.day == Weekday::Monday));
    }

    #[test]
    fn test_threshold_configurable() {
        let config = ParsingConfigBuilder::new()
            .min_primary_entries(5)
            .build()
            .unwrap();
        let extractor = TimetableExtractor::with_config(config);
        assert_eq!(extractor.config().min_primary_entries(), 5);
        let extraction = extractor.extract(TABLE);
        assert_eq!(extraction.strategy, Strategy::Fallback);
        assert_eq!(extraction.primary_count, 4);
    }

    #[test]
    fn test_import_into_is_idempotent() {
        let extractor = TimetableExtractor::new();
        let mut schedule = Schedule::new();
        let first = extractor.import_into(&mut schedule, TABLE);
        assert_eq!(first.len(), 4);
        let second = extractor.import_into(&mut schedule, TABLE);
        assert!(second.is_empty());
        assert_eq!(schedule.len(), 4);
    }

    #[test]
    fn test_time_slots_step() {
        let slots = TimetableExtractor::new().time_slots(TABLE);
        let slots: Vec<String> = slots.iter().map(|t| t.to_string()).collect();
        assert_eq!(slots, vec!["09:30", "10:20", "11:10"]);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Structural.to_string(), "structural");
        assert_eq!(Strategy::Fallback.to_string(), "fallback");
    }
}
