use std::collections::HashMap;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use timetable_core::Weekday;

/// Subjects recognized by name, in their display spelling.
pub(crate) static DEFAULT_SUBJECT_LIST: &[&str] = &[
    "Mathematics",
    "Maths",
    "Math",
    "Discrete Mathematics",
    "Linear Algebra",
    "Calculus",
    "Algebra",
    "Geometry",
    "Statistics",
    "Physics",
    "Chemistry",
    "Organic Chemistry",
    "Biology",
    "Botany",
    "Zoology",
    "English",
    "Literature",
    "History",
    "Geography",
    "Civics",
    "Economics",
    "Accounting",
    "Accountancy",
    "Business Studies",
    "Political Science",
    "Philosophy",
    "Psychology",
    "Sociology",
    "Environmental Science",
    "Physical Education",
    "Computer Science",
    "Programming",
    "Data Structures",
    "Algorithms",
    "Operating Systems",
    "Database Systems",
    "Computer Networks",
    "Software Engineering",
    "Machine Learning",
    "Artificial Intelligence",
    "Electronics",
    "Mechanics",
    "Thermodynamics",
    "Engineering Drawing",
    "Engineering Graphics",
    "French",
    "Spanish",
    "German",
    "Hindi",
    "Art",
    "Music",
];

/// Room names that carry no number.
pub(crate) static DEFAULT_NAMED_ROOM_LIST: &[&str] = &[
    "Auditorium",
    "Seminar Hall",
    "Conference Hall",
    "Main Hall",
    "Library",
    "Gymnasium",
    "Playground",
];

/// Tokens that look like subjects to the capital-letters pattern but are not.
pub(crate) static DEFAULT_EXCLUDED_TITLES: &[&str] =
    &["Dr", "Mr", "Mrs", "Ms", "Prof", "Sir", "AM", "PM", "TBD"];

pub(crate) fn default_subject_list() -> Vec<String> {
    DEFAULT_SUBJECT_LIST.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn default_named_room_list() -> Vec<String> {
    DEFAULT_NAMED_ROOM_LIST.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn default_excluded_titles() -> Vec<String> {
    DEFAULT_EXCLUDED_TITLES.iter().map(|s| s.to_string()).collect()
}

pub(crate) static DEFAULT_SUBJECTS: Lazy<SubjectVocabulary> =
    Lazy::new(|| SubjectVocabulary::new(&default_subject_list()).unwrap());

pub(crate) static DEFAULT_NAMED_ROOM_RE: Lazy<Regex> =
    Lazy::new(|| phrase_regex(&default_named_room_list()).unwrap());

/// Room codes such as `L-313`, `B/204`, `CS101` or `LT-2A`.
pub(crate) static ROOM_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z]{1,3}[-/]\d{1,4}[A-Z]?\b|\b[A-Z]{1,3}\d{2,4}[A-Z]?\b").unwrap()
});

/// A bare three-digit room number.
pub(crate) static BARE_ROOM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}\b").unwrap());

/// One or two capitalized words followed by `Lab`, e.g. `Physics Lab`, `DBMS LAB`.
pub(crate) static LAB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:[A-Z][A-Za-z&]*\s+){1,2}(?:Lab|LAB)\b").unwrap());

/// Two or more consecutive capitals standing alone, e.g. `DBMS`, `OOP`.
pub(crate) static CAPS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2,}\b").unwrap());

/// Weekday names and abbreviations as standalone words.
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|thurs|tues|thur|mon|tue|wed|thu|fri|sat|sun)\b",
    )
    .unwrap()
});

/// Full weekday names anywhere in the text.
static FULL_WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)monday|tuesday|wednesday|thursday|friday|saturday|sunday").unwrap()
});

/// Byte spans of weekday tokens in `line`, with the day each one names.
pub(crate) fn weekday_tokens(line: &str) -> Vec<(Range<usize>, Weekday)> {
    WEEKDAY_RE
        .find_iter(line)
        .filter_map(|m| Weekday::from_token(m.as_str()).map(|d| (m.range(), d)))
        .collect()
}

/// The first weekday named on `line`, if any.
pub fn find_weekday(line: &str) -> Option<Weekday> {
    weekday_tokens(line).into_iter().next().map(|(_, d)| d)
}

/// Full weekday names contained in `line`, in order of appearance.
pub(crate) fn full_weekday_names(line: &str) -> Vec<Weekday> {
    FULL_WEEKDAY_RE
        .find_iter(line)
        .filter_map(|m| Weekday::from_token(m.as_str()))
        .collect()
}

/// Build a case-insensitive, word-bounded alternation of `phrases`.
///
/// Longer phrases are tried first so `Discrete Mathematics` beats `Mathematics`.
/// Internal spaces match any run of whitespace. An empty list never matches.
pub(crate) fn phrase_regex(phrases: &[String]) -> Result<Regex, regex::Error> {
    let mut alternatives: Vec<String> = phrases
        .iter()
        .map(|p| p.split_whitespace().collect::<Vec<_>>())
        .filter(|words| !words.is_empty())
        .map(|words| {
            words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    if alternatives.is_empty() {
        return Regex::new(r"\b\B");
    }
    alternatives.sort_by_key(|a| std::cmp::Reverse(a.len()));
    alternatives.dedup();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
}

fn lookup_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A compiled subject keyword list.
#[derive(Debug, Clone)]
pub struct SubjectVocabulary {
    re: Regex,
    canonical: HashMap<String, String>,
}

impl SubjectVocabulary {
    pub fn new(subjects: &[String]) -> Result<Self, regex::Error> {
        let re = phrase_regex(subjects)?;
        let mut canonical = HashMap::new();
        for subject in subjects {
            let display = subject.split_whitespace().collect::<Vec<_>>().join(" ");
            if !display.is_empty() {
                canonical.entry(lookup_key(&display)).or_insert(display);
            }
        }
        Ok(Self { re, canonical })
    }

    /// Display spelling for a matched subject, ignoring case and spacing.
    pub fn canonical(&self, text: &str) -> Option<&str> {
        self.canonical.get(&lookup_key(text)).map(String::as_str)
    }

    /// Subject mentions in `text` as (byte span, display spelling).
    pub(crate) fn find_all<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = (Range<usize>, &'a str)> + 'a {
        self.re
            .find_iter(text)
            .filter_map(move |m| self.canonical(m.as_str()).map(|c| (m.range(), c)))
    }
}
