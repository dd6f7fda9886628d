use std::ops::Range;

use regex::Regex;

use crate::config::ParsingConfig;
use crate::time_slots::{overlaps, time_spans};
use crate::vocabulary::{self, BARE_ROOM_RE, CAPS_RE, LAB_RE};

/// A token found on a line, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub span: Range<usize>,
    pub text: String,
}

/// Blank out `spans` so later patterns cannot match across them.
///
/// Byte offsets are preserved, so spans found in the result index the original line.
fn mask(line: &str, spans: &[Range<usize>]) -> String {
    line.char_indices()
        .flat_map(|(i, c)| {
            let hidden = spans.iter().any(|s| s.contains(&i));
            let (ch, n) = if hidden { (' ', c.len_utf8()) } else { (c, 1) };
            std::iter::repeat_n(ch, n)
        })
        .collect()
}

fn squash_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Take matches in priority order, skipping any that overlap one already taken.
fn claim(taken: &mut Vec<Token>, candidates: impl IntoIterator<Item = Token>) {
    for candidate in candidates {
        if !taken.iter().any(|t| overlaps(&t.span, &candidate.span)) {
            taken.push(candidate);
        }
    }
}

fn regex_tokens<'a>(re: &'a Regex, text: &'a str) -> impl Iterator<Item = Token> + 'a {
    re.find_iter(text).map(|m| Token {
        span: m.range(),
        text: squash_spaces(m.as_str()),
    })
}

/// Room tokens on `line`, left to right.
///
/// Room codes win over named rooms, which win over bare three-digit numbers.
pub(crate) fn find_rooms(line: &str, config: &ParsingConfig) -> Vec<Token> {
    let masked = mask(line, &time_spans(line));
    let mut taken = Vec::new();
    claim(&mut taken, regex_tokens(config.room_code_re(), &masked));
    claim(&mut taken, regex_tokens(config.named_room_re(), &masked));
    claim(&mut taken, regex_tokens(&BARE_ROOM_RE, &masked));
    taken.sort_by_key(|t| t.span.start);
    taken
}

/// Subject tokens on `line`, left to right.
///
/// Weekday names, times and the given room tokens are never part of a subject.
/// `X Lab` phrases win over vocabulary subjects, which win over capital-letter runs.
pub(crate) fn find_subjects(line: &str, rooms: &[Token], config: &ParsingConfig) -> Vec<String> {
    let mut blocked: Vec<Range<usize>> = vocabulary::weekday_tokens(line)
        .into_iter()
        .map(|(span, _)| span)
        .collect();
    blocked.extend(time_spans(line));
    blocked.extend(rooms.iter().map(|r| r.span.clone()));
    let masked = mask(line, &blocked);

    let mut taken = Vec::new();
    claim(&mut taken, regex_tokens(&LAB_RE, &masked));
    claim(
        &mut taken,
        config.subjects().find_all(&masked).map(|(span, name)| Token {
            span,
            text: name.to_string(),
        }),
    );
    claim(&mut taken, regex_tokens(&CAPS_RE, &masked));
    taken.sort_by_key(|t| t.span.start);

    taken
        .into_iter()
        .map(|t| t.text)
        .filter(|s| s.chars().count() >= 2 && !config.is_excluded_title(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParsingConfigBuilder;

    fn rooms(line: &str) -> Vec<String> {
        find_rooms(line, &ParsingConfig::default())
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    fn subjects(line: &str) -> Vec<String> {
        let config = ParsingConfig::default();
        let found = find_rooms(line, &config);
        find_subjects(line, &found, &config)
    }

    #[test]
    fn test_mask_preserves_offsets() {
        let line = "Mon–Physics";
        let masked = mask(line, &[0..3]);
        assert_eq!(masked.len(), line.len());
        assert!(masked.starts_with("   –"));
    }

    #[test]
    fn test_rooms_by_priority_and_position() {
        assert_eq!(
            rooms("Physics 204 L-313 Seminar Hall"),
            vec!["204", "L-313", "Seminar Hall"]
        );
    }

    #[test]
    fn test_rooms_ignore_times() {
        assert!(rooms("9:30-10:20 10:20-11:10").is_empty());
    }

    #[test]
    fn test_subjects_skip_day_and_room() {
        assert_eq!(subjects("Monday Physics L-313"), vec!["Physics"]);
        assert_eq!(subjects("MON PHYSICS CHEM LH-201"), vec!["Physics", "CHEM"]);
    }

    #[test]
    fn test_subjects_lab_phrase_wins() {
        assert_eq!(
            subjects("Tuesday Physics Lab Chemistry"),
            vec!["Physics Lab", "Chemistry"]
        );
    }

    #[test]
    fn test_subjects_exclude_titles_and_short() {
        assert_eq!(subjects("Wed DR PROF DBMS A"), vec!["DBMS"]);
        assert_eq!(subjects("Thu 10:00 AM OOP"), vec!["OOP"]);
    }

    #[test]
    fn test_subjects_custom_vocabulary() {
        let config = ParsingConfigBuilder::new()
            .add_subject("Robotics".to_string())
            .build()
            .unwrap();
        let found = find_rooms("Fri robotics B-12", &config);
        assert_eq!(find_subjects("Fri robotics B-12", &found, &config), vec!["Robotics"]);
    }

    #[test]
    fn test_custom_room_code_pattern_replaces_default() {
        let config = ParsingConfigBuilder::new()
            .room_code_regex(r"\bRM\d+\b")
            .build()
            .unwrap();
        let found: Vec<String> = find_rooms("Physics RM7 L-31", &config)
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(found, vec!["RM7"]);
        assert_eq!(rooms("Physics RM7 L-31"), vec!["L-31"]);
    }

    #[test]
    fn test_replaced_excluded_titles_keep_subjects() {
        let config = ParsingConfigBuilder::new()
            .set_excluded_titles(vec!["HOD".to_string()])
            .build()
            .unwrap();
        let found = find_rooms("Monday DR HOD", &config);
        assert_eq!(find_subjects("Monday DR HOD", &found, &config), vec!["DR"]);
        assert_eq!(subjects("Monday DR HOD"), vec!["HOD"]);
    }
}
