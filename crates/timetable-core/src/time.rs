use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A class start time on the 24-hour clock, always rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassTime {
    hour: u8,
    minute: u8,
}

impl ClassTime {
    /// Build a time, rejecting hours >= 24 and minutes >= 60.
    pub fn new(hour: u8, minute: u8) -> Option<ClassTime> {
        (hour < 24 && minute < 60).then_some(ClassTime { hour, minute })
    }

    /// Const constructor for fixed times; out-of-range parts are clamped to 23:59.
    pub const fn clamped(hour: u8, minute: u8) -> ClassTime {
        ClassTime {
            hour: if hour > 23 { 23 } else { hour },
            minute: if minute > 59 { 59 } else { minute },
        }
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Parse `H:MM`, `HH:MM`, `H.MM` or `HH.MM`.
    ///
    /// The dot form shows up when OCR reads a colon as a period.
    pub fn parse(s: &str) -> Option<ClassTime> {
        let s = s.trim();
        let (h, m) = s.split_once([':', '.'])?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        if !h.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        ClassTime::new(h.parse().ok()?, m.parse().ok()?)
    }
}

impl fmt::Display for ClassTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTime(pub String);

impl fmt::Display for InvalidTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time {:?}, expected HH:MM", self.0)
    }
}

impl std::error::Error for InvalidTime {}

impl FromStr for ClassTime {
    type Err = InvalidTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassTime::parse(s).ok_or_else(|| InvalidTime(s.to_string()))
    }
}

impl TryFrom<String> for ClassTime {
    type Error = InvalidTime;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClassTime> for String {
    fn from(t: ClassTime) -> String {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pads_hour() {
        assert_eq!(ClassTime::parse("9:30").unwrap().to_string(), "09:30");
        assert_eq!(ClassTime::parse("14.05").unwrap().to_string(), "14:05");
        assert_eq!(ClassTime::parse("00:00").unwrap().to_string(), "00:00");
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(ClassTime::parse("24:00").is_none());
        assert!(ClassTime::parse("12:60").is_none());
        assert!(ClassTime::parse("123:00").is_none());
        assert!(ClassTime::parse("9:3").is_none());
        assert!(ClassTime::parse("ab:cd").is_none());
        assert!(ClassTime::parse("").is_none());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut times: Vec<ClassTime> = ["13:00", "9:05", "10:20"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        times.sort();
        let rendered: Vec<String> = times.iter().map(|t| t.to_string()).collect();
        assert_eq!(rendered, vec!["09:05", "10:20", "13:00"]);
    }

    #[test]
    fn test_serde_as_string() {
        let t = ClassTime::new(8, 15).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"08:15\"");
        let back: ClassTime = serde_json::from_str("\"08:15\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<ClassTime>("\"8h15\"").is_err());
    }
}
