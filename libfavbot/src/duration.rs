//! Human-readable durations for log messages
//!
//! Turns a number of seconds into phrases like "1 hour, 1 minute and 1 second".

use std::fmt;

/// Units in descending order with their size in seconds
const UNITS: [(&str, u64); 5] = [
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

/// A duration decomposed into non-zero `(count, unit)` pairs
///
/// Never empty: a zero duration holds the single pair `(0, "second")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationPhrase {
    parts: Vec<(u64, &'static str)>,
}

impl DurationPhrase {
    pub fn from_seconds(seconds: u64) -> Self {
        let mut remaining = seconds;
        let mut parts = Vec::new();

        for (name, size) in UNITS {
            let count = remaining / size;
            if count > 0 {
                parts.push((count, name));
            }
            remaining %= size;
        }

        if parts.is_empty() {
            parts.push((0, "second"));
        }

        Self { parts }
    }

    pub fn parts(&self) -> &[(u64, &'static str)] {
        &self.parts
    }
}

impl fmt::Display for DurationPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .map(|(count, unit)| {
                let plural = if *count == 1 { "" } else { "s" };
                format!("{} {}{}", count, unit, plural)
            })
            .collect();

        match rendered.split_last() {
            Some((last, [])) => f.write_str(last),
            Some((last, rest)) => write!(f, "{} and {}", rest.join(", "), last),
            None => Ok(()),
        }
    }
}

/// Format a number of seconds as a human-readable phrase
pub fn format_duration(seconds: u64) -> String {
    DurationPhrase::from_seconds(seconds).to_string()
}
