//! Parser for the exported interaction log and similarity catalog.
//!
//! Both files use the `::` separator, one record per line:
//! - actions.dat: userId::eventId::weight::timestamp
//! - similarities.dat: eventA::eventB::score
//!
//! Blank lines are skipped. Anything else that does not parse is reported
//! with its file name and line number.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

const SEPARATOR: &str = "::";

/// Read a whole file, mapping a missing file to `FileNotFound`
fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Splits one line and hands out typed fields with positional error context
struct LineFields<'a> {
    file: &'a str,
    line: usize,
    parts: std::str::Split<'a, &'static str>,
}

impl<'a> LineFields<'a> {
    fn new(file: &'a str, line: usize, text: &'a str) -> Self {
        Self {
            file,
            line,
            parts: text.split(SEPARATOR),
        }
    }

    fn error(&self, reason: String) -> DataLoadError {
        DataLoadError::ParseError {
            file: self.file.to_string(),
            line: self.line,
            reason,
        }
    }

    fn next<T>(&mut self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self
            .parts
            .next()
            .ok_or_else(|| self.error(format!("Missing {}", name)))?;
        raw.trim()
            .parse()
            .map_err(|e| self.error(format!("Invalid {}: {}", name, e)))
    }

    fn finish(mut self) -> Result<()> {
        match self.parts.next() {
            Some(extra) => Err(self.error(format!("Unexpected trailing field: {}", extra))),
            None => Ok(()),
        }
    }
}

/// Parse the actions.dat file
///
/// Format: userId::eventId::weight::timestamp
pub fn parse_actions(path: &Path) -> Result<Vec<UserAction>> {
    let content = read_file(path)?;
    let mut actions = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let mut fields = LineFields::new("actions.dat", idx + 1, line_trimmed);
        let action = UserAction {
            user_id: fields.next("userId")?,
            event_id: fields.next("eventId")?,
            weight: fields.next("weight")?,
            timestamp: fields.next("timestamp")?,
        };
        fields.finish()?;

        actions.push(action);
    }
    Ok(actions)
}

/// Parse the similarities.dat file
///
/// Format: eventA::eventB::score
pub fn parse_similarities(path: &Path) -> Result<Vec<EventSimilarity>> {
    let content = read_file(path)?;
    let mut similarities = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let mut fields = LineFields::new("similarities.dat", idx + 1, line_trimmed);
        let similarity = EventSimilarity {
            event_a: fields.next("eventA")?,
            event_b: fields.next("eventB")?,
            score: fields.next("score")?,
        };
        fields.finish()?;

        similarities.push(similarity);
    }
    Ok(similarities)
}
