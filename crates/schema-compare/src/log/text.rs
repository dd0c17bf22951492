//! Parsing of the single-line record format produced by `CompareLog`'s `Display`.

use super::{CompareAttribute, CompareLog, CompareState, CompareType};
use crate::error::{CompareError, CompareResult};

/// Token rendered in place of a missing expected/found value.
pub const NULL_TEXT: &str = "<null>";

const EXPECTED_MARKER: &str = ". Expected = ";
const FOUND_AFTER_EXPECTED: &str = ", found = ";
const FOUND_MARKER: &str = ". Found = ";

/// How a value segment appeared in a rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// The marker is not in the line at all.
    Missing,
    /// The marker is present with `<null>` or nothing after it.
    Null,
    Text(String),
}

impl Segment {
    fn from_text(text: &str) -> Self {
        if text.is_empty() || text == NULL_TEXT {
            Segment::Null
        } else {
            Segment::Text(text.to_string())
        }
    }

    pub(crate) fn into_option(self) -> Option<String> {
        match self {
            Segment::Text(text) => Some(text),
            Segment::Missing | Segment::Null => None,
        }
    }
}

/// A rendered line split into its parts, keeping track of absent segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecodedLine {
    pub state: CompareState,
    pub kind: CompareType,
    pub name: Option<String>,
    pub attribute: CompareAttribute,
    pub expected: Segment,
    pub found: Segment,
}

/// Split a rendered line into its parts.
///
/// An ancestor prefix (`Book->Property`) is tolerated: the kind is whatever
/// follows the last `->`. Trailing spaces belong to the last value and are
/// kept; only the line terminator is dropped.
pub(crate) fn decode_line(line: &str) -> CompareResult<DecodedLine> {
    let line = line.trim_start().trim_end_matches(['\r', '\n']);

    let (state, rest) = match line.split_once(": ") {
        Some((head, rest)) => {
            let state = CompareState::from_words(head)
                .ok_or_else(|| CompareError::parse(line, format!("unknown verdict '{head}'")))?;
            (state, rest)
        }
        None => (CompareState::ALL[0], line),
    };

    let (kind_text, name, tail) = match rest.split_once('\'') {
        Some((kind_text, after)) => match after.split_once('\'') {
            Some((name, tail)) => (kind_text, name, tail),
            None => (kind_text, after, ""),
        },
        None => (rest, "", ""),
    };

    let kind_text = kind_text.rsplit("->").next().unwrap_or_default().trim();
    let kind = if kind_text.is_empty() {
        CompareType::ALL[0]
    } else {
        CompareType::from_words(kind_text)
            .ok_or_else(|| CompareError::parse(line, format!("unknown kind '{kind_text}'")))?
    };

    let (attribute_text, values) = match tail.strip_prefix(", ") {
        Some(after) => {
            let end = [after.find(EXPECTED_MARKER), after.find(FOUND_MARKER)]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(after.len());
            (&after[..end], &after[end..])
        }
        None => ("", tail),
    };
    let attribute = if attribute_text.trim().is_empty() {
        CompareAttribute::NotSet
    } else {
        CompareAttribute::from_words(attribute_text).ok_or_else(|| {
            CompareError::parse(line, format!("unknown attribute '{attribute_text}'"))
        })?
    };

    let mut expected = Segment::Missing;
    let mut found = Segment::Missing;
    if let Some(after) = values.strip_prefix(EXPECTED_MARKER) {
        match after.split_once(FOUND_AFTER_EXPECTED) {
            Some((exp, fnd)) => {
                expected = Segment::from_text(exp);
                found = Segment::from_text(fnd);
            }
            None => expected = Segment::from_text(after),
        }
    } else if let Some(after) = values.strip_prefix(FOUND_MARKER) {
        found = Segment::from_text(after);
    }

    Ok(DecodedLine {
        state,
        kind,
        name: (!name.is_empty()).then(|| name.to_string()),
        attribute,
        expected,
        found,
    })
}

impl CompareLog {
    /// Parse a line rendered by `Display` (or by [`all_errors`](super::all_errors)).
    ///
    /// A missing value segment and `<null>` both become `None`.
    pub fn parse(line: &str) -> CompareResult<CompareLog> {
        let decoded = decode_line(line)?;
        Ok(CompareLog::new(
            decoded.kind,
            decoded.state,
            decoded.name,
            decoded.attribute,
            decoded.expected.into_option(),
            decoded.found.into_option(),
        ))
    }
}
