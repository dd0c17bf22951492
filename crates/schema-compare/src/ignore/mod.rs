//! Suppression rules for known differences.
//!
//! A rule has the same fields as a [`CompareLog`] but every field except the
//! verdict can be left open. Rules are usually built by pasting report lines
//! into [`IgnoreRule::parse`].

#[cfg(test)]
mod tests;

use crate::error::{CompareError, CompareResult};
use crate::log::{
    CompareAttribute, CompareLog, CompareState, CompareType, NULL_TEXT, Segment, decode_line,
};

/// The expected/found part of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuleValue {
    /// Matches any value, present or not.
    #[default]
    Wildcard,
    /// Matches only a record whose value is absent (`<null>` in the text form).
    Absent,
    /// Matches only this exact value.
    Present(String),
}

impl RuleValue {
    pub fn present(value: impl Into<String>) -> Self {
        RuleValue::Present(value.into())
    }

    /// Map an optional string: `None` is a wildcard and `"<null>"` means absent.
    pub fn from_option(value: Option<&str>) -> Self {
        match value {
            None => RuleValue::Wildcard,
            Some(NULL_TEXT) => RuleValue::Absent,
            Some(v) => RuleValue::Present(v.to_string()),
        }
    }

    pub fn matches(&self, candidate: Option<&str>) -> bool {
        match self {
            RuleValue::Wildcard => true,
            RuleValue::Absent => candidate.is_none(),
            RuleValue::Present(v) => candidate == Some(v.as_str()),
        }
    }

    fn from_segment(segment: Segment) -> Self {
        match segment {
            Segment::Missing => RuleValue::Wildcard,
            Segment::Null => RuleValue::Absent,
            Segment::Text(text) => RuleValue::Present(text),
        }
    }
}

/// A pattern over comparison records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    kind: CompareType,
    state: CompareState,
    name: Option<String>,
    attribute: CompareAttribute,
    expected: RuleValue,
    found: RuleValue,
}

impl IgnoreRule {
    /// Create a rule matching every record of `kind` with verdict `state`.
    ///
    /// Fails for `Ok` and `Debug`: successful comparisons cannot be suppressed.
    pub fn new(kind: CompareType, state: CompareState) -> CompareResult<Self> {
        if state <= CompareState::Ok {
            return Err(CompareError::Config(format!(
                "cannot ignore records with a verdict of {state} (or lower)"
            )));
        }
        Ok(Self {
            kind,
            state,
            name: None,
            attribute: CompareAttribute::MatchAnything,
            expected: RuleValue::Wildcard,
            found: RuleValue::Wildcard,
        })
    }

    /// Build a rule from a rendered report line.
    ///
    /// Segments missing from the line become wildcards, `<null>` segments
    /// only match absent values.
    pub fn parse(line: &str) -> CompareResult<Self> {
        let decoded = decode_line(line)?;
        let mut rule = Self::new(decoded.kind, decoded.state)?;
        rule.name = decoded.name;
        rule.attribute = decoded.attribute;
        rule.expected = RuleValue::from_segment(decoded.expected);
        rule.found = RuleValue::from_segment(decoded.found);
        Ok(rule)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, attribute: CompareAttribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_expected(mut self, expected: RuleValue) -> Self {
        self.expected = expected;
        self
    }

    pub fn with_found(mut self, found: RuleValue) -> Self {
        self.found = found;
        self
    }

    pub fn kind(&self) -> CompareType {
        self.kind
    }

    pub fn state(&self) -> CompareState {
        self.state
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn attribute(&self) -> CompareAttribute {
        self.attribute
    }

    pub fn expected(&self) -> &RuleValue {
        &self.expected
    }

    pub fn found(&self) -> &RuleValue {
        &self.found
    }

    pub fn matches(&self, log: &CompareLog) -> bool {
        self.state == log.state()
            && (self.kind == CompareType::MatchAnything || self.kind == log.kind())
            && (self.attribute == CompareAttribute::MatchAnything
                || self.attribute == log.attribute())
            && self.name.as_deref().is_none_or(|n| Some(n) == log.name())
            && self.expected.matches(log.expected())
            && self.found.matches(log.found())
    }
}

/// The set of rules consulted before a difference is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    rules: Vec<IgnoreRule>,
}

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: IgnoreRule) {
        self.rules.push(rule);
    }

    /// Parse newline-separated report lines, skipping blank ones.
    pub fn parse_lines(text: &str) -> CompareResult<Self> {
        let mut list = Self::new();
        list.extend_from_lines(text)?;
        Ok(list)
    }

    pub fn extend_from_lines(&mut self, text: &str) -> CompareResult<()> {
        for line in text.split('\n') {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            self.rules.push(IgnoreRule::parse(line)?);
        }
        Ok(())
    }

    /// True when at least one rule matches `log`.
    pub fn should_ignore(&self, log: &CompareLog) -> bool {
        self.rules.iter().any(|rule| rule.matches(log))
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<IgnoreRule> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = IgnoreRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
