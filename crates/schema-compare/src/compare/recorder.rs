use crate::ignore::IgnoreList;
use crate::log::{CompareAttribute, CompareLog, CompareState, CompareType};
use crate::normalize::NameMatch;

/// Collects the child records of one node.
///
/// Every non-`Ok` record passes through the ignore list first; suppressed
/// records are dropped and do not count as errors.
pub(crate) struct Recorder<'a> {
    ignore: &'a IgnoreList,
    names: NameMatch,
    logs: Vec<CompareLog>,
    has_errors: bool,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(ignore: &'a IgnoreList, names: NameMatch) -> Self {
        Self {
            ignore,
            names,
            logs: Vec::new(),
            has_errors: false,
        }
    }

    /// An empty recorder for the children of a node about to be added here.
    pub(crate) fn child(&self) -> Recorder<'a> {
        Recorder::new(self.ignore, self.names)
    }

    /// Add `node` with the records of `children` below it.
    pub(crate) fn push_node(&mut self, node: CompareLog, children: Recorder<'a>) {
        self.has_errors |= children.has_errors;
        self.logs.push(node.with_sub_logs(children.logs));
    }

    pub(crate) fn ok(&mut self, kind: CompareType, name: &str, expected: Option<&str>) {
        self.logs
            .push(CompareLog::ok(kind, name, expected.map(str::to_string)));
    }

    /// Add a difference unless it is ignored. Returns whether it was kept.
    pub(crate) fn record(&mut self, log: CompareLog) -> bool {
        if self.ignore.should_ignore(&log) {
            tracing::debug!(target: "schema_compare", record = %log, "ignored");
            return false;
        }
        self.has_errors = true;
        self.logs.push(log);
        true
    }

    /// Record `Different` when the values do not match under the name policy.
    pub(crate) fn check_different(
        &mut self,
        kind: CompareType,
        name: &str,
        attribute: CompareAttribute,
        expected: Option<&str>,
        found: Option<&str>,
    ) -> bool {
        if self.names.values_match(expected, found) {
            return false;
        }
        self.record(CompareLog::new(
            kind,
            CompareState::Different,
            Some(name.to_string()),
            attribute,
            expected.map(str::to_string),
            found.map(str::to_string),
        ))
    }

    pub(crate) fn not_in_database(
        &mut self,
        kind: CompareType,
        name: &str,
        attribute: CompareAttribute,
        expected: &str,
    ) -> bool {
        self.record(CompareLog::new(
            kind,
            CompareState::NotInDatabase,
            Some(name.to_string()),
            attribute,
            Some(expected.to_string()),
            None,
        ))
    }

    pub(crate) fn extra_in_database(
        &mut self,
        kind: CompareType,
        name: &str,
        attribute: CompareAttribute,
        found: Option<&str>,
    ) -> bool {
        self.record(CompareLog::new(
            kind,
            CompareState::ExtraInDatabase,
            Some(name.to_string()),
            attribute,
            None,
            found.map(str::to_string),
        ))
    }

    /// Something that exists in the model but cannot be compared.
    pub(crate) fn not_checked(
        &mut self,
        kind: CompareType,
        name: &str,
        attribute: CompareAttribute,
    ) -> bool {
        self.record(CompareLog::new(
            kind,
            CompareState::NotChecked,
            Some(name.to_string()),
            attribute,
            None,
            Some(name.to_string()),
        ))
    }

    pub(crate) fn finish(self) -> (Vec<CompareLog>, bool) {
        (self.logs, self.has_errors)
    }
}
