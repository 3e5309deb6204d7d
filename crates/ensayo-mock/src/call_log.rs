//! Per-method invocation history.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rule::ArgMatcher;

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallOutcome {
    /// Still running; a call observed from inside itself or a re-entrant call.
    Pending,
    /// Returned a value.
    Returned(Value),
    /// Raised an error with this message.
    Raised(String),
}

impl CallOutcome {
    /// Returned value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Returned(v) => Some(v),
            Self::Pending | Self::Raised(_) => None,
        }
    }

    /// Returns true if the call raised.
    #[must_use]
    pub const fn is_raised(&self) -> bool {
        matches!(self, Self::Raised(_))
    }

    /// Returns true if the call has not finished.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// One invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Arguments as passed.
    pub args: Vec<Value>,
    /// Result of the call.
    pub outcome: CallOutcome,
    /// Surface-wide entry order, starting at 0.
    pub sequence: u64,
    /// Wall-clock entry time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

/// Ordered invocations of one method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallLog {
    records: Vec<CallRecord>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: CallRecord) {
        self.records.push(record);
    }

    /// Fills in the outcome of the call entered as `sequence`. Returns
    /// false if the record is gone (the log was reset meanwhile).
    pub(crate) fn complete(&mut self, sequence: u64, outcome: CallOutcome) -> bool {
        match self.records.iter_mut().rev().find(|r| r.sequence == sequence) {
            Some(record) => {
                record.outcome = outcome;
                true
            }
            None => false,
        }
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the method was never called.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in call order.
    #[must_use]
    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    /// Iterates records in call order.
    pub fn iter(&self) -> std::slice::Iter<'_, CallRecord> {
        self.records.iter()
    }

    /// The `index`-th call.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CallRecord> {
        self.records.get(index)
    }

    /// The most recent call.
    #[must_use]
    pub fn last(&self) -> Option<&CallRecord> {
        self.records.last()
    }

    /// Argument lists in call order.
    #[must_use]
    pub fn args(&self) -> Vec<&[Value]> {
        self.records.iter().map(|r| r.args.as_slice()).collect()
    }

    /// Number of calls whose arguments satisfy `matcher`.
    #[must_use]
    pub fn count_matching(&self, matcher: &ArgMatcher) -> usize {
        self.records.iter().filter(|r| matcher.matches(&r.args)).count()
    }
}

impl<'a> IntoIterator for &'a CallLog {
    type Item = &'a CallRecord;
    type IntoIter = std::slice::Iter<'a, CallRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
