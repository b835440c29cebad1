use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a single task inside a batch.
///
/// Ids are chosen by the caller and are not required to be unique; runners only use them for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<TaskId> for u64 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed() {
        assert_eq!(TaskId::from(7).to_string(), "task-7");
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&TaskId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
