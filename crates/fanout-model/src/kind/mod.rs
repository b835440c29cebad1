use std::{fmt, num::NonZeroUsize};

use serde::{Deserialize, Serialize};

/// Scheduling strategy of a runner.
///
/// Each variant corresponds to one runner implementation together with the parameters it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum RunnerMode {
    /// Fixed pool of `limit` persistent worker threads.
    Bounded { limit: NonZeroUsize },
    /// One lightweight runtime task per submitted task.
    Unbounded,
}

impl RunnerMode {
    /// Returns a short symbolic identifier for the mode.
    ///
    /// This is primarily intended for logging and metric labels:
    /// - `"bounded"`
    /// - `"unbounded"`
    pub fn label(&self) -> &'static str {
        match self {
            RunnerMode::Bounded { .. } => "bounded",
            RunnerMode::Unbounded => "unbounded",
        }
    }

    /// Upper bound on tasks in flight, `None` when unbounded.
    pub fn limit(&self) -> Option<NonZeroUsize> {
        match self {
            RunnerMode::Bounded { limit } => Some(*limit),
            RunnerMode::Unbounded => None,
        }
    }
}

impl fmt::Display for RunnerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerMode::Bounded { limit } => write!(f, "bounded({limit})"),
            RunnerMode::Unbounded => f.write_str("unbounded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_limits() {
        let limit = NonZeroUsize::new(4).unwrap();
        assert_eq!(RunnerMode::Bounded { limit }.label(), "bounded");
        assert_eq!(RunnerMode::Bounded { limit }.limit(), Some(limit));
        assert_eq!(RunnerMode::Unbounded.label(), "unbounded");
        assert_eq!(RunnerMode::Unbounded.limit(), None);
        assert_eq!(RunnerMode::Bounded { limit }.to_string(), "bounded(4)");
    }

    #[test]
    fn zero_limit_is_rejected_on_the_wire() {
        let res: Result<RunnerMode, _> =
            serde_json::from_str(r#"{ "kind": "bounded", "limit": 0 }"#);
        assert!(res.is_err());
    }
}
