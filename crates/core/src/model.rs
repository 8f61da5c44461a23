use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Aggregated build outcome for one commit.
///
/// Records are immutable once fetched and have no stable key beyond their
/// position in the page they arrived in. Every field carries a default so a
/// partially populated backend row still decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSnapshotRecord {
    #[serde(default)]
    pub commit_hash: String,
    /// Commit message.
    #[serde(default)]
    pub description: String,
    /// URL of the source repository.
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub status: BuildStatus,
    /// Time the commit was pushed.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    /// Branch the revision was pushed to.
    #[serde(default)]
    pub branch: String,
    /// Bots that built this commit, in display order.
    #[serde(default)]
    pub builders: Vec<BuilderRecord>,
}

/// A named CI worker and the steps it ran for one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: BuildStatus,
    #[serde(default)]
    pub build_steps: Vec<BuildStepRecord>,
}

/// One unit of work in a builder's execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStepRecord {
    /// Relative order of the step.
    #[serde(default)]
    pub step_number: i64,
    /// Step name, e.g. `clean-src-dir`.
    #[serde(default)]
    pub name: String,
    /// Output text, e.g. `clean-src-dir skipped`.
    #[serde(default)]
    pub text: String,
    /// URL of the log file.
    #[serde(default)]
    pub logs: String,
    #[serde(default, rename = "isStarted")]
    pub is_started: bool,
    #[serde(default, rename = "isFinished")]
    pub is_finished: bool,
}

/// Build status of a snapshot or builder.
///
/// Wire values are matched case-insensitively. Values outside the known set
/// are kept verbatim in [`BuildStatus::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum BuildStatus {
    Passed,
    Failed,
    Lost,
    Running,
    /// Missing, null or empty on the wire.
    #[default]
    Unknown,
    Other(String),
}

impl BuildStatus {
    /// Lower-case wire form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Lost => "lost",
            Self::Running => "running",
            Self::Unknown => "",
            Self::Other(s) => s,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl From<Option<String>> for BuildStatus {
    fn from(raw: Option<String>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Self::Unknown,
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "lost" => Self::Lost,
            "running" => Self::Running,
            _ => Self::Other(raw),
        }
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BuildStatus {
    /// Upper case, the way snapshot headers show it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Commit push time as the backend sends it.
///
/// The datastore-backed endpoint serializes `{ "seconds": .., "nanos": .. }`;
/// other deployments send epoch seconds (possibly fractional) or a
/// preformatted string. Anything else is kept as raw JSON so one odd row
/// never fails the whole page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(i64),
    /// Epoch seconds with a fractional part.
    Fractional(Number),
    Structured {
        seconds: i64,
        #[serde(default)]
        nanos: i32,
    },
    Text(String),
    Unrecognized(Value),
}

impl Timestamp {
    /// Epoch seconds, when the value carries them.
    pub fn seconds(&self) -> Option<i64> {
        match self {
            Self::Epoch(s) => Some(*s),
            Self::Fractional(n) => n.as_f64().map(|f| f.trunc() as i64),
            Self::Structured { seconds, .. } => Some(*seconds),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.seconds(), self) {
            (Some(secs), _) => write!(f, "{secs}"),
            (None, Self::Text(s)) => f.write_str(s),
            (None, _) => Ok(()),
        }
    }
}
