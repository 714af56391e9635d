//! Raw pipeline step shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a step's stdout/stderr should be buffered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capture {
    /// No capture; the stream passes straight through.
    None,
    /// Capture stdout only.
    Stdout,
    /// Capture stderr only.
    Stderr,
    /// Capture both streams independently.
    Both,
}

impl Default for Capture {
    fn default() -> Self {
        Self::None
    }
}

impl Capture {
    /// Returns `true` if this capture setting buffers the given stream.
    #[must_use]
    pub fn captures(self, stream: Stream) -> bool {
        matches!(
            (self, stream),
            (Self::Stdout, Stream::Stdout) | (Self::Stderr, Stream::Stderr) | (Self::Both, _)
        )
    }

    /// Returns `true` if this setting captures any stream at all.
    #[must_use]
    pub fn is_captured(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// One of a step's two output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Stream {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(()),
        }
    }
}

/// A step's failure-handling policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnFail {
    /// Action to take when the step fails. Empty string and `"fail"` are
    /// equivalent (both mean "stop the pipeline").
    #[serde(default)]
    pub action: String,
    /// Total attempts for a `retry` action (must be >= 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<usize>,
    /// Delay between retry attempts, as a duration string (e.g. `"500ms"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
}

/// The three recognised `on_fail.action` values after normalising the
/// empty-string/"fail" alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAction {
    /// Stop the pipeline immediately (the default).
    Fail,
    /// Discard the failure and proceed to the next step.
    Continue,
    /// Re-run the step up to `attempts` times total.
    Retry,
}

impl OnFail {
    /// Resolves `action` to a [`FailAction`], treating `""` as `"fail"`.
    ///
    /// # Errors
    ///
    /// Returns the offending string if it is none of `""`, `"fail"`,
    /// `"continue"`, `"retry"`.
    pub fn resolve(&self) -> Result<FailAction, &str> {
        match self.action.as_str() {
            "" | "fail" => Ok(FailAction::Fail),
            "continue" => Ok(FailAction::Continue),
            "retry" => Ok(FailAction::Retry),
            other => Err(other),
        }
    }
}

/// A single pipeline step in the raw model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStep {
    /// Static identifier. Never templated; required when `capture != none`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Single-string command form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Token-list command form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argv: Option<Vec<String>>,
    /// Working directory override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Environment variable overlay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<HashMap<String, String>>,
    /// What to buffer from this step's output.
    #[serde(default)]
    pub capture: Capture,
    /// Whether a captured stream is also mirrored to the terminal.
    #[serde(default)]
    pub tee: bool,
    /// Raw stdin reference string, `steps.<id>.<stdout|stderr>`, parsed
    /// during raw validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    /// Failure-handling policy.
    #[serde(default)]
    pub on_fail: OnFail,
}

impl RawStep {
    /// Returns the step's command, preferring `argv[0]` when both forms are
    /// somehow present (raw validation rejects that ambiguity; this is only
    /// used after validation has already confirmed exactly one is set).
    #[must_use]
    pub fn has_command(&self) -> bool {
        self.command.is_some() || self.argv.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_both_captures_either_stream() {
        assert!(Capture::Both.captures(Stream::Stdout));
        assert!(Capture::Both.captures(Stream::Stderr));
        assert!(!Capture::None.captures(Stream::Stdout));
        assert!(Capture::Stdout.captures(Stream::Stdout));
        assert!(!Capture::Stdout.captures(Stream::Stderr));
    }

    #[test]
    fn on_fail_resolves_empty_string_to_fail() {
        let on_fail = OnFail::default();
        assert!(matches!(on_fail.resolve(), Ok(FailAction::Fail)));
    }

    #[test]
    fn on_fail_rejects_unknown_action() {
        let on_fail = OnFail {
            action: "ignore".to_string(),
            ..Default::default()
        };
        assert_eq!(on_fail.resolve(), Err("ignore"));
    }
}
