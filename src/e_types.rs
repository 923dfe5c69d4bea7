use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A single pinpointed compiler error inside one source file.
///
/// `code_excerpt` and `pointer` are kept exactly as the compiler printed them,
/// so the caret in `pointer` still lines up with the excerpt above it.
///
/// # Example
/// ```
/// use webber_tools::DiagnosticPlace;
///
/// let place = DiagnosticPlace::new(10, "missing return", "return x", "    ^");
/// assert_eq!(place.line, 10);
/// assert_eq!(place.reason, "missing return");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosticPlace {
    pub line: usize,
    pub reason: String,
    pub code_excerpt: String,
    pub pointer: String,
}

impl DiagnosticPlace {
    pub fn new(
        line: usize,
        reason: impl Into<String>,
        code_excerpt: impl Into<String>,
        pointer: impl Into<String>,
    ) -> Self {
        DiagnosticPlace {
            line,
            reason: reason.into(),
            code_excerpt: code_excerpt.into(),
            pointer: pointer.into(),
        }
    }

    /// Two places are the same issue when line and reason match.
    /// Column and excerpt are not part of the key.
    pub fn same_issue(&self, other: &DiagnosticPlace) -> bool {
        self.issue_key() == other.issue_key()
    }

    fn issue_key(&self) -> (usize, &str) {
        (self.line, self.reason.as_str())
    }
}

/// All errors reported for one source file, ascending by line.
///
/// Only the parser builds these, and it never builds an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiagnostics {
    pub file: PathBuf,
    places: Vec<DiagnosticPlace>,
}

impl FileDiagnostics {
    /// Returns `None` when `places` is empty.
    pub(crate) fn new(file: PathBuf, places: Vec<DiagnosticPlace>) -> Option<Self> {
        if places.is_empty() {
            return None;
        }
        let mut diagnostics = FileDiagnostics {
            file,
            places: Vec::with_capacity(places.len()),
        };
        diagnostics.merge(places);
        Some(diagnostics)
    }

    /// Appends every place whose `(line, reason)` is not present yet and
    /// restores line order. Sorting is stable, so places on the same line
    /// keep the order they were reported in.
    pub(crate) fn merge(&mut self, places: Vec<DiagnosticPlace>) {
        let mut seen: HashSet<(usize, String)> = self
            .places
            .iter()
            .map(|p| (p.line, p.reason.clone()))
            .collect();
        for place in places {
            if seen.insert((place.line, place.reason.clone())) {
                self.places.push(place);
            }
        }
        self.places.sort_by_key(|p| p.line);
    }

    pub fn places(&self) -> &[DiagnosticPlace] {
        &self.places
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Final path component, used to order files in a [`DiagnosticsResult`].
    pub fn display_name(&self) -> String {
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file.display().to_string())
    }
}

/// Parser output, sorted by [`FileDiagnostics::display_name`].
pub type DiagnosticsResult = Vec<FileDiagnostics>;

/// What one toolchain invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Exit status 0, with everything the process wrote to stdout.
    Success(String),
    /// Non-zero exit. `stderr` is only read when `stdout` came back empty.
    Failure {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success(_))
    }

    /// The text that describes a failure: stdout when the toolchain wrote
    /// anything there, stderr otherwise. `None` for successes and for
    /// failures that left both streams empty.
    pub fn failure_text(&self) -> Option<&str> {
        match self {
            BuildOutcome::Success(_) => None,
            BuildOutcome::Failure { stdout, stderr, .. } => {
                if !stdout.is_empty() {
                    Some(stdout)
                } else if !stderr.is_empty() {
                    Some(stderr)
                } else {
                    None
                }
            }
        }
    }
}

/// One rendered preview as printed by a `--previews` run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub module: String,
    #[serde(rename = "class")]
    pub class_name: String,
    /// Base64 encoded HTML.
    pub html: String,
}
