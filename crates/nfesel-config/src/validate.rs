//! Directory validator and aggregated validation report.
//!
//! # Design
//! - Checks never touch the filesystem beyond metadata probes.
//! - Problems are accumulated so the operator sees every issue in one pass.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Minimum number of digits in a normalised target identifier.
pub const MIN_IDENTIFIER_DIGITS: usize = 14;

const IDENTIFIER_SEPARATORS: [char; 3] = ['.', '/', '-'];

/// Which side of the copy a directory sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryRole {
    /// Directory scanned for documents.
    Source,
    /// Root of the copy target tree.
    Destination,
}

impl DirectoryRole {
    /// Lowercase role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Destination => "destination",
        }
    }

    const fn purpose(self) -> &'static str {
        match self {
            Self::Source => "that will be scanned for the carrier's NF-e documents",
            Self::Destination => "where the carrier's NF-e documents will be copied",
        }
    }

    const fn example(self) -> &'static str {
        match self {
            Self::Source => "F:\\Arquivos\\Notas Fiscais\\GM Sao Mateus",
            Self::Destination => "F:\\Arquivos\\Notas Fiscais\\Transportadora BR",
        }
    }
}

/// One configuration problem, tied to the property that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationProblem {
    /// Property name the problem refers to.
    pub field: String,
    /// Operator-facing description of the problem.
    pub message: String,
}

/// Every problem found while validating a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    problems: Vec<ValidationProblem>,
}

impl ValidationReport {
    /// Construct an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `problem` when present.
    pub fn record(&mut self, problem: Option<ValidationProblem>) {
        if let Some(problem) = problem {
            self.problems.push(problem);
        }
    }

    /// Whether no problem has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Recorded problems in discovery order.
    #[must_use]
    pub fn problems(&self) -> &[ValidationProblem] {
        &self.problems
    }

    /// Whether a problem was recorded for `field`.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.problems.iter().any(|problem| problem.field == field)
    }
}

impl Display for ValidationReport {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        for (index, problem) in self.problems.iter().enumerate() {
            if index > 0 {
                formatter.write_str("\n")?;
            }
            formatter.write_str(&problem.message)?;
        }
        Ok(())
    }
}

/// Check that `path` is non-empty, exists and is a directory.
///
/// Returns `None` when the directory is usable; otherwise a problem tagged
/// with `role`. `field` and `origin` name the property and the configuration
/// source in the message.
#[must_use]
pub fn validate_directory(
    path: Option<&str>,
    field: &str,
    role: DirectoryRole,
    origin: &str,
) -> Option<ValidationProblem> {
    let problem = |message: String| {
        Some(ValidationProblem {
            field: field.to_string(),
            message,
        })
    };

    let Some(path) = path.map(str::trim).filter(|path| !path.is_empty()) else {
        return problem(format!(
            "property \"{field}\" is missing or empty in {origin}; set the {} directory {} (e.g. {})",
            role.as_str().to_uppercase(),
            role.purpose(),
            role.example(),
        ));
    };

    let candidate = Path::new(path);
    if !candidate.exists() {
        return problem(format!(
            "{} directory \"{path}\" does not exist; if the path is correct, create the directory and try again",
            role.as_str().to_uppercase(),
        ));
    }
    if !candidate.is_dir() {
        return problem(format!(
            "{} directory \"{path}\" is a file instead of a folder; a folder path is required",
            role.as_str().to_uppercase(),
        ));
    }
    None
}

/// Strip `.`, `/` and `-` separators (and surrounding whitespace) from an identifier.
#[must_use]
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !IDENTIFIER_SEPARATORS.contains(ch))
        .collect()
}
