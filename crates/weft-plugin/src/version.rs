// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic version and range-constraint model.
//!
//! Every dependency and tier check in the engine bottoms out here. The
//! underlying triple is parsed through the `semver` crate; the constraint
//! operators are local because `^` pins the major and `~` the minor
//! regardless of leading zeros, and `!=` is not part of semver's grammar.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use weft_core::WeftError;

/// An immutable `(major, minor, patch)` version value.
///
/// Ordering is lexicographic on the triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `"major.minor.patch"` with an optional leading `v`.
    ///
    /// Exactly three integer components are required; pre-release and
    /// build metadata are rejected.
    pub fn parse(input: &str) -> Result<Self, WeftError> {
        let malformed = |reason: &str| WeftError::MalformedVersion {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.strip_prefix('v').unwrap_or(input);
        if trimmed.is_empty() {
            return Err(malformed("empty version string"));
        }

        let parsed = semver::Version::parse(trimmed)
            .map_err(|e| malformed(&e.to_string()))?;
        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(malformed("pre-release and build metadata are not supported"));
        }

        Ok(Self {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
        })
    }

    /// Three-way comparison: `-1`, `0`, or `1`.
    pub fn compare(&self, other: &Version) -> i32 {
        match Ord::cmp(self, other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

/// Range-constraint operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Exact match. The default for a bare version string.
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
    /// Same major, version >= anchor.
    Caret,
    /// Same major.minor, version >= anchor.
    Tilde,
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ConstraintOp::Eq => "=",
            ConstraintOp::Gt => ">",
            ConstraintOp::Gte => ">=",
            ConstraintOp::Lt => "<",
            ConstraintOp::Lte => "<=",
            ConstraintOp::Ne => "!=",
            ConstraintOp::Caret => "^",
            ConstraintOp::Tilde => "~",
        };
        f.write_str(symbol)
    }
}

/// An operator plus an anchor version, evaluated against candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub op: ConstraintOp,
    pub version: Version,
}

impl Constraint {
    /// Parse an operator-prefixed constraint; a bare version means `=`.
    pub fn parse(input: &str) -> Result<Self, WeftError> {
        if input.is_empty() {
            return Err(WeftError::MalformedConstraint {
                input: input.to_string(),
                reason: "empty constraint string".to_string(),
            });
        }

        // Two-character operators first so ">=" never parses as ">" + "=...".
        let (op, rest) = if let Some(rest) = input.strip_prefix(">=") {
            (ConstraintOp::Gte, rest)
        } else if let Some(rest) = input.strip_prefix("<=") {
            (ConstraintOp::Lte, rest)
        } else if let Some(rest) = input.strip_prefix("!=") {
            (ConstraintOp::Ne, rest)
        } else if let Some(rest) = input.strip_prefix('>') {
            (ConstraintOp::Gt, rest)
        } else if let Some(rest) = input.strip_prefix('<') {
            (ConstraintOp::Lt, rest)
        } else if let Some(rest) = input.strip_prefix('^') {
            (ConstraintOp::Caret, rest)
        } else if let Some(rest) = input.strip_prefix('~') {
            (ConstraintOp::Tilde, rest)
        } else if let Some(rest) = input.strip_prefix('=') {
            (ConstraintOp::Eq, rest)
        } else {
            (ConstraintOp::Eq, input)
        };

        let version =
            Version::parse(rest.trim()).map_err(|e| WeftError::MalformedConstraint {
                input: input.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { op, version })
    }

    /// Whether the candidate version satisfies this constraint.
    pub fn matches(&self, candidate: &Version) -> bool {
        let anchor = &self.version;
        match self.op {
            ConstraintOp::Eq => candidate == anchor,
            ConstraintOp::Gt => candidate > anchor,
            ConstraintOp::Gte => candidate >= anchor,
            ConstraintOp::Lt => candidate < anchor,
            ConstraintOp::Lte => candidate <= anchor,
            ConstraintOp::Ne => candidate != anchor,
            ConstraintOp::Caret => candidate.major == anchor.major && candidate >= anchor,
            ConstraintOp::Tilde => {
                candidate.major == anchor.major
                    && candidate.minor == anchor.minor
                    && candidate >= anchor
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

impl FromStr for Constraint {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Constraint::parse(s)
    }
}

/// Check a version string against a constraint string in one step.
pub fn check_version(version: &str, constraint: &str) -> Result<bool, WeftError> {
    let v = Version::parse(version)?;
    let c = Constraint::parse(constraint)?;
    Ok(c.matches(&v))
}
