//! Semantic version and npm-style range types.
//!
//! `Version` follows the semantic versioning specification. `VersionReq`
//! understands the range grammar used in package.json files (`||` unions,
//! hyphen ranges, X-ranges, caret and tilde shorthands) and always counts
//! prerelease versions as candidates: `1.1.0-beta.1` satisfies `>= 1`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic version (major.minor.patch-prerelease+build)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

/// Version range (`^1.0.0`, `~2.3`, `>= 1.9.0 < 2.0.0`, `1 || 2`)
///
/// Stored in desugared form: a union of comparator sets, each an
/// intersection of primitive comparators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    pub sets: Vec<ComparatorSet>,
}

/// Intersection of comparators; an empty set matches every version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparatorSet {
    pub comparators: Vec<Comparator>,
}

/// Individual version comparator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub version: Version,
}

/// Primitive comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Exact,     // =1.0.0
    Greater,   // >1.0.0
    GreaterEq, // >=1.0.0
    Less,      // <1.0.0
    LessEq,    // <=1.0.0
}

/// Version as written inside a range; missing or `x` components are `None`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialVersion {
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub prerelease: Option<String>,
}

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("Invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("Invalid prerelease identifier: {prerelease}")]
    InvalidPrerelease { prerelease: String },

    #[error("Invalid build metadata: {build}")]
    InvalidBuild { build: String },

    #[error("Invalid version range `{range}`: {reason}")]
    InvalidRange { range: String, reason: String },
}

/// Range shorthand operator as written, before desugaring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeOp {
    Primitive(Op),
    Tilde,
    Caret,
    Bare,
}

const OPERATORS: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "~", "^"];

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Lowest version of a release line, `major.minor.patch-0`
    pub fn floor(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            prerelease: Some("0".to_string()),
            ..Self::new(major, minor, patch)
        }
    }

    /// Check if this version satisfies a version requirement
    pub fn satisfies(&self, req: &VersionReq) -> bool {
        req.matches(self)
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Get the precedence for comparison (ignores build metadata)
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less, // prerelease < normal
                (None, Some(_)) => Ordering::Greater, // normal > prerelease
                (Some(a), Some(b)) => compare_prerelease(a, b),
            },
            other => other,
        }
    }
}

/// Dot-separated identifiers; numeric ones compare numerically and sort
/// before alphanumeric ones, a shorter run of equal identifiers sorts first
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            },
        }
    }
}

fn is_identifier(part: &str) -> bool {
    !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Split `core-prerelease+build`, validating the optional tails
fn split_tails(input: &str) -> Result<(&str, Option<String>, Option<String>), VersionError> {
    let (version_part, build) = match input.split_once('+') {
        Some((v, b)) => {
            if !b.split('.').all(is_identifier) {
                return Err(VersionError::InvalidBuild {
                    build: b.to_string(),
                });
            }
            (v, Some(b.to_string()))
        },
        None => (input, None),
    };

    let (core_part, prerelease) = match version_part.split_once('-') {
        Some((c, p)) => {
            if !p.split('.').all(is_identifier) {
                return Err(VersionError::InvalidPrerelease {
                    prerelease: p.to_string(),
                });
            }
            (c, Some(p.to_string()))
        },
        None => (version_part, None),
    };

    Ok((core_part, prerelease, build))
}

fn parse_number(component: &str) -> Result<u64, VersionError> {
    if component.is_empty() || !component.chars().all(|c| c.is_ascii_digit()) {
        return Err(VersionError::InvalidNumber {
            component: component.to_string(),
        });
    }
    component.parse().map_err(|_| VersionError::InvalidNumber {
        component: component.to_string(),
    })
}

fn strip_version_prefix(input: &str) -> &str {
    let input = input.trim();
    let input = input.strip_prefix('=').unwrap_or(input).trim_start();
    input.strip_prefix('v').unwrap_or(input)
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = strip_version_prefix(s);
        let (core_part, prerelease, build) = split_tails(input)?;

        // Parse major.minor.patch
        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat {
                input: s.trim().to_string(),
            });
        }

        Ok(Version {
            major: parse_number(parts[0])?,
            minor: parse_number(parts[1])?,
            patch: parse_number(parts[2])?,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}

impl PartialVersion {
    /// Parse `1`, `1.2`, `1.x`, `1.2.*`, `*` or a full version
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let input = strip_version_prefix(input);
        if input.is_empty() {
            return Ok(Self::default());
        }

        let (core_part, prerelease, _build) = split_tails(input)?;
        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() > 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let mut components = [None; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            if matches!(*part, "x" | "X" | "*") {
                break;
            }
            *slot = Some(parse_number(part)?);
        }

        let [major, minor, patch] = components;
        Ok(Self {
            major,
            minor,
            patch,
            // a prerelease tag only means something on a complete version
            prerelease: prerelease.filter(|_| patch.is_some()),
        })
    }

    fn full(&self) -> Option<Version> {
        Some(Version {
            major: self.major?,
            minor: self.minor?,
            patch: self.patch?,
            prerelease: self.prerelease.clone(),
            build: None,
        })
    }
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    /// Comparator no version can satisfy
    fn nothing() -> Self {
        Self::new(Op::Less, Version::floor(0, 0, 0))
    }

    /// Check if a version matches this comparator
    pub fn matches(&self, version: &Version) -> bool {
        let ordering = version.cmp(&self.version);
        match self.op {
            Op::Exact => ordering == Ordering::Equal,
            Op::Greater => ordering == Ordering::Greater,
            Op::GreaterEq => ordering != Ordering::Less,
            Op::Less => ordering == Ordering::Less,
            Op::LessEq => ordering != Ordering::Greater,
        }
    }
}

impl ComparatorSet {
    /// Check if a version matches every comparator in the set
    pub fn matches(&self, version: &Version) -> bool {
        self.comparators.iter().all(|comp| comp.matches(version))
    }
}

impl VersionReq {
    /// Range that accepts every version (`*`)
    pub fn any() -> Self {
        Self {
            sets: vec![ComparatorSet::default()],
        }
    }

    /// Parse a version range string
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let sets = input
            .split("||")
            .map(|set| parse_set(set, input))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sets })
    }

    /// Check if a version matches this requirement
    pub fn matches(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set.matches(version))
    }
}

impl FromStr for VersionReq {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Check a concrete version string against a range string.
///
/// Malformed versions or ranges never satisfy; use `VersionReq::parse` to
/// get the parse error instead.
pub fn satisfies(version: &str, range: &str) -> bool {
    match (Version::from_str(version), VersionReq::parse(range)) {
        (Ok(version), Ok(req)) => req.matches(&version),
        _ => false,
    }
}

fn invalid(range: &str, reason: impl Into<String>) -> VersionError {
    VersionError::InvalidRange {
        range: range.to_string(),
        reason: reason.into(),
    }
}

/// Parse one `||` branch into its desugared comparators
fn parse_set(text: &str, range: &str) -> Result<ComparatorSet, VersionError> {
    // glue dangling operators onto their operand: `> 1` -> `>1`
    let mut tokens: Vec<String> = Vec::new();
    let mut pending: Option<&str> = None;
    for word in text.split_whitespace() {
        if OPERATORS.contains(&word) && pending.is_none() {
            pending = Some(word);
            continue;
        }
        match pending.take() {
            Some(op) => tokens.push(format!("{op}{word}")),
            None => tokens.push(word.to_string()),
        }
    }
    if let Some(op) = pending {
        return Err(invalid(range, format!("operator `{op}` has no version")));
    }

    if tokens.len() == 3 && tokens[1] == "-" {
        let from = PartialVersion::parse(&tokens[0])?;
        let to = PartialVersion::parse(&tokens[2])?;
        return Ok(ComparatorSet {
            comparators: desugar_hyphen(&from, &to),
        });
    }

    let mut comparators = Vec::new();
    for token in &tokens {
        if token == "-" {
            return Err(invalid(range, "hyphen ranges need exactly one lower and upper bound"));
        }
        let (op, rest) = split_operator(token);
        let partial = PartialVersion::parse(rest)?;
        comparators.extend(desugar(op, &partial));
    }

    Ok(ComparatorSet { comparators })
}

fn split_operator(token: &str) -> (RangeOp, &str) {
    let prefixes = [
        (">=", RangeOp::Primitive(Op::GreaterEq)),
        ("<=", RangeOp::Primitive(Op::LessEq)),
        ("~>", RangeOp::Tilde),
        (">", RangeOp::Primitive(Op::Greater)),
        ("<", RangeOp::Primitive(Op::Less)),
        ("=", RangeOp::Primitive(Op::Exact)),
        ("~", RangeOp::Tilde),
        ("^", RangeOp::Caret),
    ];
    for (prefix, op) in prefixes {
        if let Some(rest) = token.strip_prefix(prefix) {
            return (op, rest);
        }
    }
    (RangeOp::Bare, token)
}

/// Lower and upper bound for an X-range such as `1.x` or `1.2`
fn x_range(major: u64, minor: Option<u64>) -> Vec<Comparator> {
    match minor {
        None => vec![
            Comparator::new(Op::GreaterEq, Version::floor(major, 0, 0)),
            Comparator::new(Op::Less, Version::floor(major.saturating_add(1), 0, 0)),
        ],
        Some(minor) => vec![
            Comparator::new(Op::GreaterEq, Version::floor(major, minor, 0)),
            Comparator::new(Op::Less, Version::floor(major, minor.saturating_add(1), 0)),
        ],
    }
}

fn desugar(op: RangeOp, partial: &PartialVersion) -> Vec<Comparator> {
    let Some(major) = partial.major else {
        // `*`, `x`, `>=*`, `^*` accept everything; `>*` and `<*` nothing
        return match op {
            RangeOp::Primitive(Op::Greater) | RangeOp::Primitive(Op::Less) => {
                vec![Comparator::nothing()]
            },
            _ => Vec::new(),
        };
    };

    if let Some(full) = partial.full() {
        return match op {
            RangeOp::Bare => vec![Comparator::new(Op::Exact, full)],
            RangeOp::Primitive(op) => vec![Comparator::new(op, full)],
            RangeOp::Tilde => {
                let upper = Version::floor(full.major, full.minor.saturating_add(1), 0);
                vec![
                    Comparator::new(Op::GreaterEq, full),
                    Comparator::new(Op::Less, upper),
                ]
            },
            RangeOp::Caret => {
                let upper = match (full.major, full.minor) {
                    (0, 0) => Version::floor(0, 0, full.patch.saturating_add(1)),
                    (0, minor) => Version::floor(0, minor.saturating_add(1), 0),
                    (major, _) => Version::floor(major.saturating_add(1), 0, 0),
                };
                vec![
                    Comparator::new(Op::GreaterEq, full),
                    Comparator::new(Op::Less, upper),
                ]
            },
        };
    }

    let minor = partial.minor;
    match op {
        RangeOp::Bare | RangeOp::Tilde | RangeOp::Primitive(Op::Exact) => x_range(major, minor),
        RangeOp::Caret => match minor {
            Some(minor) if major == 0 => x_range(0, Some(minor)),
            Some(minor) => vec![
                Comparator::new(Op::GreaterEq, Version::floor(major, minor, 0)),
                Comparator::new(Op::Less, Version::floor(major.saturating_add(1), 0, 0)),
            ],
            None => x_range(major, None),
        },
        RangeOp::Primitive(Op::Greater) => {
            let lower = match minor {
                None => Version::floor(major.saturating_add(1), 0, 0),
                Some(minor) => Version::floor(major, minor.saturating_add(1), 0),
            };
            vec![Comparator::new(Op::GreaterEq, lower)]
        },
        RangeOp::Primitive(Op::GreaterEq) => {
            vec![Comparator::new(Op::GreaterEq, Version::floor(major, minor.unwrap_or(0), 0))]
        },
        RangeOp::Primitive(Op::Less) => {
            vec![Comparator::new(Op::Less, Version::floor(major, minor.unwrap_or(0), 0))]
        },
        RangeOp::Primitive(Op::LessEq) => x_range(major, minor).split_off(1),
    }
}

fn desugar_hyphen(from: &PartialVersion, to: &PartialVersion) -> Vec<Comparator> {
    let mut comparators = Vec::new();

    if let Some(major) = from.major {
        let lower = from
            .full()
            .unwrap_or_else(|| Version::floor(major, from.minor.unwrap_or(0), 0));
        comparators.push(Comparator::new(Op::GreaterEq, lower));
    }

    if let Some(major) = to.major {
        match to.full() {
            Some(full) => comparators.push(Comparator::new(Op::LessEq, full)),
            None => comparators.extend(x_range(major, to.minor).pop()),
        }
    }

    comparators
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Exact => "=",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
            Op::Less => "<",
            Op::LessEq => "<=",
        };
        write!(f, "{}{}", op, self.version)
    }
}

impl fmt::Display for ComparatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comparators.is_empty() {
            return f.write_str("*");
        }
        for (index, comparator) in self.comparators.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", comparator)?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, set) in self.sets.iter().enumerate() {
            if index > 0 {
                f.write_str(" || ")?;
            }
            write!(f, "{}", set)?;
        }
        Ok(())
    }
}
