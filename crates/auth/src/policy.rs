//! Access-control decision policy.
//!
//! A [`Policy`] is an ordered rule table plus a catch-all fallback. Each
//! [`Rule`] maps a path pattern and an HTTP method to a [`Requirement`].
//! Evaluation scans the table in insertion order and the **first** rule that
//! matches both path and method decides the outcome; everything else falls
//! through to the fallback, so every request produces a [`Decision`].
//!
//! The table is built once at startup and shared immutably; evaluation is a
//! pure function of (policy, request):
//! - No IO
//! - No panics
//! - No business logic

use http::Method;
use thiserror::Error;

use crate::Role;

/// What a matched route requires of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone may pass, authenticated or not.
    Public,
    /// Any authenticated caller may pass.
    Authenticated,
    /// Only authenticated callers holding the given role may pass.
    HasRole(Role),
}

/// Why a request was denied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The route requires an identity and the caller presented none (or an
    /// invalid one).
    Unauthenticated,
    /// The caller is authenticated but lacks the required role.
    Forbidden,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "unauthenticated",
            DenyReason::Forbidden => "forbidden",
        }
    }
}

impl core::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating a policy against a request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Method component of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatch {
    /// Matches every HTTP method.
    Any,
    /// Matches exactly one method.
    Exact(Method),
}

impl MethodMatch {
    fn matches(&self, method: &Method) -> bool {
        match self {
            MethodMatch::Any => true,
            MethodMatch::Exact(m) => m == method,
        }
    }
}

/// Error raised when parsing a [`PathPattern`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern must start with '/'")]
    NotRooted,

    #[error("pattern contains an empty segment")]
    EmptySegment,

    #[error("'**' is only supported as the final segment")]
    DeepWildcardPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*` — exactly one path segment, any content.
    AnyOne,
}

/// A glob-style path pattern matched segment-wise.
///
/// Grammar: literal segments, `*` for exactly one segment, and a trailing
/// `**` for zero or more remaining segments. `/api/flights/**` therefore
/// matches `/api/flights` itself as well as anything below it. Trailing
/// slashes on the request path are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    deep: bool,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(PatternError::NotRooted);
        };

        let mut segments = Vec::new();
        let mut deep = false;

        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        for (i, part) in parts.iter().enumerate() {
            if deep {
                // A previous "**" already consumed the rest.
                return Err(PatternError::DeepWildcardPosition);
            }
            match *part {
                "" => {
                    // Tolerate one trailing slash ("/api/flights/"), reject
                    // empty interior segments ("/api//flights").
                    if i + 1 == parts.len() {
                        continue;
                    }
                    return Err(PatternError::EmptySegment);
                }
                "**" => deep = true,
                "*" => segments.push(Segment::AnyOne),
                lit => segments.push(Segment::Literal(lit.to_string())),
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
            deep,
        })
    }

    /// Whether the pattern matches a normalized request path.
    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if self.deep {
            if path_segments.len() < self.segments.len() {
                return false;
            }
        } else if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(path_segments.iter())
            .all(|(pat, seg)| match pat {
                Segment::Literal(lit) => lit == seg,
                Segment::AnyOne => true,
            })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl core::str::FromStr for PathPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A single (path pattern, method, requirement) mapping.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: PathPattern,
    method: MethodMatch,
    requirement: Requirement,
}

impl Rule {
    pub fn new(pattern: PathPattern, method: MethodMatch, requirement: Requirement) -> Self {
        Self {
            pattern,
            method,
            requirement,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.matches(method) && self.pattern.matches(path)
    }
}

/// The request attributes the policy decides on.
///
/// `roles` is the caller's resolved role set; it is empty (and irrelevant)
/// when `authenticated` is false.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub authenticated: bool,
    pub roles: &'a [Role],
}

/// Ordered rule table plus a catch-all fallback. Immutable once built.
#[derive(Debug, Clone)]
pub struct Policy {
    rules: Vec<Rule>,
    fallback: Requirement,
}

impl Policy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    /// Decide whether a request may proceed.
    ///
    /// Total: every request resolves to the first matching rule or, failing
    /// that, the fallback requirement.
    pub fn evaluate(&self, ctx: &RequestContext<'_>) -> Decision {
        let requirement = self
            .rules
            .iter()
            .find(|rule| rule.matches(ctx.method, ctx.path))
            .map(|rule| &rule.requirement)
            .unwrap_or(&self.fallback);

        match requirement {
            Requirement::Public => Decision::Allow,
            Requirement::Authenticated => {
                if ctx.authenticated {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::Unauthenticated)
                }
            }
            Requirement::HasRole(role) => {
                if !ctx.authenticated {
                    Decision::Deny(DenyReason::Unauthenticated)
                } else if ctx.roles.iter().any(|r| r.as_str() == role.as_str()) {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::Forbidden)
                }
            }
        }
    }
}

/// Ordered-list builder for [`Policy`].
///
/// The fallback starts as [`Requirement::Authenticated`]; wiring that wants
/// an open fallback must say so explicitly.
#[derive(Debug)]
pub struct PolicyBuilder {
    rules: Vec<Rule>,
    fallback: Requirement,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Requirement::Authenticated,
        }
    }

    /// Append a rule. Rules are evaluated in insertion order; first match wins.
    ///
    /// # Panics
    ///
    /// Panics on a malformed pattern. Rule tables are static wiring built at
    /// startup, so a bad pattern is a programming error (same stance axum
    /// takes for its route strings). Use [`PathPattern::parse`] plus
    /// [`PolicyBuilder::rule`] to handle dynamic patterns fallibly.
    pub fn route(self, method: MethodMatch, pattern: &str, requirement: Requirement) -> Self {
        let pattern = match PathPattern::parse(pattern) {
            Ok(p) => p,
            Err(e) => panic!("invalid route pattern {pattern:?}: {e}"),
        };
        self.rule(Rule::new(pattern, method, requirement))
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the catch-all requirement applied when no rule matches.
    pub fn fallback(mut self, requirement: Requirement) -> Self {
        self.fallback = requirement;
        self
    }

    pub fn build(self) -> Policy {
        if self.fallback == Requirement::Public {
            tracing::warn!(
                "access policy fallback is Public; unmatched routes will be open"
            );
        }
        Policy {
            rules: self.rules,
            fallback: self.fallback,
        }
    }
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
