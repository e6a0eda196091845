// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-touchpoint directives parsed from issue comments.
//!
//! Only the first non-empty line of a comment is considered, so directives
//! buried below conversation text never fire. Bot authors are ignored.

use crate::issue::IssueId;
use serde::{Deserialize, Serialize};

/// Priority levels an operator can pin on an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverridePriority {
    High,
    Medium,
    Low,
}

impl OverridePriority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Queue priority this level pins, replacing the work-type table.
    pub fn queue_priority(&self) -> i64 {
        match self {
            Self::High => 5,
            Self::Medium => 50,
            Self::Low => 95,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A recognized operator directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "directive", rename_all = "kebab-case")]
pub enum Directive {
    /// Suppress all dispatches for the issue until cleared.
    Hold {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Clear the override and re-evaluate immediately.
    Resume,
    /// Suppress `qa` and `qa-coordination` dispatches.
    SkipQa,
    /// Split a rejected issue into sub-issues.
    Decompose,
    /// Invalidate the active worker binding; re-evaluation allowed.
    Reassign,
    /// Pin queue priority, replacing the work-type table.
    Priority { level: OverridePriority },
}

impl Directive {
    pub fn is_hold(&self) -> bool {
        matches!(self, Self::Hold { .. })
    }

    pub fn priority_level(&self) -> Option<OverridePriority> {
        match self {
            Self::Priority { level } => Some(*level),
            _ => None,
        }
    }
}

/// Dashes accepted between HOLD and its reason.
const REASON_DASHES: &[char] = &['-', '\u{2013}', '\u{2014}'];

/// Strip a case-insensitive token from the front of `line`.
///
/// Returns the remainder only when the token ends at a word boundary
/// (end of line, whitespace, dash, or colon), so "holder" never reads as
/// HOLD.
fn strip_token<'a>(line: &'a str, token: &str) -> Option<&'a str> {
    let head = line.get(..token.len())?;
    if !head.eq_ignore_ascii_case(token) {
        return None;
    }
    let rest = &line[token.len()..];
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || c == ':' || REASON_DASHES.contains(&c) => Some(rest),
        Some(_) => None,
    }
}

/// Parse the reason that may follow HOLD: `HOLD - why`, en- and em-dash
/// tolerated. Text without a leading dash is not a reason.
fn parse_hold_reason(rest: &str) -> Option<String> {
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(REASON_DASHES)?;
    let reason = rest.trim();
    if reason.is_empty() {
        None
    } else {
        Some(reason.to_string())
    }
}

/// `SKIP QA` / `SKIP-QA` / `SKIP  -  QA`, whitespace tolerant.
fn is_skip_qa(line: &str) -> bool {
    let Some(rest) = strip_token(line, "skip") else {
        return false;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '-');
    strip_token(rest, "qa").is_some() || rest.eq_ignore_ascii_case("qa")
}

/// Parse a directive from a comment body.
///
/// Only the first non-empty line is considered, case-insensitive, trimmed.
/// Returns `None` for plain conversation, bot chatter caught upstream, and
/// malformed directives (e.g. an unknown priority level).
pub fn parse_directive(body: &str) -> Option<Directive> {
    let line = body.lines().map(str::trim).find(|l| !l.is_empty())?;

    if let Some(rest) = strip_token(line, "priority") {
        let value = rest.trim_start().strip_prefix(':')?;
        let level = OverridePriority::parse(value)?;
        return Some(Directive::Priority { level });
    }
    if is_skip_qa(line) {
        return Some(Directive::SkipQa);
    }
    if let Some(rest) = strip_token(line, "hold") {
        return Some(Directive::Hold { reason: parse_hold_reason(rest) });
    }
    if strip_token(line, "resume").is_some() {
        return Some(Directive::Resume);
    }
    if strip_token(line, "decompose").is_some() {
        return Some(Directive::Decompose);
    }
    if strip_token(line, "reassign").is_some() {
        return Some(Directive::Reassign);
    }
    None
}

/// Comment as fetched from the tracker, pre-flagged for bot authorship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    pub created_at_ms: u64,
}

/// A directive together with the comment that carried it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOverride {
    pub directive: Directive,
    pub comment_id: String,
    pub user_id: Option<String>,
    pub created_at_ms: u64,
}

/// Scan all non-bot comments and return the most recent directive.
///
/// Recency is `created_at_ms`; ties break toward the greater comment id so
/// the result is deterministic.
pub fn find_latest_override(comments: &[IssueComment]) -> Option<ParsedOverride> {
    let mut latest: Option<ParsedOverride> = None;
    for comment in comments.iter().filter(|c| !c.is_bot) {
        let Some(directive) = parse_directive(&comment.body) else {
            continue;
        };
        let candidate = ParsedOverride {
            directive,
            comment_id: comment.id.clone(),
            user_id: comment.user_id.clone(),
            created_at_ms: comment.created_at_ms,
        };
        let newer = match &latest {
            None => true,
            Some(prev) => {
                (candidate.created_at_ms, candidate.comment_id.as_str())
                    > (prev.created_at_ms, prev.comment_id.as_str())
            }
        };
        if newer {
            latest = Some(candidate);
        }
    }
    latest
}

/// Persisted override state, one per issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub issue_id: IssueId,
    pub directive: Directive,
    pub comment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
#[path = "directive_tests.rs"]
mod tests;
