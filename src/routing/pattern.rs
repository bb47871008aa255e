//! Route pattern compilation and matching.
//!
//! # Responsibilities
//! - Compile a pattern string once, at registration
//! - Test a remaining request path against the compiled form
//! - Extract named parameters on success
//!
//! # Design Decisions
//! - Segment-wise comparison, no regex: matching is O(segments)
//! - Literal segments compare ASCII-case-insensitively
//! - One trailing slash on the request path is tolerated
//! - `*name` swallows the rest of the path and must come last
//! - `{/...}` groups match as a whole or not at all; the present form is
//!   tried first, groups do not nest

use std::collections::HashSet;

use crate::error::RouteError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Splat(String),
    Optional(Vec<Segment>),
}

/// A pattern compiled into segments.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    segments: Vec<Segment>,
}

impl CompiledPattern {
    /// Compile `pattern`, e.g. `/users/:id`, `/users{/:id}` or `/files/*rest`.
    pub fn compile(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut rest = pattern;
        let mut first = true;
        loop {
            let (chunk, group, tail) = match rest.find('{') {
                Some(open) => {
                    let close = rest[open..]
                        .find('}')
                        .map(|at| open + at)
                        .ok_or_else(|| invalid("unclosed optional group"))?;
                    let group = &rest[open + 1..close];
                    if group.contains('{') {
                        return Err(invalid("nested optional group"));
                    }
                    (&rest[..open], Some(group), &rest[close + 1..])
                }
                None => (rest, None, ""),
            };
            if chunk.contains('}') {
                return Err(invalid("unopened optional group"));
            }

            segments.extend(parse_chunk(chunk, first, group.is_none()).map_err(invalid)?);
            first = false;

            let Some(group) = group else { break };
            let inner = group
                .strip_prefix('/')
                .ok_or_else(|| invalid("optional group must start with '/'"))?;
            let inner = parse_segments(inner).map_err(invalid)?;
            if inner.is_empty() {
                return Err(invalid("empty optional group"));
            }
            segments.push(Segment::Optional(inner));
            rest = tail;
        }

        check_names(&segments).map_err(invalid)?;

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the parameters this pattern can extract, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        leaves(&self.segments).filter_map(Segment::name)
    }

    /// Structural test only; values are not decoded.
    pub fn is_match(&self, path: &str) -> bool {
        self.matches(path).is_some()
    }

    /// Match `path` and return the extracted parameters. Parameters inside
    /// an absent optional group are simply missing.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        self.matches(path).map(|params| {
            params
                .into_iter()
                .map(|(name, value)| (name.to_string(), decode(&value)))
                .collect()
        })
    }

    fn matches(&self, path: &str) -> Option<Vec<(&str, String)>> {
        let parts = split_path(path);
        let mut params = Vec::new();
        match_segments(&self.segments, &parts, &mut params).then_some(params)
    }
}

impl Segment {
    fn name(&self) -> Option<&str> {
        match self {
            Segment::Param(n) | Segment::Splat(n) => Some(n),
            Segment::Literal(_) | Segment::Optional(_) => None,
        }
    }
}

/// Segments with optional groups flattened in place.
fn leaves(segments: &[Segment]) -> impl Iterator<Item = &Segment> {
    segments.iter().flat_map(|s| match s {
        Segment::Optional(inner) => inner.as_slice(),
        other => std::slice::from_ref(other),
    })
}

/// Text between groups. Only the first chunk may omit the leading `/`;
/// only the last may carry a trailing one.
fn parse_chunk(chunk: &str, first: bool, last: bool) -> Result<Vec<Segment>, &'static str> {
    if !first && !chunk.is_empty() && !chunk.starts_with('/') {
        return Err("segment must follow '/'");
    }
    let trimmed = chunk.strip_prefix('/').unwrap_or(chunk);
    let trimmed = if last {
        trimmed.strip_suffix('/').unwrap_or(trimmed)
    } else {
        trimmed
    };
    parse_segments(trimmed)
}

fn parse_segments(text: &str) -> Result<Vec<Segment>, &'static str> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split('/').map(parse_segment).collect()
}

fn parse_segment(raw: &str) -> Result<Segment, &'static str> {
    if raw.is_empty() {
        return Err("empty segment");
    }
    if let Some(name) = raw.strip_prefix(':') {
        param_name(name).map(Segment::Param).ok_or("bad parameter name")
    } else if let Some(name) = raw.strip_prefix('*') {
        param_name(name).map(Segment::Splat).ok_or("bad splat name")
    } else {
        Ok(Segment::Literal(raw.to_string()))
    }
}

fn check_names(segments: &[Segment]) -> Result<(), &'static str> {
    let flat: Vec<&Segment> = leaves(segments).collect();
    if let Some(at) = flat.iter().position(|s| matches!(s, Segment::Splat(_))) {
        if at + 1 != flat.len() {
            return Err("splat must be the last segment");
        }
    }

    let mut seen = HashSet::new();
    for name in flat.iter().filter_map(|s| s.name()) {
        if !seen.insert(name) {
            return Err("duplicate parameter name");
        }
    }
    Ok(())
}

fn match_segments<'p>(segments: &'p [Segment], parts: &[&str], params: &mut Vec<(&'p str, String)>) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return parts.is_empty();
    };

    match segment {
        Segment::Optional(inner) => {
            let mark = params.len();
            if let Some(used) = match_run(inner, parts, params) {
                if match_segments(rest, &parts[used..], params) {
                    return true;
                }
            }
            params.truncate(mark);
            match_segments(rest, parts, params)
        }
        plain => match match_one(plain, parts, params) {
            Some(used) => match_segments(rest, &parts[used..], params),
            None => false,
        },
    }
}

/// Match every segment of a group in sequence; returns the parts consumed.
fn match_run<'p>(segments: &'p [Segment], parts: &[&str], params: &mut Vec<(&'p str, String)>) -> Option<usize> {
    let mut used = 0;
    for segment in segments {
        used += match_one(segment, &parts[used..], params)?;
    }
    Some(used)
}

fn match_one<'p>(segment: &'p Segment, parts: &[&str], params: &mut Vec<(&'p str, String)>) -> Option<usize> {
    match segment {
        Segment::Literal(lit) => parts.first().filter(|part| part.eq_ignore_ascii_case(lit)).map(|_| 1),
        Segment::Param(name) => {
            let part = parts.first().filter(|part| !part.is_empty())?;
            params.push((name.as_str(), (*part).to_string()));
            Some(1)
        }
        Segment::Splat(name) => {
            if parts.is_empty() || parts.iter().any(|p| p.is_empty()) {
                return None;
            }
            params.push((name.as_str(), parts.join("/")));
            Some(parts.len())
        }
        Segment::Optional(_) => None,
    }
}

fn param_name(name: &str) -> Option<String> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then(|| name.to_string())
}

fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
