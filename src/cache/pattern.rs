//! File pattern templates
//!
//! A template is a relative path with `[token]` placeholders and optional
//! `(...)` groups that disappear when a token inside them has no value:
//!
//! ```text
//! [organisation]/[module]/[revision]/module(-[qualifier]).json
//! ```
//!
//! Optional groups must not span a `/`.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::error::CacheError;

pub const TOKEN_ORGANISATION: &str = "organisation";
pub const TOKEN_MODULE: &str = "module";
pub const TOKEN_REVISION: &str = "revision";
pub const TOKEN_ARTIFACT: &str = "artifact";
pub const TOKEN_TYPE: &str = "type";
pub const TOKEN_EXT: &str = "ext";
pub const TOKEN_QUALIFIER: &str = "qualifier";
pub const TOKEN_KEY: &str = "key";

/// Token values keyed by token name
pub type Tokens = HashMap<&'static str, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Token(String),
    Optional(Vec<Piece>),
}

/// Split a template into path segments of pieces
fn parse_segments(template: &str) -> Vec<Vec<Piece>> {
    fn flush(literal: &mut String, target: &mut Vec<Piece>) {
        if !literal.is_empty() {
            target.push(Piece::Literal(std::mem::take(literal)));
        }
    }

    let mut segments = Vec::new();
    let mut current = Vec::new();
    let mut group: Option<Vec<Piece>> = None;
    let mut literal = String::new();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        match c {
            '[' => {
                let name: String = chars.by_ref().take_while(|&c| c != ']').collect();
                let target = group.as_mut().unwrap_or(&mut current);
                flush(&mut literal, target);
                target.push(Piece::Token(name));
            }
            '(' if group.is_none() => {
                flush(&mut literal, &mut current);
                group = Some(Vec::new());
            }
            ')' if group.is_some() => {
                if let Some(mut pieces) = group.take() {
                    flush(&mut literal, &mut pieces);
                    current.push(Piece::Optional(pieces));
                }
            }
            '/' if group.is_none() => {
                flush(&mut literal, &mut current);
                segments.push(std::mem::take(&mut current));
            }
            _ => literal.push(c),
        }
    }

    // An unclosed group is kept as a regular part of the segment
    match group.take() {
        Some(mut pieces) => {
            flush(&mut literal, &mut pieces);
            current.extend(pieces);
        }
        None => flush(&mut literal, &mut current),
    }
    segments.push(current);
    segments
}

/// Reject values that would escape or restructure the cache layout
fn validate_segment(token: &str, value: &str) -> Result<(), CacheError> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if invalid {
        return Err(CacheError::InvalidKey {
            token: token.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn render_pieces(pieces: &[Piece], tokens: &Tokens, out: &mut String) -> Result<(), CacheError> {
    for piece in pieces {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Token(name) => {
                let value = tokens.get(name.as_str()).map(String::as_str).unwrap_or("");
                validate_segment(name, value)?;
                out.push_str(value);
            }
            Piece::Optional(inner) => {
                let complete = inner.iter().all(|p| match p {
                    Piece::Token(name) => tokens.get(name.as_str()).is_some_and(|v| !v.is_empty()),
                    _ => true,
                });
                if complete {
                    render_pieces(inner, tokens, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Substitute every token of `template` and anchor the result at `root`
///
/// Required tokens must be present and form a valid path segment.
pub fn render(root: &Path, template: &str, tokens: &Tokens) -> Result<PathBuf, CacheError> {
    let mut path = root.to_path_buf();
    for segment in parse_segments(template) {
        let mut rendered = String::new();
        render_pieces(&segment, tokens, &mut rendered)?;
        if !rendered.is_empty() {
            path.push(rendered);
        }
    }
    Ok(path)
}

fn segment_regex(pieces: &[Piece], target: &str, fixed: &Tokens, out: &mut String) {
    for piece in pieces {
        match piece {
            Piece::Literal(text) => out.push_str(&regex::escape(text)),
            Piece::Token(name) if name == target => out.push_str("(?P<value>.+?)"),
            Piece::Token(name) => match fixed.get(name.as_str()) {
                Some(value) => out.push_str(&regex::escape(value)),
                None => out.push_str(".+?"),
            },
            Piece::Optional(inner) => {
                let dropped = inner.iter().any(|p| match p {
                    Piece::Token(name) => fixed.get(name.as_str()).is_some_and(|v| v.is_empty()),
                    _ => false,
                });
                if !dropped {
                    out.push_str("(?:");
                    segment_regex(inner, target, fixed, out);
                    out.push_str(")?");
                }
            }
        }
    }
}

fn contains_token(pieces: &[Piece], target: &str) -> bool {
    pieces.iter().any(|p| match p {
        Piece::Token(name) => name == target,
        Piece::Optional(inner) => contains_token(inner, target),
        Piece::Literal(_) => false,
    })
}

/// List the values `target` takes on disk, given values for earlier tokens
///
/// Walks to the first segment containing `target` and matches the entries of
/// that directory. Every token before that segment must be in `fixed`.
/// Hidden entries (temp files, bookkeeping directories) are ignored.
pub fn list_token_values(
    root: &Path,
    template: &str,
    target: &str,
    fixed: &Tokens,
) -> Result<Vec<String>, CacheError> {
    let segments = parse_segments(template);
    let Some(index) = segments.iter().position(|s| contains_token(s, target)) else {
        return Ok(Vec::new());
    };

    let mut dir = root.to_path_buf();
    for segment in &segments[..index] {
        let mut rendered = String::new();
        if let Err(e) = render_pieces(segment, fixed, &mut rendered) {
            debug!("Cannot list [{}] in {}: {}", target, template, e);
            return Ok(Vec::new());
        }
        if !rendered.is_empty() {
            dir.push(rendered);
        }
    }

    let mut expr = String::from("^");
    segment_regex(&segments[index], target, fixed, &mut expr);
    expr.push('$');
    let re = Regex::new(&expr).map_err(|e| CacheError::InvalidKey {
        token: target.to_string(),
        value: e.to_string(),
    })?;

    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CacheError::io("listing", &dir, e)),
    };

    let want_dir = index + 1 < segments.len();
    let mut values = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| CacheError::io("listing", &dir, e))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        if is_dir != want_dir {
            continue;
        }
        if let Some(value) = re.captures(&name).and_then(|c| c.name("value")) {
            values.insert(value.as_str().to_string());
        }
    }
    Ok(values.into_iter().collect())
}
