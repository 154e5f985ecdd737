//! Encoding and decoding of `a.b[2].c` style wire names.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced when decoding a malformed wire path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Empty input
    #[error("path is empty")]
    Empty,

    /// A `.` with nothing (or an index) on one side
    #[error("empty segment at position {position} in '{path}'")]
    EmptySegment { path: String, position: usize },

    /// `[` without `]`, or a stray `]`
    #[error("unbalanced bracket at position {position} in '{path}'")]
    UnbalancedBracket { path: String, position: usize },

    /// Bracket contents that are not a canonical non-negative integer
    #[error("invalid list index '{index}' in '{path}'")]
    InvalidIndex { path: String, index: String },

    /// Anything other than `.`, `[` or end of input after a `]`
    #[error("unexpected character '{found}' at position {position} in '{path}'")]
    UnexpectedCharacter {
        path: String,
        found: char,
        position: usize,
    },
}

/// One step of a path: a field name or a zero-based list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Field(String),
    Index(usize),
}

impl Segment {
    /// Returns the field name, if this is a field segment.
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Segment::Field(name) => Some(name),
            Segment::Index(_) => None,
        }
    }

    /// Returns the list index, if this is an index segment.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Field(_) => None,
            Segment::Index(index) => Some(*index),
        }
    }

    /// Whether a field name can be encoded without ambiguity.
    pub fn is_valid_field_name(name: &str) -> bool {
        !name.is_empty() && !name.contains(['.', '[', ']'])
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Segment::Field(name.to_string())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Segment::Field(name)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// An ordered sequence of segments locating a value in nested data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path (the form root).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path with a field segment appended.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Last field name in the path, skipping trailing indices.
    pub fn leaf_name(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(Segment::as_field)
    }

    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Encodes to wire format. See [`encode`].
    pub fn encode(&self) -> String {
        encode(&self.segments)
    }

    /// A string usable as an HTML `id`: every non-alphanumeric run becomes `-`.
    pub fn to_dom_id(&self) -> String {
        let mut id = String::new();
        let mut pending_dash = false;
        for c in self.encode().chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                if pending_dash && !id.is_empty() {
                    id.push('-');
                }
                pending_dash = false;
                id.push(c);
            } else {
                pending_dash = true;
            }
        }
        id
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

impl From<Vec<Segment>> for FieldPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

/// Encodes segments into a wire name.
///
/// Field segments are joined with `.`; index segments render as `[n]`
/// directly after the preceding segment.
pub fn encode(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Field(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Segment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

/// Decodes a wire name into a path.
///
/// # Errors
///
/// Returns `PathError` for empty input, empty segments (`a..b`, `.a`,
/// `a.`), unbalanced brackets, non-integer or non-canonical indices
/// (`a[x]`, `a[01]`, `a[-1]`) and trailing garbage after `]`.
pub fn decode(input: &str) -> Result<FieldPath, PathError> {
    if input.is_empty() {
        return Err(PathError::Empty);
    }

    let mut segments = Vec::new();
    let mut name = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '.' => {
                if name.is_empty() && !matches!(segments.last(), Some(Segment::Index(_))) {
                    return Err(PathError::EmptySegment {
                        path: input.to_string(),
                        position,
                    });
                }
                if !name.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut name)));
                }
                match chars.peek() {
                    None | Some((_, '.')) | Some((_, '[')) => {
                        return Err(PathError::EmptySegment {
                            path: input.to_string(),
                            position: position + 1,
                        });
                    }
                    Some(_) => {}
                }
            }
            '[' => {
                if !name.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut name)));
                }

                let mut digits = String::new();
                let mut closed = false;
                for (inner, d) in chars.by_ref() {
                    match d {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '[' => {
                            return Err(PathError::UnbalancedBracket {
                                path: input.to_string(),
                                position: inner,
                            });
                        }
                        _ => digits.push(d),
                    }
                }
                if !closed {
                    return Err(PathError::UnbalancedBracket {
                        path: input.to_string(),
                        position,
                    });
                }

                segments.push(Segment::Index(parse_index(input, &digits)?));

                match chars.peek() {
                    None | Some((_, '.')) | Some((_, '[')) => {}
                    Some(&(next, found)) => {
                        return Err(PathError::UnexpectedCharacter {
                            path: input.to_string(),
                            found,
                            position: next,
                        });
                    }
                }
            }
            ']' => {
                return Err(PathError::UnbalancedBracket {
                    path: input.to_string(),
                    position,
                });
            }
            _ => name.push(c),
        }
    }

    if !name.is_empty() {
        segments.push(Segment::Field(name));
    }

    Ok(FieldPath { segments })
}

fn parse_index(input: &str, digits: &str) -> Result<usize, PathError> {
    let canonical = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));

    let invalid = || PathError::InvalidIndex {
        path: input.to_string(),
        index: digits.to_string(),
    };

    if !canonical {
        return Err(invalid());
    }
    digits.parse::<usize>().map_err(|_| invalid())
}
