//! Path templates.
//!
//! A template like `/users/:id` compiles into a [`PathMatcher`]: an ordered
//! list of segments, each either a literal or a named parameter. Matching is a
//! straight segment-by-segment walk. No regex, no radix tree, no backtracking.
//!
//! Rules:
//! - the candidate must have exactly as many segments as the template
//! - literals compare exactly (case-sensitive)
//! - a parameter captures one non-empty segment
//! - `/users/` and `/users` are different paths
//! - anything after the first `?` is split off and handed back raw

use std::collections::HashMap;
use std::fmt;

const PARAM_MARKER: char = ':';

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathMatcher {
    segments: Vec<Segment>,
}

/// The result of a successful match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathMatch {
    pub params: HashMap<String, String>,
    /// Raw text after `?`, if the candidate had one.
    pub query: Option<String>,
}

/// Why a template failed to compile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateError {
    MissingLeadingSlash,
    EmptyParamName { position: usize },
    DuplicateParam(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLeadingSlash => f.write_str("template must start with `/`"),
            Self::EmptyParamName { position } => {
                write!(f, "segment {position} has a `:` marker but no name")
            }
            Self::DuplicateParam(name) => write!(f, "parameter `{name}` appears twice"),
        }
    }
}

impl std::error::Error for TemplateError {}

impl PathMatcher {
    /// Compiles `template` into a matcher.
    pub fn compile(template: &str) -> Result<Self, TemplateError> {
        let rest = template
            .strip_prefix('/')
            .ok_or(TemplateError::MissingLeadingSlash)?;

        let mut segments = Vec::new();
        for (position, raw) in rest.split('/').enumerate() {
            let segment = match raw.strip_prefix(PARAM_MARKER) {
                Some("") => return Err(TemplateError::EmptyParamName { position }),
                Some(name) => {
                    let dup = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(n) if n == name));
                    if dup {
                        return Err(TemplateError::DuplicateParam(name.to_owned()));
                    }
                    Segment::Param(name.to_owned())
                }
                None => Segment::Literal(raw.to_owned()),
            };
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// Tests `target` (a path with an optional `?query` suffix).
    pub fn matches(&self, target: &str) -> Option<PathMatch> {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };

        let rest = path.strip_prefix('/')?;
        let mut candidate = rest.split('/');
        let mut params = HashMap::new();

        for segment in &self.segments {
            let part = candidate.next()?;
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_owned());
                }
            }
        }

        if candidate.next().is_some() {
            return None;
        }

        Some(PathMatch { params, query })
    }
}
