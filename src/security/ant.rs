use regex::Regex;
use thiserror::Error;

const SEPARATOR: char = '/';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Empty path pattern")]
    Empty,

    #[error("Unclosed variable in pattern segment: {0}")]
    UnclosedVariable(String),

    #[error("Invalid pattern segment '{segment}': {reason}")]
    InvalidSegment { segment: String, reason: String },
}

/// A single `/`-delimited piece of a compiled pattern
#[derive(Debug, Clone)]
enum Segment {
    /// `**` - zero or more whole path segments
    AnyPath,
    Literal(String),
    /// `*`, `?` or `{var}` somewhere in the segment
    Wildcard { source: String, regex: Regex },
}

impl Segment {
    fn compile(token: &str) -> Result<Self, PatternError> {
        if token == "**" {
            return Ok(Segment::AnyPath);
        }
        if !token.contains(['*', '?', '{']) {
            return Ok(Segment::Literal(token.to_string()));
        }

        let regex = Regex::new(&segment_regex(token)?).map_err(|e| PatternError::InvalidSegment {
            segment: token.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Segment::Wildcard {
            source: token.to_string(),
            regex,
        })
    }

    fn matches(&self, token: &str) -> bool {
        match self {
            Segment::AnyPath => true,
            Segment::Literal(literal) => literal == token,
            Segment::Wildcard { regex, .. } => regex.is_match(token),
        }
    }

    fn is_single_star(&self) -> bool {
        matches!(self, Segment::Wildcard { source, .. } if source == "*")
    }
}

/// Translate one pattern segment into an anchored regular expression.
///
/// `*` becomes `.*`, `?` becomes `.`, `{name}` captures any characters and
/// `{name:re}` captures `re`. Everything else is matched literally.
fn segment_regex(token: &str) -> Result<String, PatternError> {
    let mut out = String::from("^");
    let mut literal = String::new();
    let mut chars = token.char_indices();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if ch == '*' { ".*" } else { "." });
            }
            '{' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();

                let mut depth = 1;
                let mut end = None;
                for (j, c) in chars.by_ref() {
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                end = Some(j);
                                break;
                            }
                        }
                        _ => {}
                    }
                }

                let end = end.ok_or_else(|| PatternError::UnclosedVariable(token.to_string()))?;
                let variable = &token[idx + 1..end];
                match variable.split_once(':') {
                    Some((_, custom)) => {
                        out.push('(');
                        out.push_str(custom);
                        out.push(')');
                    }
                    None => out.push_str("(.*)"),
                }
            }
            _ => literal.push(ch),
        }
    }

    out.push_str(&regex::escape(&literal));
    out.push('$');
    Ok(out)
}

fn tokenize(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|t| !t.is_empty()).collect()
}

/// Compiled ant-style path pattern.
#[derive(Debug, Clone)]
pub struct AntPattern {
    source: String,
    absolute: bool,
    trailing_separator: bool,
    has_any_path: bool,
    segments: Vec<Segment>,
}

impl AntPattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let segments = tokenize(pattern)
            .into_iter()
            .map(Segment::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: pattern.to_string(),
            absolute: pattern.starts_with(SEPARATOR),
            trailing_separator: pattern.ends_with(SEPARATOR),
            has_any_path: segments.iter().any(|s| matches!(s, Segment::AnyPath)),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        if path.starts_with(SEPARATOR) != self.absolute {
            return false;
        }

        let tokens = tokenize(path);
        self.match_from(0, 0, &tokens, path.ends_with(SEPARATOR))
    }

    fn match_from(&self, seg_idx: usize, tok_idx: usize, tokens: &[&str], path_trailing: bool) -> bool {
        let Some(segment) = self.segments.get(seg_idx) else {
            return tok_idx == tokens.len()
                && (self.has_any_path || self.trailing_separator == path_trailing);
        };

        if let Segment::AnyPath = segment {
            return (tok_idx..=tokens.len())
                .any(|next| self.match_from(seg_idx + 1, next, tokens, path_trailing));
        }

        match tokens.get(tok_idx) {
            Some(token) => {
                segment.matches(token) && self.match_from(seg_idx + 1, tok_idx + 1, tokens, path_trailing)
            }
            // "/user/*" still matches "/user/"
            None => {
                path_trailing
                    && seg_idx + 1 == self.segments.len()
                    && segment.is_single_star()
            }
        }
    }
}

impl std::fmt::Display for AntPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
