//! Inline template parsing.
//!
//! Syntax: `{0}` or `{name}` bind an argument, `{this}` the receiver,
//! `{*name}` spreads a `params` tail, `{name:modifier}` applies a modifier.
//! `{{` and `}}` are literal braces. A leading `<self>` marks a template
//! that needs the method bound to its receiver.

use memchr::memchr2;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlaceholderKey {
    Index(usize),
    Name(String),
    This,
}

impl std::fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(name) => f.write_str(name),
            Self::This => f.write_str("this"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    None,
    /// Type name or runtime type lookup.
    Type,
    /// Evaluate into a named temporary.
    Tmp,
    /// Read a temporary created by `tmp`.
    GetTmp,
    /// Inline a lambda body.
    Body,
    /// Anonymous object as a plain object literal.
    Plain,
    /// String literal without quotes.
    Raw,
    /// `params` tail always wrapped in an array literal.
    Array,
    /// Default value of a type argument.
    Default,
    /// Default value wrapped in a function.
    DefaultFn,
    /// Validated version field count.
    Version,
}

impl Modifier {
    fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "type" => Self::Type,
            "tmp" => Self::Tmp,
            "gettmp" => Self::GetTmp,
            "body" => Self::Body,
            "plain" => Self::Plain,
            "raw" => Self::Raw,
            "array" => Self::Array,
            "default" => Self::Default,
            "defaultFn" => Self::DefaultFn,
            "version" => Self::Version,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Type => "type",
            Self::Tmp => "tmp",
            Self::GetTmp => "gettmp",
            Self::Body => "body",
            Self::Plain => "plain",
            Self::Raw => "raw",
            Self::Array => "array",
            Self::Default => "default",
            Self::DefaultFn => "defaultFn",
            Self::Version => "version",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder {
    pub key: PlaceholderKey,
    pub spread: bool,
    pub modifier: Modifier,
    /// Text between the braces, for diagnostics.
    pub raw: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Placeholder(Placeholder),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateSyntaxError {
    pub reason: String,
}

impl std::fmt::Display for TemplateSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for TemplateSyntaxError {}

fn syntax_error(reason: impl Into<String>) -> TemplateSyntaxError {
    TemplateSyntaxError {
        reason: reason.into(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineTemplate {
    pub source: String,
    pub self_bound: bool,
    pub segments: Vec<Segment>,
}

impl InlineTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateSyntaxError> {
        let (self_bound, body) = match source.strip_prefix("<self>") {
            Some(rest) => (true, rest),
            None => (false, source),
        };
        let bytes = body.as_bytes();
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut pos = 0;

        while let Some(offset) = memchr2(b'{', b'}', &bytes[pos..]) {
            let at = pos + offset;
            text.push_str(&body[pos..at]);
            let doubled = bytes.get(at + 1) == Some(&bytes[at]);
            if doubled {
                text.push(bytes[at] as char);
                pos = at + 2;
                continue;
            }
            if bytes[at] == b'}' {
                return Err(syntax_error(format!("unmatched '}}' at offset {at}")));
            }
            let Some(close) = memchr2(b'}', b'{', &bytes[at + 1..]) else {
                return Err(syntax_error(format!("unterminated placeholder at offset {at}")));
            };
            let close = at + 1 + close;
            if bytes[close] == b'{' {
                return Err(syntax_error(format!("nested '{{' at offset {close}")));
            }
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Placeholder(parse_placeholder(&body[at + 1..close])?));
            pos = close + 1;
        }
        text.push_str(&body[pos..]);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            source: source.to_string(),
            self_bound,
            segments,
        })
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(p),
            Segment::Text(_) => None,
        })
    }

    /// Number of placeholders sharing `key` and `modifier`.
    pub fn occurrences(&self, key: &PlaceholderKey, modifier: Modifier) -> usize {
        self.placeholders()
            .filter(|p| &p.key == key && p.modifier == modifier)
            .count()
    }

    pub fn references_this(&self) -> bool {
        self.placeholders().any(|p| p.key == PlaceholderKey::This)
    }
}

fn parse_placeholder(inner: &str) -> Result<Placeholder, TemplateSyntaxError> {
    let raw = inner.to_string();
    let (spread, rest) = match inner.strip_prefix('*') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let (key_text, modifier) = match rest.split_once(':') {
        Some((key, modifier)) => {
            let Some(modifier) = Modifier::parse(modifier.trim()) else {
                return Err(syntax_error(format!("unknown modifier '{modifier}' in '{{{inner}}}'")));
            };
            (key.trim(), modifier)
        }
        None => (rest.trim(), Modifier::None),
    };
    if key_text.is_empty() {
        return Err(syntax_error(format!("empty placeholder '{{{inner}}}'")));
    }
    let key = if key_text == "this" {
        PlaceholderKey::This
    } else if let Ok(index) = key_text.parse::<usize>() {
        PlaceholderKey::Index(index)
    } else if key_text
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '@')
    {
        PlaceholderKey::Name(key_text.trim_start_matches('@').to_string())
    } else {
        return Err(syntax_error(format!("invalid placeholder '{{{inner}}}'")));
    };
    Ok(Placeholder {
        key,
        spread,
        modifier,
        raw,
    })
}

#[cfg(test)]
#[path = "../tests/template.rs"]
mod tests;
