//! JSON path engine
//!
//! Paths address nodes inside an event document using a small JSONPath
//! subset: the root `$`, member access `.key` (or `['key']` for keys that
//! contain path metacharacters), array access `[index]`, and the wildcards
//! `.*` / `[*]` that fan out over every child.
//!
//! ```rust
//! use bugsnag_export::path::{enumerate_paths, extract, JsonPath};
//! use serde_json::json;
//!
//! let doc = json!({"exception": [{"error_class": "NotFoundError"}]});
//!
//! let paths: Vec<String> = enumerate_paths(&doc).iter().map(|p| p.to_string()).collect();
//! assert_eq!(paths, ["$.exception", "$.exception[0].error_class", "$.exception[0]"]);
//!
//! let path: JsonPath = "$.exception[0].error_class".parse().unwrap();
//! assert_eq!(extract(&doc, &path), [&json!("NotFoundError")]);
//! ```

pub mod enumerate;
pub mod extract;

pub use enumerate::enumerate_paths;
pub use extract::{extract, extract_str};

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Keys that can be written as `.key` without quoting
static PLAIN_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[^.\[\]'"*\\]+$"#).unwrap()
});

/// A single traversal step
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathToken {
    /// Object member lookup
    Key(String),
    /// Zero-based array index
    Index(usize),
    /// Every child of an object or array
    Wildcard,
}

/// A parsed path, rooted at `$`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    tokens: Vec<PathToken>,
}

/// A path string that does not follow the grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid path {input:?} at offset {offset}: {reason}")]
pub struct PathError {
    pub input: String,
    pub offset: usize,
    pub reason: &'static str,
}

impl JsonPath {
    /// The bare root `$`
    pub fn root() -> Self {
        JsonPath { tokens: Vec::new() }
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether extraction can yield more than one value
    pub fn has_wildcard(&self) -> bool {
        self.tokens.contains(&PathToken::Wildcard)
    }

    /// Path to member `key` of the node at `self`
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.with(PathToken::Key(key.into()))
    }

    /// Path to element `index` of the node at `self`
    pub fn index(&self, index: usize) -> Self {
        self.with(PathToken::Index(index))
    }

    pub fn wildcard(&self) -> Self {
        self.with(PathToken::Wildcard)
    }

    fn with(&self, token: PathToken) -> Self {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.extend_from_slice(&self.tokens);
        tokens.push(token);
        JsonPath { tokens }
    }

    /// Parse a path string such as `$.exception[0].error_class`
    pub fn parse(input: &str) -> Result<Self, PathError> {
        Parser::new(input).parse()
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for token in &self.tokens {
            match token {
                PathToken::Key(key) if PLAIN_KEY_REGEX.is_match(key) => write!(f, ".{}", key)?,
                PathToken::Key(key) => {
                    let escaped = key.replace('\\', "\\\\").replace('\'', "\\'");
                    write!(f, "['{}']", escaped)?;
                }
                PathToken::Index(index) => write!(f, "[{}]", index)?,
                PathToken::Wildcard => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

/// Recursive-descent parser over the path bytes
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser { input, pos: 0 }
    }

    fn parse(mut self) -> Result<JsonPath, PathError> {
        if !self.input.starts_with('$') {
            return Err(self.error("path must start with '$'"));
        }
        self.pos = 1;

        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    tokens.push(self.parse_member()?);
                }
                '[' => {
                    self.pos += 1;
                    tokens.push(self.parse_bracket()?);
                }
                _ => return Err(self.error("expected '.' or '['")),
            }
        }

        Ok(JsonPath { tokens })
    }

    fn parse_member(&mut self) -> Result<PathToken, PathError> {
        if self.peek() == Some('*') {
            self.pos += 1;
            return Ok(PathToken::Wildcard);
        }

        let rest = &self.input[self.pos..];
        let len = rest.find(['.', '[']).unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("empty member name"));
        }
        self.pos += len;
        Ok(PathToken::Key(rest[..len].to_string()))
    }

    fn parse_bracket(&mut self) -> Result<PathToken, PathError> {
        let token = match self.peek() {
            Some('*') => {
                self.pos += 1;
                PathToken::Wildcard
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                PathToken::Key(self.parse_quoted(quote)?)
            }
            Some(c) if c.is_ascii_digit() => {
                let rest = &self.input[self.pos..];
                let len = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                let index = rest[..len]
                    .parse()
                    .map_err(|_| self.error("index out of range"))?;
                self.pos += len;
                PathToken::Index(index)
            }
            _ => return Err(self.error("expected index, '*' or quoted key")),
        };

        if self.peek() != Some(']') {
            return Err(self.error("expected ']'"));
        }
        self.pos += 1;
        Ok(token)
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, PathError> {
        let mut key = String::new();
        let mut escaped = false;
        while let Some(c) = self.peek() {
            self.pos += c.len_utf8();
            if escaped {
                key.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return Ok(key);
            } else {
                key.push(c);
            }
        }
        Err(self.error("unterminated quoted key"))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn error(&self, reason: &'static str) -> PathError {
        PathError {
            input: self.input.to_string(),
            offset: self.pos,
            reason,
        }
    }
}
