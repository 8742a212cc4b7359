//! Free-text query grammar.
//!
//! Terms are combined implicitly as an OR group. Supported syntax:
//! `"phrase"`, `( group )`, `field:term`, `field:"phrase"`, `field:( group )`,
//! a `~` or `~N` suffix (edit distance on terms, word slop on phrases) and a
//! `^boost` suffix on any clause; `~` and `^` may come in either order.
//! `OR` is accepted and redundant; `AND`/`NOT` are rejected. Wildcard
//! characters have no meaning and stay part of the term text.

use serde::Serialize;

use crate::error::{Error, Result};

/// Deepest `( ... )` nesting a query may use.
pub const MAX_GROUP_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Clause {
    Term {
        field: Option<String>,
        text: String,
        boost: f32,
        /// `None` means the engine's configured default distance.
        distance: Option<u8>,
    },
    Phrase {
        field: Option<String>,
        words: Vec<String>,
        boost: f32,
        /// Positions the words may drift apart; 0 is an exact phrase.
        slop: u32,
    },
    Group {
        clauses: Vec<Clause>,
        boost: f32,
    },
}

impl Clause {
    pub fn boost(&self) -> f32 {
        match self {
            Clause::Term { boost, .. } | Clause::Phrase { boost, .. } | Clause::Group { boost, .. } => *boost,
        }
    }
}

/// Top-level clauses of one query; coordination scoring works over these.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub clauses: Vec<Clause>,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}

pub fn parse(raw: &str) -> Result<ParsedQuery> {
    let mut parser = Parser { chars: raw.chars().collect(), pos: 0 };
    let clauses = parser.sequence(0, None)?;
    Ok(ParsedQuery { clauses })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

/// Trailing `~` and `^` of one clause. `tilde` is `Some(None)` for a bare `~`.
#[derive(Default)]
struct Suffixes {
    tilde: Option<Option<u32>>,
    boost: Option<f32>,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn sequence(&mut self, depth: usize, scope: Option<&str>) -> Result<Vec<Clause>> {
        let opened_at = self.pos.saturating_sub(1);
        let mut clauses = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None if depth > 0 => return Err(Error::parse(opened_at, "unbalanced '(': missing ')'")),
                None => break,
                Some(')') if depth == 0 => return Err(Error::parse(self.pos, "unbalanced ')'")),
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    if let Some(clause) = self.clause(depth, scope)? {
                        clauses.push(clause);
                    }
                }
            }
        }
        Ok(clauses)
    }

    fn clause(&mut self, depth: usize, scope: Option<&str>) -> Result<Option<Clause>> {
        let start = self.pos;
        match self.peek() {
            Some('(') => self.group(depth, scope),
            Some('"') => self.phrase(scope.map(str::to_string)),
            _ => {
                let word = self.word();
                if word.is_empty() {
                    return Err(Error::parse(start, format!("unexpected '{}'", self.peek().unwrap_or(' '))));
                }
                match word.as_str() {
                    "OR" => return Ok(None),
                    "AND" | "NOT" => return Err(Error::parse(start, format!("unsupported operator '{word}'"))),
                    _ => {}
                }
                if let Some((field, text)) = split_field(&word) {
                    if text.is_empty() {
                        return match self.peek() {
                            Some('"') => self.phrase(Some(field)),
                            Some('(') => self.group(depth, Some(field.as_str())),
                            _ => Err(Error::parse(start, format!("missing value after '{field}:'"))),
                        };
                    }
                    return self.term(Some(field), text);
                }
                self.term(scope.map(str::to_string), word)
            }
        }
    }

    fn group(&mut self, depth: usize, scope: Option<&str>) -> Result<Option<Clause>> {
        if depth >= MAX_GROUP_DEPTH {
            return Err(Error::parse(self.pos, "groups nested too deeply"));
        }
        self.pos += 1;
        let clauses = self.sequence(depth + 1, scope)?;
        let tilde_at = self.pos;
        let suffixes = self.suffixes()?;
        if suffixes.tilde.is_some() {
            return Err(Error::parse(tilde_at, "'~' applies to terms and phrases only"));
        }
        let boost = suffixes.boost.unwrap_or(1.0);
        Ok((!clauses.is_empty()).then_some(Clause::Group { clauses, boost }))
    }

    fn term(&mut self, field: Option<String>, text: String) -> Result<Option<Clause>> {
        let suffixes = self.suffixes()?;
        let distance = suffixes.tilde.flatten().map(|n| u8::try_from(n).unwrap_or(u8::MAX));
        let boost = suffixes.boost.unwrap_or(1.0);
        Ok(Some(Clause::Term { field, text, boost, distance }))
    }

    fn phrase(&mut self, field: Option<String>) -> Result<Option<Clause>> {
        let start = self.pos;
        self.pos += 1;
        let mut body = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::parse(start, "unterminated quote")),
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    body.push(c);
                    self.pos += 1;
                }
            }
        }
        let suffixes = self.suffixes()?;
        let slop = suffixes.tilde.map_or(0, |n| n.unwrap_or(1));
        let boost = suffixes.boost.unwrap_or(1.0);
        let words: Vec<String> = body.split_whitespace().map(str::to_string).collect();
        Ok((!words.is_empty()).then_some(Clause::Phrase { field, words, boost, slop }))
    }

    fn suffixes(&mut self) -> Result<Suffixes> {
        let mut suffixes = Suffixes::default();
        loop {
            match self.peek() {
                Some('~') if suffixes.tilde.is_none() => suffixes.tilde = Some(self.tilde()?),
                Some('^') if suffixes.boost.is_none() => suffixes.boost = Some(self.boost()?),
                _ => return Ok(suffixes),
            }
        }
    }

    fn tilde(&mut self) -> Result<Option<u32>> {
        let start = self.pos;
        self.pos += 1;
        let mut digits = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            digits.push(c);
            self.pos += 1;
        }
        if digits.is_empty() {
            return match self.peek() {
                None | Some('^' | ')') => Ok(None),
                Some(c) if c.is_whitespace() => Ok(None),
                Some(c) => Err(Error::parse(self.pos, format!("expected a number after '~', found '{c}'"))),
            };
        }
        digits.parse().map(Some).map_err(|_| Error::parse(start, "number after '~' is too large"))
    }

    fn boost(&mut self) -> Result<f32> {
        let start = self.pos;
        self.pos += 1;
        let mut digits = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit() || *c == '.') {
            digits.push(c);
            self.pos += 1;
        }
        match digits.parse::<f32>() {
            Ok(boost) if boost > 0.0 && boost.is_finite() => Ok(boost),
            _ => Err(Error::parse(start, "expected a positive number after '^'")),
        }
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '^' | '~') {
                break;
            }
            word.push(c);
            self.pos += 1;
        }
        word
    }
}

/// `name:value` where `name` looks like a schema field.
fn split_field(word: &str) -> Option<(String, String)> {
    let (field, text) = word.split_once(':')?;
    let valid = !field.is_empty()
        && field.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    valid.then(|| (field.to_string(), text.to_string()))
}
