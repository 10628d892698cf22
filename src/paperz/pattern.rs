//! Filename pattern compiler.
//!
//! A pattern string compiles into a small token program which is then
//! rendered once per document. The grammar:
//!
//! - `[literal text]` — inserted verbatim, in source order
//! - `YYYY` / `YY` — four-digit year / last two digits
//! - `MMM` / `MM` — month abbreviation (`Jan`..`Dec`) / two-digit month
//! - `DD` — two-digit day
//! - a run of `c` — correspondent name, truncated to the run length
//!   (a single `c` means the full, untruncated name)
//! - a run of `d` — document type name, same truncation rule
//! - a run of `t` — up to run-length tag names, appended as separate
//!   `-`-joined segments in document tag order
//! - anything else passes through literally
//!
//! Runs of `c`/`d`/`t` are matched greedily (longest first, up to 32) so
//! `ccc` is one three-character token rather than three one-character
//! tokens; `YYYY` is matched before `YY` and `MMM` before `MM` for the
//! same reason. A bare `c`, `d` or `t` meant literally is therefore
//! always taken as a token — bracket it (`[c]`) to get the character.
//!
//! Rendering has no error path: tokens referencing absent data (no
//! correspondent, fewer tags than the run length) contribute nothing.

use crate::model::Document;

const MAX_RUN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Index into the captured-literal sequence.
    Literal(usize),
    Year,
    YearShort,
    MonthName,
    MonthNum,
    Day,
    Correspondent(usize),
    DocType(usize),
    Tags(usize),
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<Token>,
    literals: Vec<String>,
}

impl Pattern {
    pub fn compile(src: &str) -> Self {
        let chars: Vec<char> = src.chars().collect();
        let mut tokens = Vec::new();
        let mut literals = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '[' {
                let mut j = i + 1;
                let mut chunk = String::new();
                while j < chars.len() && chars[j] != ']' {
                    chunk.push(chars[j]);
                    j += 1;
                }
                tokens.push(Token::Literal(literals.len()));
                literals.push(chunk);
                // skip the closing bracket when present; an unterminated
                // bracket consumes the rest of the pattern as literal
                i = if j < chars.len() { j + 1 } else { j };
            } else if matches_at(&chars, i, "YYYY") {
                tokens.push(Token::Year);
                i += 4;
            } else if matches_at(&chars, i, "YY") {
                tokens.push(Token::YearShort);
                i += 2;
            } else if matches_at(&chars, i, "MMM") {
                tokens.push(Token::MonthName);
                i += 3;
            } else if matches_at(&chars, i, "MM") {
                tokens.push(Token::MonthNum);
                i += 2;
            } else if matches_at(&chars, i, "DD") {
                tokens.push(Token::Day);
                i += 2;
            } else if c == 'c' || c == 'd' || c == 't' {
                let mut n = 1;
                while i + n < chars.len() && chars[i + n] == c && n < MAX_RUN {
                    n += 1;
                }
                tokens.push(match c {
                    'c' => Token::Correspondent(n),
                    'd' => Token::DocType(n),
                    _ => Token::Tags(n),
                });
                i += n;
            } else {
                tokens.push(Token::Char(c));
                i += 1;
            }
        }

        Self { tokens, literals }
    }

    /// Render the program against one document in a single pass.
    pub fn render(&self, doc: &Document) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(idx) => out.push_str(&self.literals[*idx]),
                Token::Year => out.push_str(&doc.dates.year),
                Token::YearShort => {
                    let year = &doc.dates.year;
                    let at = year.len().saturating_sub(2);
                    if year.is_char_boundary(at) {
                        out.push_str(&year[at..]);
                    }
                }
                Token::MonthName => out.push_str(&doc.dates.month_name),
                Token::MonthNum => out.push_str(&doc.dates.month),
                Token::Day => out.push_str(&doc.dates.day),
                Token::Correspondent(n) => {
                    if let Some(name) = doc.correspondent_name() {
                        push_truncated(&mut out, name, *n);
                    }
                }
                Token::DocType(n) => {
                    if let Some(name) = doc.doc_type_name() {
                        push_truncated(&mut out, name, *n);
                    }
                }
                Token::Tags(n) => {
                    let names: Vec<&str> =
                        doc.tags.iter().filter_map(|t| t.name()).take(*n).collect();
                    out.push_str(&names.join("-"));
                }
                Token::Char(c) => out.push(*c),
            }
        }
        out
    }
}

/// A run of length 1 is the "no truncation" sentinel; longer runs
/// truncate to the run length. Tag names are never truncated.
fn push_truncated(out: &mut String, name: &str, n: usize) {
    if n <= 1 {
        out.push_str(name);
    } else {
        out.extend(name.chars().take(n));
    }
}

fn matches_at(chars: &[char], at: usize, needle: &str) -> bool {
    needle
        .chars()
        .enumerate()
        .all(|(k, c)| chars.get(at + k) == Some(&c))
}

/// Pick a filename not yet used within the batch, inserting the first
/// free numeric suffix before the extension. Purely in-memory: the
/// filesystem is never consulted.
pub fn unique_name(candidate: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == candidate) {
        return candidate.to_string();
    }
    let (stem, ext) = match candidate.rfind('.') {
        Some(dot) => candidate.split_at(dot),
        None => (candidate, ""),
    };
    let mut n = 1;
    loop {
        let next = format!("{}-{}{}", stem, n, ext);
        if !taken.iter().any(|t| t == &next) {
            return next;
        }
        n += 1;
    }
}
