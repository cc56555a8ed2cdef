//! Lexical analysis for a single line of assembly source
//!
//! A line has up to four parts, always in this order:
//!
//! ```text
//! [label:] [MNEMONIC [operand]] [; comment]
//! ```
//!
//! The lexer only splits the line. It checks the label and mnemonic shapes but does
//! not interpret the operand; that is the job of the [`operand`](super::operand)
//! classifier.
//!
//! # Examples
//!
//! ```
//! use libasm6502::assembler::lexer::lex_line;
//!
//! let line = lex_line(1, "loop: lda ($40),Y ; fetch").unwrap();
//! assert_eq!(line.label.as_deref(), Some("loop"));
//! assert_eq!(line.mnemonic.as_deref(), Some("LDA"));
//! assert_eq!(line.operand.as_deref(), Some("($40),Y"));
//! assert_eq!(line.comment.as_deref(), Some(" fetch"));
//! ```

use thiserror::Error;

use crate::assembler::ErrorType;

/// One source line split into its structural parts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLine {
    /// Line number in source (1-indexed)
    pub line_number: usize,

    /// Label name without the trailing `:`
    pub label: Option<String>,

    /// Mnemonic, upper case normalized
    pub mnemonic: Option<String>,

    /// Raw operand text, present only when a mnemonic is
    pub operand: Option<String>,

    /// Comment text after `;` (excluding `;` itself)
    pub comment: Option<String>,

    /// Column of the mnemonic (0-indexed)
    pub mnemonic_column: usize,

    /// Column of the operand (0-indexed)
    pub operand_column: usize,
}

impl SourceLine {
    /// True for blank and comment-only lines
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.mnemonic.is_none()
    }
}

/// Structural errors found while splitting a line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("empty label name")]
    EmptyLabel { column: usize },

    #[error("invalid label '{label}': labels may only contain letters and digits")]
    InvalidLabel { label: String, column: usize },

    #[error("invalid mnemonic '{mnemonic}': expected exactly three letters")]
    InvalidMnemonic { mnemonic: String, column: usize },

    #[error("unexpected '{text}' after instruction")]
    TrailingCharacters { text: String, column: usize },
}

impl LexError {
    pub fn kind(&self) -> ErrorType {
        ErrorType::SyntaxError
    }

    /// Column where the offending text starts (0-indexed)
    pub fn column(&self) -> usize {
        match self {
            LexError::EmptyLabel { column }
            | LexError::InvalidLabel { column, .. }
            | LexError::InvalidMnemonic { column, .. }
            | LexError::TrailingCharacters { column, .. } => *column,
        }
    }
}

/// Lexer state over one line of text
pub struct Lexer<'a> {
    /// The line being split
    source: &'a str,

    /// Iterator over (byte_offset, char) pairs
    chars: std::str::CharIndices<'a>,

    /// Current character being examined
    current: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let current = chars.next();
        Lexer {
            source,
            chars,
            current,
        }
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn peek(&self) -> Option<char> {
        self.current.map(|(_, ch)| ch)
    }

    /// Current byte offset, which is also the 0-indexed column
    fn column(&self) -> usize {
        match self.current {
            Some((pos, _)) => pos,
            None => self.source.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    /// Consume characters while `accept` holds and return the consumed slice
    fn scan_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.column();
        while matches!(self.peek(), Some(ch) if accept(ch)) {
            self.advance();
        }
        &self.source[start..self.column()]
    }

    fn rest(&self) -> &'a str {
        &self.source[self.column()..]
    }

    /// Split the line into label, mnemonic, operand and comment
    pub fn lex(mut self, line_number: usize) -> Result<SourceLine, LexError> {
        let mut line = SourceLine {
            line_number,
            ..SourceLine::default()
        };

        self.skip_whitespace();
        let mut word_column = self.column();
        let mut word = self.scan_while(|ch| !ch.is_whitespace() && ch != ';' && ch != ':');

        if self.peek() == Some(':') {
            validate_label(word, word_column)?;
            line.label = Some(word.to_string());
            self.advance();
            self.skip_whitespace();
            word_column = self.column();
            word = self.scan_while(|ch| !ch.is_whitespace() && ch != ';');
        }

        if !word.is_empty() {
            if word.len() != 3 || !word.chars().all(|ch| ch.is_ascii_alphabetic()) {
                return Err(LexError::InvalidMnemonic {
                    mnemonic: word.to_string(),
                    column: word_column,
                });
            }
            line.mnemonic = Some(word.to_ascii_uppercase());
            line.mnemonic_column = word_column;

            self.skip_whitespace();
            line.operand_column = self.column();
            let operand = self.scan_while(|ch| !ch.is_whitespace() && ch != ';');
            line.operand = Some(operand.to_string());
        }

        self.skip_whitespace();
        match self.peek() {
            None => {}
            Some(';') => {
                self.advance();
                line.comment = Some(self.rest().to_string());
            }
            Some(_) => {
                return Err(LexError::TrailingCharacters {
                    text: self.rest().trim_end().to_string(),
                    column: self.column(),
                });
            }
        }

        Ok(line)
    }
}

/// Labels are non-empty and purely alphanumeric
fn validate_label(name: &str, column: usize) -> Result<(), LexError> {
    if name.is_empty() {
        return Err(LexError::EmptyLabel { column });
    }

    if !name.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(LexError::InvalidLabel {
            label: name.to_string(),
            column,
        });
    }

    Ok(())
}

/// The label a line starts with, if it is well formed
///
/// Only looks as far as the `:`, so it still answers for lines whose mnemonic or
/// operand is malformed.
pub fn leading_label(text: &str) -> Option<&str> {
    let mut lexer = Lexer::new(text);
    lexer.skip_whitespace();
    let column = lexer.column();
    let word = lexer.scan_while(|ch| !ch.is_whitespace() && ch != ';' && ch != ':');

    (lexer.peek() == Some(':') && validate_label(word, column).is_ok()).then_some(word)
}

/// Split one line of source text
pub fn lex_line(line_number: usize, text: &str) -> Result<SourceLine, LexError> {
    Lexer::new(text).lex(line_number)
}
