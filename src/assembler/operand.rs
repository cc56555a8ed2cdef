//! Operand classification
//!
//! Maps an operand's literal text to one of the 13 addressing modes together with
//! its payload. Rules are tried in priority order:
//!
//! | Text            | Mode        | Payload |
//! |-----------------|-------------|---------|
//! | *(empty)*       | Implicit    | -       |
//! | `A`             | Accumulator | -       |
//! | `#$hh`, `#hh`   | Immediate   | `u8`    |
//! | `*-5`, `*FB`    | Relative    | `i8`    |
//! | `($hh)`         | Indirect    | `u8`    |
//! | `($hh,X)`       | IndirectX   | `u8`    |
//! | `($hh),Y`       | IndirectY   | `u8`    |
//! | `$hh[,X/,Y]`    | ZeroPage*   | `u8`    |
//! | `$hhhh[,X/,Y]`  | Absolute*   | `u16`   |
//!
//! Zero page and absolute are told apart by hex digit count alone.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::addressing::AddressingMode;
use crate::assembler::ErrorType;

/// A classified operand. The payload type always matches the mode's width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Implicit,
    Accumulator,
    Immediate(u8),
    ZeroPage(u8),
    ZeroPageX(u8),
    ZeroPageY(u8),
    Relative(i8),
    Absolute(u16),
    AbsoluteX(u16),
    AbsoluteY(u16),
    Indirect(u8),
    IndirectX(u8),
    IndirectY(u8),
}

impl Operand {
    pub fn mode(&self) -> AddressingMode {
        match self {
            Operand::Implicit => AddressingMode::Implicit,
            Operand::Accumulator => AddressingMode::Accumulator,
            Operand::Immediate(_) => AddressingMode::Immediate,
            Operand::ZeroPage(_) => AddressingMode::ZeroPage,
            Operand::ZeroPageX(_) => AddressingMode::ZeroPageX,
            Operand::ZeroPageY(_) => AddressingMode::ZeroPageY,
            Operand::Relative(_) => AddressingMode::Relative,
            Operand::Absolute(_) => AddressingMode::Absolute,
            Operand::AbsoluteX(_) => AddressingMode::AbsoluteX,
            Operand::AbsoluteY(_) => AddressingMode::AbsoluteY,
            Operand::Indirect(_) => AddressingMode::Indirect,
            Operand::IndirectX(_) => AddressingMode::IndirectX,
            Operand::IndirectY(_) => AddressingMode::IndirectY,
        }
    }

    /// Payload in machine byte order: low byte first, two's complement for
    /// relative offsets. Empty for Implicit and Accumulator.
    pub fn payload(&self) -> Vec<u8> {
        match *self {
            Operand::Implicit | Operand::Accumulator => Vec::new(),
            Operand::Immediate(v)
            | Operand::ZeroPage(v)
            | Operand::ZeroPageX(v)
            | Operand::ZeroPageY(v)
            | Operand::Indirect(v)
            | Operand::IndirectX(v)
            | Operand::IndirectY(v) => vec![v],
            Operand::Relative(offset) => vec![offset as u8],
            Operand::Absolute(v) | Operand::AbsoluteX(v) | Operand::AbsoluteY(v) => {
                v.to_le_bytes().to_vec()
            }
        }
    }
}

/// Canonical source form; [`classify`] reads it back to the same operand.
impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Implicit => Ok(()),
            Operand::Accumulator => f.write_str("A"),
            Operand::Immediate(v) => write!(f, "#${:02X}", v),
            Operand::ZeroPage(v) => write!(f, "${:02X}", v),
            Operand::ZeroPageX(v) => write!(f, "${:02X},X", v),
            Operand::ZeroPageY(v) => write!(f, "${:02X},Y", v),
            Operand::Relative(offset) => write!(f, "*{:+}", offset),
            Operand::Absolute(v) => write!(f, "${:04X}", v),
            Operand::AbsoluteX(v) => write!(f, "${:04X},X", v),
            Operand::AbsoluteY(v) => write!(f, "${:04X},Y", v),
            Operand::Indirect(v) => write!(f, "(${:02X})", v),
            Operand::IndirectX(v) => write!(f, "(${:02X},X)", v),
            Operand::IndirectY(v) => write!(f, "(${:02X}),Y", v),
        }
    }
}

impl FromStr for Operand {
    type Err = OperandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        classify(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperandError {
    #[error("unrecognized operand '{0}'")]
    Unrecognized(String),

    #[error("invalid hex literal '{0}'")]
    InvalidHex(String),

    #[error("hex literal '{0}' must have 2 or 4 digits")]
    HexDigitCount(String),

    #[error("invalid relative offset '{0}': expected a signed decimal of at most 4 characters")]
    InvalidDecimal(String),

    #[error("relative offset {0} is outside -128..127")]
    RelativeOutOfRange(i32),

    #[error("'{0}' does not fit in one byte")]
    ByteOutOfRange(String),
}

impl OperandError {
    pub fn kind(&self) -> ErrorType {
        match self {
            OperandError::RelativeOutOfRange(_) | OperandError::ByteOutOfRange(_) => {
                ErrorType::RangeError
            }
            _ => ErrorType::OperandFormat,
        }
    }
}

/// Classify operand text into an [`Operand`]
///
/// # Examples
///
/// ```
/// use libasm6502::assembler::operand::{classify, Operand};
///
/// assert_eq!(classify("").unwrap(), Operand::Implicit);
/// assert_eq!(classify("$3F").unwrap(), Operand::ZeroPage(0x3F));
/// assert_eq!(classify("$003F").unwrap(), Operand::Absolute(0x003F));
/// assert_eq!(classify("($40),Y").unwrap(), Operand::IndirectY(0x40));
/// assert_eq!(classify("*-128").unwrap(), Operand::Relative(-128));
/// assert!(classify("*128").is_err());
/// ```
pub fn classify(text: &str) -> Result<Operand, OperandError> {
    let upper = text.trim().to_ascii_uppercase();
    let text = upper.as_str();

    if text.is_empty() {
        return Ok(Operand::Implicit);
    }

    if text == "A" {
        return Ok(Operand::Accumulator);
    }

    if let Some(rest) = text.strip_prefix('#') {
        let digits = rest.strip_prefix('$').unwrap_or(rest);
        return byte_literal(digits, rest).map(Operand::Immediate);
    }

    if let Some(rest) = text.strip_prefix('*') {
        return relative_offset(rest).map(Operand::Relative);
    }

    if let Some(rest) = text.strip_prefix('(') {
        return classify_indirect(rest, text);
    }

    if let Some(rest) = text.strip_prefix('$') {
        let (digits, index) = split_index(rest);
        return match (hex_literal(digits)?, index) {
            (Literal::Byte(v), None) => Ok(Operand::ZeroPage(v)),
            (Literal::Byte(v), Some('X')) => Ok(Operand::ZeroPageX(v)),
            (Literal::Byte(v), Some(_)) => Ok(Operand::ZeroPageY(v)),
            (Literal::Word(v), None) => Ok(Operand::Absolute(v)),
            (Literal::Word(v), Some('X')) => Ok(Operand::AbsoluteX(v)),
            (Literal::Word(v), Some(_)) => Ok(Operand::AbsoluteY(v)),
        };
    }

    Err(OperandError::Unrecognized(text.to_string()))
}

/// `($hh)`, `($hh,X)` and `($hh),Y`; `rest` follows the opening parenthesis
fn classify_indirect(rest: &str, text: &str) -> Result<Operand, OperandError> {
    let pointer = |inner: &str| -> Result<u8, OperandError> {
        let digits = inner
            .strip_prefix('$')
            .ok_or_else(|| OperandError::Unrecognized(text.to_string()))?;
        byte_literal(digits, inner)
    };

    if let Some(inner) = rest.strip_suffix(",X)") {
        pointer(inner).map(Operand::IndirectX)
    } else if let Some(inner) = rest.strip_suffix("),Y") {
        pointer(inner).map(Operand::IndirectY)
    } else if let Some(inner) = rest.strip_suffix(')') {
        pointer(inner).map(Operand::Indirect)
    } else {
        Err(OperandError::Unrecognized(text.to_string()))
    }
}

/// Split a trailing `,X` or `,Y` index off a direct operand
fn split_index(text: &str) -> (&str, Option<char>) {
    if let Some(digits) = text.strip_suffix(",X") {
        (digits, Some('X'))
    } else if let Some(digits) = text.strip_suffix(",Y") {
        (digits, Some('Y'))
    } else {
        (text, None)
    }
}

/// A hex literal, sized by its digit count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Literal {
    Byte(u8),
    Word(u16),
}

fn hex_literal(digits: &str) -> Result<Literal, OperandError> {
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(OperandError::InvalidHex(format!("${}", digits)));
    }

    match digits.len() {
        2 => u8::from_str_radix(digits, 16)
            .map(Literal::Byte)
            .map_err(|_| OperandError::InvalidHex(format!("${}", digits))),
        4 => u16::from_str_radix(digits, 16)
            .map(Literal::Word)
            .map_err(|_| OperandError::InvalidHex(format!("${}", digits))),
        _ => Err(OperandError::HexDigitCount(format!("${}", digits))),
    }
}

/// A one-byte hex literal; four digits are a range error, not a format error
fn byte_literal(digits: &str, shown: &str) -> Result<u8, OperandError> {
    match hex_literal(digits)? {
        Literal::Byte(v) => Ok(v),
        Literal::Word(_) => Err(OperandError::ByteOutOfRange(shown.to_string())),
    }
}

/// Relative offsets are signed decimals (`*-5`, `*+12`). Two hex digits (`*FB`,
/// `*$10`) are taken as the raw two's complement byte.
fn relative_offset(text: &str) -> Result<i8, OperandError> {
    if let Some(digits) = text.strip_prefix('$') {
        return byte_literal(digits, text).map(|v| v as i8);
    }

    let looks_hex = text.len() == 2
        && text.chars().all(|ch| ch.is_ascii_hexdigit())
        && text.chars().any(|ch| ch.is_ascii_alphabetic());
    if looks_hex {
        return byte_literal(text, text).map(|v| v as i8);
    }

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned.is_empty() || text.len() > 4 || !unsigned.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(OperandError::InvalidDecimal(text.to_string()));
    }

    let value: i32 = text
        .parse()
        .map_err(|_| OperandError::InvalidDecimal(text.to_string()))?;
    i8::try_from(value).map_err(|_| OperandError::RelativeOutOfRange(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_every_mode() {
        let cases = [
            ("", Operand::Implicit),
            ("A", Operand::Accumulator),
            ("#$01", Operand::Immediate(0x01)),
            ("#7f", Operand::Immediate(0x7F)),
            ("$3F", Operand::ZeroPage(0x3F)),
            ("$3F,X", Operand::ZeroPageX(0x3F)),
            ("$3f,y", Operand::ZeroPageY(0x3F)),
            ("*-5", Operand::Relative(-5)),
            ("$1234", Operand::Absolute(0x1234)),
            ("$1234,X", Operand::AbsoluteX(0x1234)),
            ("$1234,Y", Operand::AbsoluteY(0x1234)),
            ("($FC)", Operand::Indirect(0xFC)),
            ("($40,X)", Operand::IndirectX(0x40)),
            ("($40),Y", Operand::IndirectY(0x40)),
        ];
        for (text, expected) in cases {
            assert_eq!(classify(text), Ok(expected), "operand {:?}", text);
        }
    }

    #[test]
    fn test_zero_page_vs_absolute_by_digit_count() {
        assert_eq!(classify("$00").unwrap().mode(), AddressingMode::ZeroPage);
        assert_eq!(classify("$0000").unwrap().mode(), AddressingMode::Absolute);
        assert_eq!(
            classify("$123"),
            Err(OperandError::HexDigitCount("$123".to_string()))
        );
        assert_eq!(
            classify("$12345").unwrap_err().kind(),
            ErrorType::OperandFormat
        );
    }

    #[test]
    fn test_relative_bounds() {
        assert_eq!(classify("*-128"), Ok(Operand::Relative(-128)));
        assert_eq!(classify("*127"), Ok(Operand::Relative(127)));
        assert_eq!(classify("*+127"), Ok(Operand::Relative(127)));
        assert_eq!(classify("*0"), Ok(Operand::Relative(0)));

        let err = classify("*-129").unwrap_err();
        assert_eq!(err, OperandError::RelativeOutOfRange(-129));
        assert_eq!(err.kind(), ErrorType::RangeError);
        assert_eq!(classify("*128").unwrap_err().kind(), ErrorType::RangeError);
    }

    #[test]
    fn test_relative_hex_byte() {
        assert_eq!(classify("*FB"), Ok(Operand::Relative(-5)));
        assert_eq!(classify("*$10"), Ok(Operand::Relative(16)));
        assert_eq!(classify("*10"), Ok(Operand::Relative(10)));
    }

    #[test]
    fn test_relative_malformed() {
        for text in ["*", "*-", "*+-1", "*12345", "*1.5", "*-1000"] {
            assert_eq!(
                classify(text).unwrap_err().kind(),
                ErrorType::OperandFormat,
                "operand {:?}",
                text
            );
        }
    }

    #[test]
    fn test_byte_fields_reject_words() {
        let err = classify("#$1234").unwrap_err();
        assert_eq!(err.kind(), ErrorType::RangeError);
        assert_eq!(classify("($1234)").unwrap_err().kind(), ErrorType::RangeError);
    }

    #[test]
    fn test_unrecognized() {
        for text in ["B", "X", "($40", "($40,Y)", "40", "%0101", "($40),X", "LABEL"] {
            assert_eq!(
                classify(text).unwrap_err().kind(),
                ErrorType::OperandFormat,
                "operand {:?}",
                text
            );
        }
        assert_eq!(classify("$GG"), Err(OperandError::InvalidHex("$GG".to_string())));
    }

    #[test]
    fn test_payload_is_little_endian() {
        assert_eq!(Operand::Absolute(0x1234).payload(), vec![0x34, 0x12]);
        assert_eq!(Operand::Relative(-5).payload(), vec![0xFB]);
        assert!(Operand::Accumulator.payload().is_empty());
    }

    #[test]
    fn test_display_reads_back() {
        for op in [
            Operand::Implicit,
            Operand::Relative(-128),
            Operand::Relative(5),
            Operand::IndirectY(0x0A),
            Operand::AbsoluteX(0xBEEF),
        ] {
            assert_eq!(op.to_string().parse::<Operand>(), Ok(op));
        }
    }
}
