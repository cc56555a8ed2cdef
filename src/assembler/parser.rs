//! Assembly source parser
//!
//! Turns one line of text into an [`AssemblyLine`]: the lexer splits it, then the
//! operand text is classified into an addressing mode. Lines are independent of
//! each other, so every line can be parsed in isolation.

use crate::assembler::lexer::{leading_label, lex_line};
use crate::assembler::operand::{classify, Operand};
use crate::assembler::AssemblerError;

/// A parsed line of assembly source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyLine {
    /// Line number in source (1-indexed)
    pub line_number: usize,

    /// Optional label definition (e.g., "start" from "start:")
    pub label: Option<String>,

    /// Optional instruction
    pub instruction: Option<Instruction>,

    /// Optional comment text (after semicolon)
    pub comment: Option<String>,
}

/// A mnemonic with its classified operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Upper case three-letter mnemonic
    pub mnemonic: String,

    pub operand: Operand,

    /// Column of the mnemonic, for diagnostics
    pub column: usize,
}

/// Parse one line of source text
///
/// # Examples
///
/// ```
/// use libasm6502::assembler::{parse_line, Operand};
///
/// let line = parse_line(4, "copy: sta $0200,x").unwrap();
/// let instruction = line.instruction.unwrap();
/// assert_eq!(line.label.as_deref(), Some("copy"));
/// assert_eq!(instruction.mnemonic, "STA");
/// assert_eq!(instruction.operand, Operand::AbsoluteX(0x0200));
/// ```
pub fn parse_line(line_number: usize, text: &str) -> Result<AssemblyLine, AssemblerError> {
    let source = lex_line(line_number, text)
        .map_err(|e| AssemblerError::new(e.kind(), line_number, e.column(), e.to_string()))?;

    let instruction = match source.mnemonic {
        Some(mnemonic) => {
            let operand_text = source.operand.as_deref().unwrap_or("");
            let operand = classify(operand_text).map_err(|e| {
                AssemblerError::new(e.kind(), line_number, source.operand_column, e.to_string())
            })?;
            Some(Instruction {
                mnemonic,
                operand,
                column: source.mnemonic_column,
            })
        }
        None => None,
    };

    Ok(AssemblyLine {
        line_number,
        label: source.label,
        instruction,
        comment: source.comment,
    })
}

/// The label-only remains of a line that failed to parse
///
/// A failed line contributes no bytes, but its label is still defined so that a
/// later definition of the same name is reported as a duplicate.
pub fn recover_label(line_number: usize, text: &str) -> Option<AssemblyLine> {
    leading_label(text).map(|label| AssemblyLine {
        line_number,
        label: Some(label.to_string()),
        instruction: None,
        comment: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ErrorType;

    #[test]
    fn test_parse_instruction_line() {
        let line = parse_line(1, "LDA #$01 ; one").unwrap();
        assert_eq!(line.label, None);
        assert_eq!(line.comment.as_deref(), Some(" one"));
        assert_eq!(
            line.instruction,
            Some(Instruction {
                mnemonic: "LDA".to_string(),
                operand: Operand::Immediate(0x01),
                column: 0,
            })
        );
    }

    #[test]
    fn test_parse_implicit_and_accumulator() {
        let nop = parse_line(1, "nop").unwrap().instruction.unwrap();
        assert_eq!(nop.operand, Operand::Implicit);

        let asl = parse_line(1, "ASL A").unwrap().instruction.unwrap();
        assert_eq!(asl.operand, Operand::Accumulator);
    }

    #[test]
    fn test_parse_empty_lines() {
        let line = parse_line(9, "").unwrap();
        assert_eq!(line.line_number, 9);
        assert!(line.label.is_none() && line.instruction.is_none() && line.comment.is_none());
    }

    #[test]
    fn test_operand_errors_carry_operand_column() {
        let err = parse_line(5, "    LDA $12Z").unwrap_err();
        assert_eq!(err.error_type, ErrorType::OperandFormat);
        assert_eq!(err.line, 5);
        assert_eq!(err.column, 8);
    }

    #[test]
    fn test_recover_label_from_failed_line() {
        let text = "loop: LDA $12Z";
        assert!(parse_line(3, text).is_err());

        let line = recover_label(3, text).unwrap();
        assert_eq!(line.line_number, 3);
        assert_eq!(line.label.as_deref(), Some("loop"));
        assert!(line.instruction.is_none());

        assert!(recover_label(4, "LDA $12Z").is_none());
    }

    #[test]
    fn test_lex_errors_are_syntax_errors() {
        let err = parse_line(2, "LDA #$01 extra").unwrap_err();
        assert_eq!(err.error_type, ErrorType::SyntaxError);
        assert_eq!(err.column, 9);
    }
}
