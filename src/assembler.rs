//! 6502 Assembler Module
//!
//! Converts line-oriented assembly source into binary machine code in two passes:
//!
//! 1. Every line is lexed and its operand classified ([`parser::parse_line`]).
//! 2. **Pass 1** folds over the lines with a running address, recording labels in the
//!    [`SymbolTable`] and sizing each instruction through the [`OpcodeTable`].
//! 3. **Pass 2** encodes each placed instruction into its opcode and operand bytes.
//!
//! Diagnostics are collected per line instead of stopping at the first problem. The
//! output is all-or-nothing: any diagnostic means no bytes are produced.

pub mod encoder;
pub mod lexer;
pub mod listing;
pub mod operand;
pub mod parser;
pub mod passes;
pub mod source_map;
pub mod symbol_table;

use thiserror::Error;

use crate::opcodes::{OpcodeMap, OpcodeTable};

pub use encoder::EncodedInstruction;
pub use lexer::{lex_line, SourceLine};
pub use operand::{classify, Operand, OperandError};
pub use parser::{parse_line, recover_label, AssemblyLine, Instruction};
pub use source_map::{AddressRange, SourceLocation, SourceMap};
pub use symbol_table::SymbolTable;

/// A symbol table entry mapping a label to an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Label name (case-sensitive)
    pub name: String,

    /// Resolved memory address for this label
    pub address: u16,

    /// Source line where label was defined
    pub defined_at: usize,
}

/// An error encountered during assembly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct AssemblerError {
    /// Error type classification
    pub error_type: ErrorType,

    /// Line number where error occurred (1-indexed)
    pub line: usize,

    /// Column number where error starts (0-indexed)
    pub column: usize,

    /// Human-readable error message
    pub message: String,
}

impl AssemblerError {
    pub fn new(error_type: ErrorType, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            error_type,
            line,
            column,
            message: message.into(),
        }
    }
}

/// Classification of assembly errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed line structure (bad label, bad mnemonic shape, trailing text)
    SyntaxError,

    /// Mnemonic not present in the opcode table
    UnknownMnemonic,

    /// Mnemonic exists but has no opcode for the operand's addressing mode
    UnsupportedAddressingMode,

    /// Operand text matches no addressing mode, or a literal is malformed
    OperandFormat,

    /// Value outside its field (relative offset, literal width, address space)
    RangeError,

    /// Label defined more than once
    DuplicateLabel,
}

/// Options controlling assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Address assigned to the first instruction
    pub origin: u16,

    /// Cap on the number of diagnostics returned (assembly still fails either way)
    pub max_errors: Option<usize>,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            origin: 0x0000,
            max_errors: None,
        }
    }
}

/// Complete output from assembling source code
#[derive(Debug, Clone)]
pub struct Program {
    /// Address of the first byte
    pub origin: u16,

    /// Assembled machine code bytes
    pub bytes: Vec<u8>,

    /// Encoded instructions in source order
    pub instructions: Vec<EncodedInstruction>,

    /// Every label defined by the source
    pub symbol_table: SymbolTable,

    /// Source map for debugging
    pub source_map: SourceMap,
}

impl Program {
    fn new(origin: u16, instructions: Vec<EncodedInstruction>, symbol_table: SymbolTable) -> Self {
        let bytes = instructions.iter().flat_map(|instr| instr.bytes()).collect();
        let source_map = SourceMap::from_instructions(&instructions);
        Self {
            origin,
            bytes,
            instructions,
            symbol_table,
            source_map,
        }
    }

    /// Defined symbols in definition order
    pub fn symbols(&self) -> &[Symbol] {
        self.symbol_table.symbols()
    }

    /// Address one past the last emitted byte
    pub fn end_address(&self) -> u32 {
        self.origin as u32 + self.bytes.len() as u32
    }

    /// Source location of the instruction covering `address`
    pub fn get_source_location(&self, address: u16) -> Option<SourceLocation> {
        self.source_map.get_source_location(address)
    }

    /// Address range emitted by a source line
    pub fn get_address_range(&self, line: usize) -> Option<AddressRange> {
        self.source_map.get_address_range(line)
    }

    /// Human-readable listing of addresses, bytes and source
    pub fn listing(&self) -> String {
        listing::format_listing(self)
    }
}

/// Driver stages. `Failed` is terminal and entered instead of `Done` when any
/// diagnostic was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblyState {
    Start,
    Lexing,
    Pass1,
    Pass2,
    Done,
    Failed,
}

impl AssemblyState {
    fn enter(&mut self, next: AssemblyState) {
        debug_assert!(
            !matches!(*self, AssemblyState::Done | AssemblyState::Failed),
            "no transition out of a terminal state"
        );
        log::debug!("assembler: {:?} -> {:?}", self, next);
        *self = next;
    }
}

/// Two-pass assembler over an injected opcode table
///
/// # Examples
///
/// ```
/// use libasm6502::{AddressingMode, Assembler, AssemblerOptions, OpcodeMap};
///
/// let table = OpcodeMap::new()
///     .with("LDA", AddressingMode::Immediate, 0xA9, 1)
///     .with("STA", AddressingMode::Absolute, 0x8D, 2);
/// let assembler = Assembler::new(table).with_options(AssemblerOptions {
///     origin: 0x0600,
///     ..Default::default()
/// });
///
/// let program = assembler.assemble("start: LDA #$01\n STA $0200").unwrap();
/// assert_eq!(program.bytes, vec![0xA9, 0x01, 0x8D, 0x00, 0x02]);
/// assert_eq!(program.symbol_table.lookup_symbol("start").unwrap().address, 0x0600);
/// ```
#[derive(Debug, Clone)]
pub struct Assembler<T> {
    table: T,
    options: AssemblerOptions,
}

impl<T: OpcodeTable> Assembler<T> {
    pub fn new(table: T) -> Self {
        Self {
            table,
            options: AssemblerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AssemblerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Assemble newline-separated source text
    pub fn assemble(&self, source: &str) -> Result<Program, Vec<AssemblerError>> {
        self.assemble_lines(source.lines())
    }

    /// Assemble an ordered sequence of source lines
    ///
    /// Line numbers in diagnostics are 1-indexed positions in `lines`.
    pub fn assemble_lines<I, S>(&self, lines: I) -> Result<Program, Vec<AssemblerError>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = AssemblyState::Start;
        let mut errors = Vec::new();

        state.enter(AssemblyState::Lexing);
        let mut parsed = Vec::new();
        for (index, text) in lines.into_iter().enumerate() {
            let (line_number, text) = (index + 1, text.as_ref());
            match parse_line(line_number, text) {
                Ok(line) => parsed.push(line),
                Err(err) => {
                    errors.push(err);
                    parsed.extend(recover_label(line_number, text));
                }
            }
        }

        state.enter(AssemblyState::Pass1);
        let pass1 = passes::assign_addresses(&parsed, &self.table, self.options.origin);
        errors.extend(pass1.errors);

        state.enter(AssemblyState::Pass2);
        let (instructions, pass2_errors) = passes::emit(&pass1.placed);
        errors.extend(pass2_errors);

        if !errors.is_empty() {
            state.enter(AssemblyState::Failed);
            errors.sort_by_key(|e| e.line);
            if let Some(max) = self.options.max_errors {
                errors.truncate(max);
            }
            log::debug!("assembly failed with {} diagnostic(s)", errors.len());
            return Err(errors);
        }

        state.enter(AssemblyState::Done);
        let program = Program::new(self.options.origin, instructions, pass1.symbols);
        log::debug!(
            "assembled {} byte(s), {} symbol(s)",
            program.bytes.len(),
            program.symbol_table.len()
        );
        Ok(program)
    }
}

impl Default for Assembler<OpcodeMap> {
    fn default() -> Self {
        Self::new(OpcodeMap::nmos6502())
    }
}

/// Assemble source code into machine code
///
/// Uses the documented NMOS 6502 opcodes and an origin of `$0000`.
///
/// # Returns
///
/// Ok(Program) on success, Err(Vec<AssemblerError>) on failure
pub fn assemble(source: &str) -> Result<Program, Vec<AssemblerError>> {
    Assembler::default().assemble(source)
}

/// Assemble an ordered sequence of lines with the given table and options
pub fn assemble_lines<T, I, S>(
    table: &T,
    options: AssemblerOptions,
    lines: I,
) -> Result<Program, Vec<AssemblerError>>
where
    T: OpcodeTable + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Assembler::new(table).with_options(options).assemble_lines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::AddressingMode;

    fn small_table() -> OpcodeMap {
        OpcodeMap::new()
            .with("LDA", AddressingMode::Immediate, 0xA9, 1)
            .with("DEX", AddressingMode::Implicit, 0xCA, 0)
            .with("BNE", AddressingMode::Relative, 0xD0, 1)
    }

    #[test]
    fn test_injected_table_is_used() {
        let program = Assembler::new(small_table()).assemble("LDA #$01").unwrap();
        assert_eq!(program.bytes, vec![0xA9, 0x01]);
    }

    #[test]
    fn test_relative_literal_is_not_recomputed() {
        let program = Assembler::new(small_table())
            .assemble("loop: DEX\nBNE *FB\n")
            .unwrap();
        assert_eq!(program.bytes, vec![0xCA, 0xD0, 0xFB]);
        assert_eq!(program.symbol_table.lookup_symbol("loop").unwrap().address, 0);
    }

    #[test]
    fn test_origin_moves_addresses_not_bytes() {
        let options = AssemblerOptions {
            origin: 0xC000,
            ..Default::default()
        };
        let program = Assembler::new(small_table())
            .with_options(options)
            .assemble("DEX\nhere: DEX")
            .unwrap();
        assert_eq!(program.bytes, vec![0xCA, 0xCA]);
        assert_eq!(program.instructions[1].address, 0xC001);
        assert_eq!(program.symbol_table.lookup_symbol("here").unwrap().address, 0xC001);
        assert_eq!(program.end_address(), 0xC002);
    }

    #[test]
    fn test_errors_sorted_and_capped() {
        let options = AssemblerOptions {
            max_errors: Some(2),
            ..Default::default()
        };
        let errors = Assembler::new(small_table())
            .with_options(options)
            .assemble("XYZ\nLDA #$01\nfoo-bar: DEX\nQQQ\n")
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line, 1);
        assert_eq!(errors[1].line, 3);
        assert_eq!(errors[1].error_type, ErrorType::SyntaxError);
    }

    #[test]
    fn test_label_on_failed_line_still_defined() {
        let errors = Assembler::new(small_table())
            .assemble("loop: LDA $12Z\nloop: DEX\nend: LDAX\nend: DEX")
            .unwrap_err();
        let found: Vec<_> = errors.iter().map(|e| (e.line, e.error_type)).collect();
        assert_eq!(
            found,
            vec![
                (1, ErrorType::OperandFormat),
                (2, ErrorType::DuplicateLabel),
                (3, ErrorType::SyntaxError),
                (4, ErrorType::DuplicateLabel),
            ]
        );
    }

    #[test]
    fn test_error_display_includes_line() {
        let err = AssemblerError::new(ErrorType::RangeError, 7, 4, "too far");
        assert_eq!(err.to_string(), "line 7: too far");
    }

    #[test]
    fn test_default_assembler_uses_nmos_table() {
        let program = assemble("LDA #$01").unwrap();
        assert_eq!(program.bytes, vec![0xA9, 0x01]);
    }
}
