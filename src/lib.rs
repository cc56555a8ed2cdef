//! # 6502 Assembler Core
//!
//! A two-pass assembler for the MOS Technology 6502, designed for modularity,
//! clarity, and WebAssembly portability.
//!
//! This crate turns line-oriented assembly source into machine code. Opcode
//! knowledge is injected through the [`OpcodeTable`] trait, so the same assembler
//! drives the documented NMOS set or any other table with the same addressing modes.
//!
//! ## Quick Start
//!
//! ```rust
//! use libasm6502::assemble;
//!
//! let program = assemble("loop: DEX\n      BNE *FD").unwrap();
//!
//! assert_eq!(program.bytes, vec![0xCA, 0xD0, 0xFD]);
//! assert_eq!(program.symbol_table.lookup_symbol("loop").unwrap().address, 0x0000);
//! ```
//!
//! ## Custom opcode tables
//!
//! ```rust
//! use libasm6502::{AddressingMode, Assembler, OpcodeMap, OpcodeTable};
//!
//! let table = OpcodeMap::new().with("NOP", AddressingMode::Implicit, 0xEA, 0);
//! assert_eq!(table.lookup("nop", AddressingMode::Implicit).unwrap().opcode, 0xEA);
//!
//! let errors = Assembler::new(table).assemble("LDA #$01").unwrap_err();
//! assert_eq!(errors[0].line, 1);
//! ```
//!
//! ## Architecture
//!
//! - **Lexing**: each line splits into label, mnemonic, operand and comment
//! - **Classification**: operand text maps to exactly one of 13 addressing modes
//! - **Pass 1**: a fold assigns addresses and builds the symbol table
//! - **Pass 2**: opcode and little-endian operand bytes are emitted
//!
//! Any diagnostic fails the whole assembly; every diagnostic found is reported.
//!
//! ## Modules
//!
//! - `addressing` - Addressing mode enumeration
//! - `opcodes` - Opcode table trait and the NMOS 6502 table
//! - `assembler` - Lexer, operand classifier, passes, encoder, listing
//! - `wasm` - JavaScript bindings (feature `wasm`)

pub mod addressing;
pub mod assembler;
pub mod opcodes;
pub mod wasm;

// Re-export public API
pub use addressing::AddressingMode;
pub use assembler::{
    assemble, assemble_lines, AddressRange, Assembler, AssemblerError, AssemblerOptions,
    EncodedInstruction, ErrorType, Operand, Program, SourceLocation, SourceMap, Symbol,
    SymbolTable,
};
pub use opcodes::{LookupError, OpcodeEntry, OpcodeMap, OpcodeTable};
