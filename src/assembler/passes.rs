//! The two assembly passes
//!
//! Pass 1 is a left-to-right fold over the parsed lines. The running address is
//! part of the fold state, so it is never shared or global. Pass 2 only reads what
//! pass 1 produced.

use crate::assembler::encoder::{check_field_width, encode_instruction, EncodedInstruction};
use crate::assembler::operand::Operand;
use crate::assembler::parser::AssemblyLine;
use crate::assembler::symbol_table::SymbolTable;
use crate::assembler::{AssemblerError, ErrorType};
use crate::opcodes::{OpcodeEntry, OpcodeTable};

/// One past the highest addressable byte
const ADDRESS_SPACE_END: u32 = 0x1_0000;

/// An instruction with its address and opcode resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedInstruction {
    pub line_number: usize,

    /// Column of the mnemonic, for diagnostics
    pub column: usize,

    pub address: u16,
    pub mnemonic: String,
    pub operand: Operand,
    pub entry: OpcodeEntry,
}

/// Fold state and result of pass 1
#[derive(Debug, Clone)]
pub struct AddressAssignment {
    /// Instructions in source order
    pub placed: Vec<PlacedInstruction>,

    /// Every label and its address
    pub symbols: SymbolTable,

    /// Running address; one past the last placed byte once the fold is done
    pub end_address: u32,

    pub errors: Vec<AssemblerError>,

    /// Set once the address space overflow has been reported
    overflowed: bool,
}

impl AddressAssignment {
    fn new(origin: u16) -> Self {
        Self {
            placed: Vec::new(),
            symbols: SymbolTable::new(),
            end_address: origin as u32,
            errors: Vec::new(),
            overflowed: false,
        }
    }

    fn report_overflow(&mut self, line: usize, column: usize, message: String) {
        if !self.overflowed {
            self.overflowed = true;
            self.errors
                .push(AssemblerError::new(ErrorType::RangeError, line, column, message));
        }
    }
}

/// Pass 1: assign addresses and build the symbol table
///
/// Instruction lengths come from the opcode table (`1 + operand field width`).
pub fn assign_addresses<T>(lines: &[AssemblyLine], table: &T, origin: u16) -> AddressAssignment
where
    T: OpcodeTable + ?Sized,
{
    lines
        .iter()
        .fold(AddressAssignment::new(origin), |state, line| {
            place_line(state, line, table)
        })
}

fn place_line<T>(mut state: AddressAssignment, line: &AssemblyLine, table: &T) -> AddressAssignment
where
    T: OpcodeTable + ?Sized,
{
    let address = state.end_address;

    if let Some(label) = &line.label {
        match u16::try_from(address) {
            Ok(address) => {
                if let Err(existing) =
                    state
                        .symbols
                        .add_symbol(label.clone(), address, line.line_number)
                {
                    state.errors.push(AssemblerError::new(
                        ErrorType::DuplicateLabel,
                        line.line_number,
                        0,
                        format!(
                            "label '{}' already defined on line {}",
                            label, existing.defined_at
                        ),
                    ));
                }
            }
            Err(_) => state.report_overflow(
                line.line_number,
                0,
                format!("label '{}' is past the end of the address space", label),
            ),
        }
    }

    let Some(instruction) = &line.instruction else {
        return state;
    };

    let entry = match table.lookup(&instruction.mnemonic, instruction.operand.mode()) {
        Ok(entry) => entry,
        Err(err) => {
            state.errors.push(AssemblerError::new(
                err.kind(),
                line.line_number,
                instruction.column,
                err.to_string(),
            ));
            return state;
        }
    };

    if let Err(err) = check_field_width(instruction.operand.mode(), entry.operand_bytes) {
        state.errors.push(AssemblerError::new(
            err.kind(),
            line.line_number,
            instruction.column,
            err.to_string(),
        ));
        return state;
    }

    let end = address + entry.size_bytes() as u32;
    state.end_address = end;

    match u16::try_from(address) {
        Ok(start) if end <= ADDRESS_SPACE_END => {
            log::trace!(
                "line {}: ${:04X} {} ({} byte(s))",
                line.line_number,
                start,
                instruction.mnemonic,
                entry.size_bytes()
            );
            state.placed.push(PlacedInstruction {
                line_number: line.line_number,
                column: instruction.column,
                address: start,
                mnemonic: instruction.mnemonic.clone(),
                operand: instruction.operand,
                entry,
            });
        }
        _ => state.report_overflow(
            line.line_number,
            instruction.column,
            format!(
                "{} at ${:X} runs past the end of the address space ($FFFF)",
                instruction.mnemonic, address
            ),
        ),
    }

    state
}

/// Pass 2: encode every placed instruction
pub fn emit(placed: &[PlacedInstruction]) -> (Vec<EncodedInstruction>, Vec<AssemblerError>) {
    let mut instructions = Vec::with_capacity(placed.len());
    let mut errors = Vec::new();

    for instruction in placed {
        match encode_instruction(instruction) {
            Ok(encoded) => instructions.push(encoded),
            Err(err) => errors.push(AssemblerError::new(
                err.kind(),
                instruction.line_number,
                instruction.column,
                err.to_string(),
            )),
        }
    }

    (instructions, errors)
}
