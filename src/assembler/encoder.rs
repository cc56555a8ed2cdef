//! Instruction encoder for the 6502 assembler
//!
//! Emits the opcode byte followed by the operand field. Multi-byte fields are
//! little-endian: `$1234` is written `34 12`. The field width comes from the opcode
//! table; an operand narrower than its field is zero-extended, a wider one is
//! rejected.

use thiserror::Error;

use crate::addressing::AddressingMode;
use crate::assembler::operand::Operand;
use crate::assembler::passes::PlacedInstruction;
use crate::assembler::ErrorType;
use crate::opcodes::OpcodeEntry;

/// A fully encoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInstruction {
    /// Source line the instruction came from (1-indexed)
    pub line_number: usize,

    /// Column of the mnemonic (0-indexed)
    pub column: usize,

    /// Address of the opcode byte
    pub address: u16,

    /// Upper case mnemonic
    pub mnemonic: String,

    /// Operand as written in source
    pub operand: Operand,

    /// The opcode byte value (0x00-0xFF)
    pub opcode: u8,

    /// Operand bytes (0-2 bytes), low byte first
    pub operand_bytes: Vec<u8>,
}

impl EncodedInstruction {
    /// Total size in bytes (opcode + operands)
    pub fn size_bytes(&self) -> usize {
        1 + self.operand_bytes.len()
    }

    /// Opcode followed by operand bytes
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        std::iter::once(self.opcode).chain(self.operand_bytes.iter().copied())
    }

    /// Address one past the last byte
    pub fn end_address(&self) -> u32 {
        self.address as u32 + self.size_bytes() as u32
    }
}

/// Widest operand field a 6502 instruction has
pub const MAX_OPERAND_BYTES: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("{mode} operand needs {needed} byte(s) but the opcode's operand field is {field} byte(s)")]
    FieldTooNarrow {
        mode: AddressingMode,
        needed: u8,
        field: u8,
    },

    #[error("{mode} operand field of {field} byte(s) is wider than {max}", max = MAX_OPERAND_BYTES)]
    FieldTooWide { mode: AddressingMode, field: u8 },
}

impl EncodeError {
    pub fn kind(&self) -> ErrorType {
        ErrorType::RangeError
    }
}

/// Encode an operand into a field of `field_width` bytes
///
/// # Examples
///
/// ```
/// use libasm6502::assembler::encoder::encode_operand;
/// use libasm6502::assembler::Operand;
///
/// assert_eq!(encode_operand(&Operand::Absolute(0x1234), 2).unwrap(), vec![0x34, 0x12]);
/// assert_eq!(encode_operand(&Operand::Relative(-5), 1).unwrap(), vec![0xFB]);
/// assert_eq!(encode_operand(&Operand::Indirect(0xFC), 2).unwrap(), vec![0xFC, 0x00]);
/// assert!(encode_operand(&Operand::Absolute(0x0012), 1).is_err());
/// ```
pub fn encode_operand(operand: &Operand, field_width: u8) -> Result<Vec<u8>, EncodeError> {
    check_field_width(operand.mode(), field_width)?;

    let mut bytes = operand.payload();
    let needed = bytes.len() as u8;

    if needed > field_width {
        return Err(EncodeError::FieldTooNarrow {
            mode: operand.mode(),
            needed,
            field: field_width,
        });
    }

    bytes.resize(field_width as usize, 0x00);
    Ok(bytes)
}

/// Reject operand fields no instruction can have
pub fn check_field_width(mode: AddressingMode, field_width: u8) -> Result<(), EncodeError> {
    if field_width > MAX_OPERAND_BYTES {
        return Err(EncodeError::FieldTooWide {
            mode,
            field: field_width,
        });
    }
    Ok(())
}

/// Encode a full instruction: opcode byte, then the operand field
pub fn encode(entry: OpcodeEntry, operand: &Operand) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = vec![entry.opcode];
    bytes.extend(encode_operand(operand, entry.operand_bytes)?);
    Ok(bytes)
}

/// Encode an instruction placed by pass 1
pub fn encode_instruction(placed: &PlacedInstruction) -> Result<EncodedInstruction, EncodeError> {
    let operand_bytes = encode_operand(&placed.operand, placed.entry.operand_bytes)?;

    Ok(EncodedInstruction {
        line_number: placed.line_number,
        column: placed.column,
        address: placed.address,
        mnemonic: placed.mnemonic.clone(),
        operand: placed.operand,
        opcode: placed.entry.opcode,
        operand_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_zero_page_is_two_bytes() {
        let bytes = encode(OpcodeEntry::new(0xA5, 1), &Operand::ZeroPage(0x3F)).unwrap();
        assert_eq!(bytes, vec![0xA5, 0x3F]);
    }

    #[test]
    fn test_encode_absolute_low_byte_first() {
        let bytes = encode(OpcodeEntry::new(0xAD, 2), &Operand::Absolute(0x1234)).unwrap();
        assert_eq!(bytes, vec![0xAD, 0x34, 0x12]);
    }

    #[test]
    fn test_encode_implicit_and_accumulator() {
        assert_eq!(
            encode(OpcodeEntry::new(0xEA, 0), &Operand::Implicit).unwrap(),
            vec![0xEA]
        );
        assert_eq!(
            encode(OpcodeEntry::new(0x0A, 0), &Operand::Accumulator).unwrap(),
            vec![0x0A]
        );
    }

    #[test]
    fn test_encode_relative_twos_complement() {
        let bytes = encode(OpcodeEntry::new(0xD0, 1), &Operand::Relative(-128)).unwrap();
        assert_eq!(bytes, vec![0xD0, 0x80]);
        let bytes = encode(OpcodeEntry::new(0xD0, 1), &Operand::Relative(127)).unwrap();
        assert_eq!(bytes, vec![0xD0, 0x7F]);
    }

    #[test]
    fn test_field_too_narrow() {
        let err = encode(OpcodeEntry::new(0x00, 0), &Operand::Immediate(0x01)).unwrap_err();
        assert_eq!(
            err,
            EncodeError::FieldTooNarrow {
                mode: AddressingMode::Immediate,
                needed: 1,
                field: 0
            }
        );
        assert_eq!(err.kind(), ErrorType::RangeError);
    }

    #[test]
    fn test_field_too_wide() {
        let err = encode_operand(&Operand::Implicit, 255).unwrap_err();
        assert_eq!(
            err,
            EncodeError::FieldTooWide {
                mode: AddressingMode::Implicit,
                field: 255
            }
        );
        assert_eq!(err.kind(), ErrorType::RangeError);
        assert!(check_field_width(AddressingMode::Absolute, 2).is_ok());
    }

    #[test]
    fn test_encode_placed_instruction() {
        let placed = PlacedInstruction {
            line_number: 3,
            column: 4,
            address: 0x0600,
            mnemonic: "STA".to_string(),
            operand: Operand::AbsoluteY(0x0200),
            entry: OpcodeEntry::new(0x99, 2),
        };
        let encoded = encode_instruction(&placed).unwrap();
        assert_eq!(encoded.bytes().collect::<Vec<_>>(), vec![0x99, 0x00, 0x02]);
        assert_eq!(encoded.size_bytes(), 3);
        assert_eq!(encoded.end_address(), 0x0603);
        assert_eq!((encoded.line_number, encoded.column), (3, 4));
    }
}
