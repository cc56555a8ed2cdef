//! # Opcode Lookup
//!
//! The assembler core never decides opcode values itself. Every instruction is looked
//! up through the [`OpcodeTable`] trait, keyed on `(mnemonic, addressing mode)`, and
//! the answer carries both the opcode byte and the operand field width in bytes.
//!
//! [`OpcodeMap`] is a plain map-backed table callers can fill with their own entries.
//! [`OpcodeMap::nmos6502`] preloads it with the 151 documented NMOS 6502 opcodes.

use std::collections::HashMap;

use thiserror::Error;

use crate::addressing::AddressingMode;
use crate::assembler::ErrorType;

/// Result of a successful table lookup.
///
/// # Examples
///
/// ```
/// use libasm6502::{AddressingMode, OpcodeMap, OpcodeTable};
///
/// let table = OpcodeMap::nmos6502();
/// let lda = table.lookup("LDA", AddressingMode::Immediate).unwrap();
/// assert_eq!(lda.opcode, 0xA9);
/// assert_eq!(lda.operand_bytes, 1);
/// assert_eq!(lda.size_bytes(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    /// The opcode byte emitted first.
    pub opcode: u8,

    /// Width of the operand field that follows the opcode (0-2 bytes).
    pub operand_bytes: u8,
}

impl OpcodeEntry {
    pub const fn new(opcode: u8, operand_bytes: u8) -> Self {
        Self {
            opcode,
            operand_bytes,
        }
    }

    /// Total encoded length: opcode plus operand field.
    pub const fn size_bytes(&self) -> u16 {
        1 + self.operand_bytes as u16
    }
}

/// Why a `(mnemonic, mode)` pair has no opcode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),

    #[error("{mnemonic} does not support {mode} addressing")]
    UnsupportedMode {
        mnemonic: String,
        mode: AddressingMode,
    },
}

impl LookupError {
    pub fn kind(&self) -> ErrorType {
        match self {
            LookupError::UnknownMnemonic(_) => ErrorType::UnknownMnemonic,
            LookupError::UnsupportedMode { .. } => ErrorType::UnsupportedAddressingMode,
        }
    }
}

/// Lookup service mapping `(mnemonic, addressing mode)` to an opcode.
///
/// Mnemonics are passed in upper case. Implementations must distinguish a
/// mnemonic they have never heard of from a known mnemonic used with a mode it
/// doesn't support, since those are reported differently.
pub trait OpcodeTable {
    fn lookup(&self, mnemonic: &str, mode: AddressingMode) -> Result<OpcodeEntry, LookupError>;
}

impl<T: OpcodeTable + ?Sized> OpcodeTable for &T {
    fn lookup(&self, mnemonic: &str, mode: AddressingMode) -> Result<OpcodeEntry, LookupError> {
        (**self).lookup(mnemonic, mode)
    }
}

/// Map-backed [`OpcodeTable`].
#[derive(Debug, Clone, Default)]
pub struct OpcodeMap {
    entries: HashMap<String, HashMap<AddressingMode, OpcodeEntry>>,
}

impl OpcodeMap {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding every documented NMOS 6502 opcode.
    pub fn nmos6502() -> Self {
        NMOS_6502
            .iter()
            .map(|&(mnemonic, mode, opcode, width)| (mnemonic, mode, OpcodeEntry::new(opcode, width)))
            .collect()
    }

    /// Add or replace an entry, returning the entry it replaced.
    ///
    /// The mnemonic is stored upper case.
    pub fn insert(
        &mut self,
        mnemonic: &str,
        mode: AddressingMode,
        entry: OpcodeEntry,
    ) -> Option<OpcodeEntry> {
        self.entries
            .entry(mnemonic.to_ascii_uppercase())
            .or_default()
            .insert(mode, entry)
    }

    /// Builder form of [`insert`](Self::insert).
    ///
    /// ```
    /// use libasm6502::{AddressingMode, OpcodeMap, OpcodeTable};
    ///
    /// let table = OpcodeMap::new()
    ///     .with("LDA", AddressingMode::Immediate, 0xA9, 1)
    ///     .with("DEX", AddressingMode::Implicit, 0xCA, 0);
    /// assert_eq!(table.lookup("DEX", AddressingMode::Implicit).unwrap().opcode, 0xCA);
    /// assert!(table.lookup("DEX", AddressingMode::ZeroPage).is_err());
    /// ```
    pub fn with(mut self, mnemonic: &str, mode: AddressingMode, opcode: u8, operand_bytes: u8) -> Self {
        self.insert(mnemonic, mode, OpcodeEntry::new(opcode, operand_bytes));
        self
    }

    /// Number of `(mnemonic, mode)` entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the table knows the mnemonic in any mode
    pub fn contains_mnemonic(&self, mnemonic: &str) -> bool {
        self.entries.contains_key(&mnemonic.to_ascii_uppercase())
    }

    /// Addressing modes supported by a mnemonic, sorted.
    pub fn modes(&self, mnemonic: &str) -> Vec<AddressingMode> {
        let mut modes: Vec<_> = self
            .entries
            .get(&mnemonic.to_ascii_uppercase())
            .map(|by_mode| by_mode.keys().copied().collect())
            .unwrap_or_default();
        modes.sort();
        modes
    }
}

impl<'a> FromIterator<(&'a str, AddressingMode, OpcodeEntry)> for OpcodeMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, AddressingMode, OpcodeEntry)>>(iter: I) -> Self {
        let mut table = OpcodeMap::new();
        for (mnemonic, mode, entry) in iter {
            table.insert(mnemonic, mode, entry);
        }
        table
    }
}

impl OpcodeTable for OpcodeMap {
    fn lookup(&self, mnemonic: &str, mode: AddressingMode) -> Result<OpcodeEntry, LookupError> {
        let by_mode = self
            .entries
            .get(&mnemonic.to_ascii_uppercase())
            .ok_or_else(|| LookupError::UnknownMnemonic(mnemonic.to_string()))?;

        by_mode
            .get(&mode)
            .copied()
            .ok_or_else(|| LookupError::UnsupportedMode {
                mnemonic: mnemonic.to_string(),
                mode,
            })
    }
}

/// Documented NMOS 6502 opcodes: (mnemonic, mode, opcode, operand field width).
///
/// `JMP ($hh)` keeps the hardware's two-byte pointer field; the one-byte pointer
/// written in source is zero-extended by the encoder.
#[rustfmt::skip]
const NMOS_6502: &[(&str, AddressingMode, u8, u8)] = {
    use AddressingMode::*;
    &[
        ("ADC", IndirectX, 0x61, 1),
        ("ADC", ZeroPage, 0x65, 1),
        ("ADC", Immediate, 0x69, 1),
        ("ADC", Absolute, 0x6D, 2),
        ("ADC", IndirectY, 0x71, 1),
        ("ADC", ZeroPageX, 0x75, 1),
        ("ADC", AbsoluteY, 0x79, 2),
        ("ADC", AbsoluteX, 0x7D, 2),
        ("AND", IndirectX, 0x21, 1),
        ("AND", ZeroPage, 0x25, 1),
        ("AND", Immediate, 0x29, 1),
        ("AND", Absolute, 0x2D, 2),
        ("AND", IndirectY, 0x31, 1),
        ("AND", ZeroPageX, 0x35, 1),
        ("AND", AbsoluteY, 0x39, 2),
        ("AND", AbsoluteX, 0x3D, 2),
        ("ASL", ZeroPage, 0x06, 1),
        ("ASL", Accumulator, 0x0A, 0),
        ("ASL", Absolute, 0x0E, 2),
        ("ASL", ZeroPageX, 0x16, 1),
        ("ASL", AbsoluteX, 0x1E, 2),
        ("BCC", Relative, 0x90, 1),
        ("BCS", Relative, 0xB0, 1),
        ("BEQ", Relative, 0xF0, 1),
        ("BIT", ZeroPage, 0x24, 1),
        ("BIT", Absolute, 0x2C, 2),
        ("BMI", Relative, 0x30, 1),
        ("BNE", Relative, 0xD0, 1),
        ("BPL", Relative, 0x10, 1),
        ("BRK", Implicit, 0x00, 0),
        ("BVC", Relative, 0x50, 1),
        ("BVS", Relative, 0x70, 1),
        ("CLC", Implicit, 0x18, 0),
        ("CLD", Implicit, 0xD8, 0),
        ("CLI", Implicit, 0x58, 0),
        ("CLV", Implicit, 0xB8, 0),
        ("CMP", IndirectX, 0xC1, 1),
        ("CMP", ZeroPage, 0xC5, 1),
        ("CMP", Immediate, 0xC9, 1),
        ("CMP", Absolute, 0xCD, 2),
        ("CMP", IndirectY, 0xD1, 1),
        ("CMP", ZeroPageX, 0xD5, 1),
        ("CMP", AbsoluteY, 0xD9, 2),
        ("CMP", AbsoluteX, 0xDD, 2),
        ("CPX", Immediate, 0xE0, 1),
        ("CPX", ZeroPage, 0xE4, 1),
        ("CPX", Absolute, 0xEC, 2),
        ("CPY", Immediate, 0xC0, 1),
        ("CPY", ZeroPage, 0xC4, 1),
        ("CPY", Absolute, 0xCC, 2),
        ("DEC", ZeroPage, 0xC6, 1),
        ("DEC", Absolute, 0xCE, 2),
        ("DEC", ZeroPageX, 0xD6, 1),
        ("DEC", AbsoluteX, 0xDE, 2),
        ("DEX", Implicit, 0xCA, 0),
        ("DEY", Implicit, 0x88, 0),
        ("EOR", IndirectX, 0x41, 1),
        ("EOR", ZeroPage, 0x45, 1),
        ("EOR", Immediate, 0x49, 1),
        ("EOR", Absolute, 0x4D, 2),
        ("EOR", IndirectY, 0x51, 1),
        ("EOR", ZeroPageX, 0x55, 1),
        ("EOR", AbsoluteY, 0x59, 2),
        ("EOR", AbsoluteX, 0x5D, 2),
        ("INC", ZeroPage, 0xE6, 1),
        ("INC", Absolute, 0xEE, 2),
        ("INC", ZeroPageX, 0xF6, 1),
        ("INC", AbsoluteX, 0xFE, 2),
        ("INX", Implicit, 0xE8, 0),
        ("INY", Implicit, 0xC8, 0),
        ("JMP", Absolute, 0x4C, 2),
        ("JMP", Indirect, 0x6C, 2),
        ("JSR", Absolute, 0x20, 2),
        ("LDA", IndirectX, 0xA1, 1),
        ("LDA", ZeroPage, 0xA5, 1),
        ("LDA", Immediate, 0xA9, 1),
        ("LDA", Absolute, 0xAD, 2),
        ("LDA", IndirectY, 0xB1, 1),
        ("LDA", ZeroPageX, 0xB5, 1),
        ("LDA", AbsoluteY, 0xB9, 2),
        ("LDA", AbsoluteX, 0xBD, 2),
        ("LDX", Immediate, 0xA2, 1),
        ("LDX", ZeroPage, 0xA6, 1),
        ("LDX", Absolute, 0xAE, 2),
        ("LDX", ZeroPageY, 0xB6, 1),
        ("LDX", AbsoluteY, 0xBE, 2),
        ("LDY", Immediate, 0xA0, 1),
        ("LDY", ZeroPage, 0xA4, 1),
        ("LDY", Absolute, 0xAC, 2),
        ("LDY", ZeroPageX, 0xB4, 1),
        ("LDY", AbsoluteX, 0xBC, 2),
        ("LSR", ZeroPage, 0x46, 1),
        ("LSR", Accumulator, 0x4A, 0),
        ("LSR", Absolute, 0x4E, 2),
        ("LSR", ZeroPageX, 0x56, 1),
        ("LSR", AbsoluteX, 0x5E, 2),
        ("NOP", Implicit, 0xEA, 0),
        ("ORA", IndirectX, 0x01, 1),
        ("ORA", ZeroPage, 0x05, 1),
        ("ORA", Immediate, 0x09, 1),
        ("ORA", Absolute, 0x0D, 2),
        ("ORA", IndirectY, 0x11, 1),
        ("ORA", ZeroPageX, 0x15, 1),
        ("ORA", AbsoluteY, 0x19, 2),
        ("ORA", AbsoluteX, 0x1D, 2),
        ("PHA", Implicit, 0x48, 0),
        ("PHP", Implicit, 0x08, 0),
        ("PLA", Implicit, 0x68, 0),
        ("PLP", Implicit, 0x28, 0),
        ("ROL", ZeroPage, 0x26, 1),
        ("ROL", Accumulator, 0x2A, 0),
        ("ROL", Absolute, 0x2E, 2),
        ("ROL", ZeroPageX, 0x36, 1),
        ("ROL", AbsoluteX, 0x3E, 2),
        ("ROR", ZeroPage, 0x66, 1),
        ("ROR", Accumulator, 0x6A, 0),
        ("ROR", Absolute, 0x6E, 2),
        ("ROR", ZeroPageX, 0x76, 1),
        ("ROR", AbsoluteX, 0x7E, 2),
        ("RTI", Implicit, 0x40, 0),
        ("RTS", Implicit, 0x60, 0),
        ("SBC", IndirectX, 0xE1, 1),
        ("SBC", ZeroPage, 0xE5, 1),
        ("SBC", Immediate, 0xE9, 1),
        ("SBC", Absolute, 0xED, 2),
        ("SBC", IndirectY, 0xF1, 1),
        ("SBC", ZeroPageX, 0xF5, 1),
        ("SBC", AbsoluteY, 0xF9, 2),
        ("SBC", AbsoluteX, 0xFD, 2),
        ("SEC", Implicit, 0x38, 0),
        ("SED", Implicit, 0xF8, 0),
        ("SEI", Implicit, 0x78, 0),
        ("STA", IndirectX, 0x81, 1),
        ("STA", ZeroPage, 0x85, 1),
        ("STA", Absolute, 0x8D, 2),
        ("STA", IndirectY, 0x91, 1),
        ("STA", ZeroPageX, 0x95, 1),
        ("STA", AbsoluteY, 0x99, 2),
        ("STA", AbsoluteX, 0x9D, 2),
        ("STX", ZeroPage, 0x86, 1),
        ("STX", Absolute, 0x8E, 2),
        ("STX", ZeroPageY, 0x96, 1),
        ("STY", ZeroPage, 0x84, 1),
        ("STY", Absolute, 0x8C, 2),
        ("STY", ZeroPageX, 0x94, 1),
        ("TAX", Implicit, 0xAA, 0),
        ("TAY", Implicit, 0xA8, 0),
        ("TSX", Implicit, 0xBA, 0),
        ("TXA", Implicit, 0x8A, 0),
        ("TXS", Implicit, 0x9A, 0),
        ("TYA", Implicit, 0x98, 0),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nmos_table_has_all_documented_opcodes() {
        let table = OpcodeMap::nmos6502();
        assert_eq!(table.len(), 151);
    }

    #[test]
    fn test_nmos_opcodes_are_unique() {
        let mut opcodes: Vec<u8> = NMOS_6502.iter().map(|e| e.2).collect();
        opcodes.sort_unstable();
        opcodes.dedup();
        assert_eq!(opcodes.len(), NMOS_6502.len());
    }

    #[test]
    fn test_field_width_matches_mode_except_jmp_indirect() {
        for &(mnemonic, mode, opcode, width) in NMOS_6502 {
            if mode == AddressingMode::Indirect {
                assert_eq!(width, 2, "{} ${:02X}", mnemonic, opcode);
            } else {
                assert_eq!(width, mode.operand_width(), "{} ${:02X}", mnemonic, opcode);
            }
        }
    }

    #[test]
    fn test_lookup_errors() {
        let table = OpcodeMap::nmos6502();

        let err = table.lookup("XYZ", AddressingMode::Implicit).unwrap_err();
        assert_eq!(err, LookupError::UnknownMnemonic("XYZ".to_string()));
        assert_eq!(err.kind(), ErrorType::UnknownMnemonic);

        let err = table.lookup("STA", AddressingMode::Immediate).unwrap_err();
        assert_eq!(err.kind(), ErrorType::UnsupportedAddressingMode);
        assert_eq!(err.to_string(), "STA does not support immediate addressing");
    }

    #[test]
    fn test_insert_normalizes_mnemonic_and_replaces() {
        let mut table = OpcodeMap::new();
        assert!(table
            .insert("lda", AddressingMode::Immediate, OpcodeEntry::new(0x01, 1))
            .is_none());
        let old = table.insert("LDA", AddressingMode::Immediate, OpcodeEntry::new(0xA9, 1));
        assert_eq!(old, Some(OpcodeEntry::new(0x01, 1)));
        assert!(table.contains_mnemonic("Lda"));
        assert_eq!(table.modes("LDA"), vec![AddressingMode::Immediate]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lookup_ignores_mnemonic_case() {
        let table = OpcodeMap::new().with("NOP", AddressingMode::Implicit, 0xEA, 0);
        assert_eq!(
            table.lookup("nop", AddressingMode::Implicit),
            Ok(OpcodeEntry::new(0xEA, 0))
        );
        assert_eq!(
            table.lookup("NoP", AddressingMode::Accumulator).unwrap_err().kind(),
            ErrorType::UnsupportedAddressingMode
        );
    }

    #[test]
    fn test_size_of_oversized_field_does_not_wrap() {
        assert_eq!(OpcodeEntry::new(0x00, 255).size_bytes(), 256);
    }

    #[test]
    fn test_lookup_through_reference() {
        let table = OpcodeMap::nmos6502();
        let by_ref: &dyn OpcodeTable = &table;
        assert_eq!(
            by_ref.lookup("NOP", AddressingMode::Implicit),
            Ok(OpcodeEntry::new(0xEA, 0))
        );
    }
}
