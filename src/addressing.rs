//! # Addressing Modes
//!
//! This module defines the 13 operand addressing modes recognized by the assembler.
//! The mode is decided purely from the operand's literal text and fixes how many
//! payload bytes the operand carries.

use std::fmt;

/// 6502 addressing mode tag.
///
/// The tag is what the opcode table is keyed on together with the mnemonic, so the
/// set of modes is closed: a mnemonic either has an entry for a mode or it doesn't.
///
/// # Payload Widths
///
/// - **0 bytes**: Implicit, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, Indirect,
///   IndirectX, IndirectY
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction.
    ///
    /// Examples: CLC, RTS, NOP
    Implicit,

    /// Operates directly on the accumulator register.
    ///
    /// Examples: LSR A, ROL A, ASL A
    Accumulator,

    /// 8-bit constant operand in instruction.
    ///
    /// Example: LDA #$10
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ///
    /// Example: LDA $80
    ZeroPage,

    /// Zero page address indexed by X register.
    ///
    /// Example: LDA $80,X
    ZeroPageX,

    /// Zero page address indexed by Y register.
    ///
    /// Example: LDX $80,Y
    ZeroPageY,

    /// Signed 8-bit branch offset, written as a literal.
    ///
    /// Example: BNE *-5
    Relative,

    /// Full 16-bit address.
    ///
    /// Example: JMP $1234
    Absolute,

    /// 16-bit address indexed by X register.
    ///
    /// Example: LDA $1234,X
    AbsoluteX,

    /// 16-bit address indexed by Y register.
    ///
    /// Example: LDA $1234,Y
    AbsoluteY,

    /// Indirect through a zero page pointer.
    ///
    /// Example: JMP ($FC)
    Indirect,

    /// Indexed indirect: (ZP + X) then dereference.
    ///
    /// Example: LDA ($40,X)
    IndirectX,

    /// Indirect indexed: ZP dereference then + Y.
    ///
    /// Example: LDA ($40),Y
    IndirectY,
}

impl AddressingMode {
    /// Every mode, in declaration order.
    pub const ALL: [AddressingMode; 13] = [
        AddressingMode::Implicit,
        AddressingMode::Accumulator,
        AddressingMode::Immediate,
        AddressingMode::ZeroPage,
        AddressingMode::ZeroPageX,
        AddressingMode::ZeroPageY,
        AddressingMode::Relative,
        AddressingMode::Absolute,
        AddressingMode::AbsoluteX,
        AddressingMode::AbsoluteY,
        AddressingMode::Indirect,
        AddressingMode::IndirectX,
        AddressingMode::IndirectY,
    ];

    /// Number of payload bytes an operand in this mode carries (0, 1 or 2).
    ///
    /// ```
    /// use libasm6502::AddressingMode;
    ///
    /// assert_eq!(AddressingMode::Implicit.operand_width(), 0);
    /// assert_eq!(AddressingMode::ZeroPageX.operand_width(), 1);
    /// assert_eq!(AddressingMode::AbsoluteY.operand_width(), 2);
    /// ```
    pub const fn operand_width(self) -> u8 {
        use AddressingMode::*;

        match self {
            Implicit | Accumulator => 0,
            Immediate | ZeroPage | ZeroPageX | ZeroPageY | Relative | Indirect | IndirectX
            | IndirectY => 1,
            Absolute | AbsoluteX | AbsoluteY => 2,
        }
    }

    /// Short human-readable name used in diagnostics.
    pub const fn name(self) -> &'static str {
        use AddressingMode::*;

        match self {
            Implicit => "implicit",
            Accumulator => "accumulator",
            Immediate => "immediate",
            ZeroPage => "zeropage",
            ZeroPageX => "zeropage,X",
            ZeroPageY => "zeropage,Y",
            Relative => "relative",
            Absolute => "absolute",
            AbsoluteX => "absolute,X",
            AbsoluteY => "absolute,Y",
            Indirect => "indirect",
            IndirectX => "(indirect,X)",
            IndirectY => "(indirect),Y",
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_modes_are_distinct() {
        let mut modes = AddressingMode::ALL.to_vec();
        modes.sort();
        modes.dedup();
        assert_eq!(modes.len(), 13);
    }

    #[test]
    fn test_only_absolute_family_is_two_bytes() {
        let wide: Vec<_> = AddressingMode::ALL
            .iter()
            .filter(|m| m.operand_width() == 2)
            .collect();
        assert_eq!(
            wide,
            vec![
                &AddressingMode::Absolute,
                &AddressingMode::AbsoluteX,
                &AddressingMode::AbsoluteY
            ]
        );
    }
}
