//! Where each emitted byte came from
//!
//! Built once from the encoded instructions. Any address inside an instruction,
//! not only its opcode byte, resolves to the line that produced it.

use crate::assembler::encoder::EncodedInstruction;

/// Lookup between emitted addresses and source lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    /// Ordered by range start once finalized
    by_address: Vec<(AddressRange, SourceLocation)>,

    /// Ordered by line once finalized
    by_line: Vec<(usize, AddressRange)>,
}

/// Position of an instruction's mnemonic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,

    /// Column where the mnemonic starts (0-indexed)
    pub column: usize,
}

/// Half-open span of bytes emitted for one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    /// Starting address (inclusive)
    pub start: u16,

    /// Ending address (exclusive); `0x10000` for an instruction ending at `$FFFF`
    pub end: u32,
}

impl AddressRange {
    pub fn contains(&self, address: u16) -> bool {
        address >= self.start && (address as u32) < self.end
    }
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every instruction to its address range
    pub fn from_instructions(instructions: &[EncodedInstruction]) -> Self {
        let mut map = Self::new();
        for instr in instructions {
            let range = AddressRange {
                start: instr.address,
                end: instr.end_address(),
            };
            let location = SourceLocation {
                line: instr.line_number,
                column: instr.column,
            };
            map.add_mapping(range, location);
        }
        map.finalize();
        map
    }

    /// Record one instruction. Call [`finalize`](Self::finalize) before looking up.
    pub fn add_mapping(&mut self, range: AddressRange, location: SourceLocation) {
        self.by_address.push((range, location));
        self.by_line.push((location.line, range));
    }

    /// Line and column of the instruction whose bytes cover `address`
    pub fn get_source_location(&self, address: u16) -> Option<SourceLocation> {
        let after = self
            .by_address
            .partition_point(|(range, _)| range.start <= address);
        let (range, location) = self.by_address.get(after.checked_sub(1)?)?;
        range.contains(address).then_some(*location)
    }

    /// Bytes emitted by `line`; `None` for lines without an instruction
    pub fn get_address_range(&self, line: usize) -> Option<AddressRange> {
        let idx = self.by_line.binary_search_by_key(&line, |(l, _)| *l).ok()?;
        Some(self.by_line[idx].1)
    }

    pub fn finalize(&mut self) {
        self.by_address.sort_by_key(|(range, _)| range.start);
        self.by_line.sort_by_key(|(line, _)| *line);
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}
