//! Human-readable assembly listing
//!
//! One row per label and per instruction, in source order:
//!
//! ```text
//! 0600            start:
//! 0600  A9 01     LDA #$01
//! 0602  8D 00 02  STA $0200
//! ```

use crate::assembler::encoder::EncodedInstruction;
use crate::assembler::operand::Operand;
use crate::assembler::Program;

/// Format an instruction as source text
pub fn format_instruction(instr: &EncodedInstruction) -> String {
    match instr.operand {
        Operand::Implicit => instr.mnemonic.clone(),
        operand => format!("{} {}", instr.mnemonic, operand),
    }
}

fn format_bytes(instr: &EncodedInstruction) -> String {
    instr
        .bytes()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the whole program as a listing
pub fn format_listing(program: &Program) -> String {
    // (source line, labels before instructions on the same line, text)
    let mut rows: Vec<(usize, u8, String)> = Vec::new();

    for symbol in program.symbols() {
        rows.push((
            symbol.defined_at,
            0,
            format!("{:04X}  {:<8}  {}:", symbol.address, "", symbol.name),
        ));
    }

    for instr in &program.instructions {
        rows.push((
            instr.line_number,
            1,
            format!(
                "{:04X}  {:<8}  {}",
                instr.address,
                format_bytes(instr),
                format_instruction(instr)
            ),
        ));
    }

    rows.sort_by_key(|(line, order, _)| (*line, *order));

    let mut out = String::new();
    for (_, _, row) in rows {
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::assembler::assemble;

    #[test]
    fn test_listing_rows_in_source_order() {
        let program = assemble("start: LDA #$01\n  STA $0200\nloop: DEX\n  BNE *-3").unwrap();
        let listing = program.listing();
        let rows: Vec<&str> = listing.lines().collect();

        assert_eq!(
            rows,
            vec![
                "0000            start:",
                "0000  A9 01     LDA #$01",
                "0002  8D 00 02  STA $0200",
                "0005            loop:",
                "0005  CA        DEX",
                "0006  D0 FD     BNE *-3",
            ]
        );
    }

    #[test]
    fn test_empty_program_has_empty_listing() {
        let program = assemble("; nothing here\n").unwrap();
        assert_eq!(program.listing(), "");
    }
}
