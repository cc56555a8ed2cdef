//! Fuzz target for the assembler.
//!
//! Feeds arbitrary text to the assembler to find panics in lexing, operand
//! classification and encoding.

#![no_main]

use libasm6502::assemble;
use libasm6502::assembler::classify;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    if let Ok(program) = assemble(&source) {
        // Emitted bytes must match the instruction lengths
        let total: usize = program.instructions.iter().map(|i| i.size_bytes()).sum();
        assert_eq!(total, program.bytes.len());
        let _ = program.listing();
    }

    // Each line on its own as an operand
    for line in source.lines() {
        let _ = classify(line);
    }
});
