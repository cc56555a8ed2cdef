//! WASM API for the 6502 assembler.
//!
//! Provides JavaScript-callable interfaces for assembling source text and
//! inspecting the result.

use crate::assembler::{Assembler, AssemblerError, AssemblerOptions, Program};
use crate::opcodes::OpcodeMap;
use wasm_bindgen::prelude::*;

/// Result of assembly operation
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    success: bool,
    machine_code: Vec<u8>,
    start_addr: u16,
    end_addr: u32,
    error_message: Option<String>,
    error_line: Option<usize>,
    diagnostics: Vec<String>,
    listing: String,
}

impl AssemblyResult {
    fn from_program(program: Program) -> Self {
        AssemblyResult {
            success: true,
            start_addr: program.origin,
            end_addr: program.end_address(),
            listing: program.listing(),
            machine_code: program.bytes,
            error_message: None,
            error_line: None,
            diagnostics: Vec::new(),
        }
    }

    fn from_errors(origin: u16, errors: &[AssemblerError]) -> Self {
        let first = errors.first();
        AssemblyResult {
            success: false,
            machine_code: Vec::new(),
            start_addr: origin,
            end_addr: origin as u32,
            error_message: first.map(|e| e.message.clone()),
            error_line: first.map(|e| e.line),
            diagnostics: errors.iter().map(|e| e.to_string()).collect(),
            listing: String::new(),
        }
    }
}

#[wasm_bindgen]
impl AssemblyResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn machine_code(&self) -> Vec<u8> {
        self.machine_code.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn start_addr(&self) -> u16 {
        self.start_addr
    }

    /// One past the last byte; `0x10000` when the program fills the top of memory
    #[wasm_bindgen(getter)]
    pub fn end_addr(&self) -> u32 {
        self.end_addr
    }

    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        self.error_message.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error_line(&self) -> Option<usize> {
        self.error_line
    }

    /// Every diagnostic as `line N: message`, sorted by line
    #[wasm_bindgen(getter)]
    pub fn diagnostics(&self) -> js_sys::Array {
        self.diagnostics
            .iter()
            .map(|d| JsValue::from_str(d))
            .collect()
    }

    #[wasm_bindgen(getter)]
    pub fn listing(&self) -> String {
        self.listing.clone()
    }
}

/// Assembler instance exposed to JavaScript, using the NMOS 6502 table
#[wasm_bindgen]
pub struct WasmAssembler {
    assembler: Assembler<OpcodeMap>,
}

#[wasm_bindgen]
impl WasmAssembler {
    #[wasm_bindgen(constructor)]
    pub fn new(origin: u16) -> Self {
        let options = AssemblerOptions {
            origin,
            ..Default::default()
        };
        WasmAssembler {
            assembler: Assembler::default().with_options(options),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn origin(&self) -> u16 {
        self.assembler.options().origin
    }

    #[wasm_bindgen(setter)]
    pub fn set_origin(&mut self, origin: u16) {
        let options = AssemblerOptions {
            origin,
            ..*self.assembler.options()
        };
        self.assembler = Assembler::default().with_options(options);
    }

    /// Assemble 6502 assembly source code
    pub fn assemble(&self, source: &str) -> AssemblyResult {
        match self.assembler.assemble(source) {
            Ok(program) => AssemblyResult::from_program(program),
            Err(errors) => AssemblyResult::from_errors(self.origin(), &errors),
        }
    }
}
