//! WebAssembly bindings for the 6502 assembler.
//!
//! This module provides JavaScript-callable interfaces to the assembler,
//! enabling browser-based editing of 6502 assembly code.

#[cfg(feature = "wasm")]
pub mod api;

#[cfg(feature = "wasm")]
pub use api::{AssemblyResult, WasmAssembler};
