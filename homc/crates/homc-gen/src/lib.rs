//! homc-gen - Assembly Emitter
//!
//! Turns a finalized IR program into x86-64 assembly (NASM syntax). The
//! emitter is a straight walk over the IR; the only interesting parts are
//! the object encoding (variant tag in the top byte of each value word)
//! and the fit compilation into tag-compare chains. The object allocator
//! and the process entry point come from the external runtime via the
//! `_make_objN` symbols.

pub mod asm;
pub mod builtins;

pub use asm::{emit_program, GenError};
