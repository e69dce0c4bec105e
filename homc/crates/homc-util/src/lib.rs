//! homc-util - Core Utilities and Foundation Types
//!
//! This crate provides the foundation the rest of the Homie compiler is
//! built on:
//!
//! - **Spans and source maps** ([`Span`], [`SourceFile`], [`SourceMap`]):
//!   byte-range source locations with precomputed line starts, so any
//!   diagnostic can be resolved to line/column pairs and per-line
//!   sub-spans without rescanning the file.
//! - **String interning** ([`Symbol`]): every identifier, keyword and
//!   literal text is interned once and handled as a 4-byte index, making
//!   name comparison O(1) throughout the pipeline.
//! - **Typed indices** ([`Idx`], [`define_idx!`]): newtype indices so the
//!   different id spaces of the compiler (AST nodes, frame slots) cannot
//!   be mixed up.
//! - **Diagnostics** ([`Diagnostic`], [`DiagnosticBuilder`], [`Handler`],
//!   [`render`]): structured multi-location diagnostics with severity
//!   levels, codes, span labels and help texts, accumulated per pass and
//!   rendered deterministically with colorized squiggles.
//!
//! Everything here is pass-agnostic; the lexer, parser, validator, type
//! checker and lowering all consume these types but never extend them.

pub mod diagnostic;
mod index;
pub mod span;
pub mod symbol;

pub use diagnostic::{
    render, Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level, SpanLabel,
};
pub use index::Idx;
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;

// Re-export commonly used hashers
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
