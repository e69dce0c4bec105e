//! Symbol module - String interning for efficient identifier handling.
//!
//! This module provides the [`Symbol`] type, a compact (4-byte) handle to an
//! interned string. Symbols enable O(1) string comparison and reduce memory
//! usage when the same string appears many times, which is the norm for
//! identifiers in a compiler.
//!
//! Interned strings are allocated once with `'static` lifetime and never
//! freed; the total is bounded by the size of the compiled sources.
//!
//! # Examples
//!
//! ```
//! use homc_util::symbol::Symbol;
//!
//! let s1 = Symbol::intern("succ");
//! let s2 = Symbol::intern("succ");
//! let s3 = Symbol::intern("zero");
//!
//! assert_eq!(s1, s2);
//! assert_ne!(s1, s3);
//! assert_eq!(s1.as_str(), "succ");
//! ```

mod interner;

use interner::STRING_TABLE;
use std::fmt;

/// An interned string identifier
///
/// A `Symbol` is a 4-byte handle into the global string table. Comparing
/// two symbols compares table indices, never string contents.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Intern a string, returning its symbol
    ///
    /// Interning the same string twice returns the same symbol. This
    /// function is thread-safe.
    pub fn intern(string: &str) -> Self {
        STRING_TABLE.intern(string)
    }

    /// Get the string value associated with this symbol
    pub fn as_str(self) -> &'static str {
        STRING_TABLE.get(self)
    }

    /// Get the raw index value
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn from_index(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
