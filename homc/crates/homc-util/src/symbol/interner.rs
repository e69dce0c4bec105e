//! String interner implementation.
//!
//! The interner is a global table behind an `RwLock`. Lookups of known
//! strings take the read lock only; the write lock is taken once per unique
//! string. The compilation pipeline is single-threaded, so contention is
//! not a concern; the lock exists so the table stays safe to share with
//! test harnesses that run in parallel.

use std::sync::{LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;

use super::Symbol;

/// Global string table instance, initialized on first use
pub(crate) static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

pub(crate) struct StringTable {
    inner: RwLock<TableInner>,
}

struct TableInner {
    /// Maps interned string to its index
    map: FxHashMap<&'static str, u32>,
    /// Storage for the actual string data, indexed by symbol
    strings: Vec<&'static str>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            inner: RwLock::new(TableInner {
                map: FxHashMap::default(),
                strings: Vec::new(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TableInner> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableInner> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn intern(&self, string: &str) -> Symbol {
        if let Some(&index) = self.read().map.get(string) {
            return Symbol::from_index(index);
        }

        let mut inner = self.write();
        // Re-check: another thread may have interned it between the locks.
        if let Some(&index) = inner.map.get(string) {
            return Symbol::from_index(index);
        }

        // Leak to obtain 'static lifetime; entries are never removed.
        let interned: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let index = inner.strings.len() as u32;
        inner.strings.push(interned);
        inner.map.insert(interned, index);
        Symbol::from_index(index)
    }

    pub(crate) fn get(&self, symbol: Symbol) -> &'static str {
        self.read()
            .strings
            .get(symbol.as_u32() as usize)
            .copied()
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_intern_and_get() {
        let sym = STRING_TABLE.intern("table_test");
        assert_eq!(STRING_TABLE.get(sym), "table_test");
    }

    #[test]
    fn test_table_dedup() {
        let a = STRING_TABLE.intern("dedup");
        let b = STRING_TABLE.intern("dedup");
        assert_eq!(a, b);
    }
}
