//! String interning for symbols

pub use lasso::Spur as Symbol;
use lasso::ThreadedRodeo;
use std::sync::Arc;

/// Shared string interner
///
/// Cheap to clone; interning takes `&self` so the interner can be threaded
/// through a pass alongside mutable borrows of the tree it names.
#[derive(Clone)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
        }
    }

    pub fn intern(&self, text: &str) -> Symbol {
        self.inner.get_or_intern(text)
    }

    pub fn resolve(&self, sym: &Symbol) -> String {
        self.inner.resolve(sym).to_string()
    }

    pub fn try_resolve(&self, sym: &Symbol) -> Option<String> {
        self.inner.try_resolve(sym).map(|s| s.to_string())
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
