//! Scope resolution
//!
//! Walks a scoped tree and replaces textual names with direct symbol
//! references. Alongside plain name binding the pass collapses
//! module-prefixed and enum-prefixed dot accesses, inlines
//! function-local type aliases, inserts explicit receiver chains for
//! bare field and method mentions inside methods, and binds
//! break/continue to loop markers.
//!
//! Resolution is one-way: once a name points at a symbol it is never
//! reconsidered. The single exception is a bare method mention that
//! turns out to be the callee of a marked method call, which is handed
//! back to call resolution untouched.

pub mod alias;
pub mod error;
pub mod labels;
pub mod lookup;
pub mod qualified;
pub mod receiver;
pub mod resolver;

pub use error::ResolveError;
pub use resolver::{ResolveStats, ScopeResolver};
