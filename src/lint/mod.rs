//! Lint passes over parsed statements.
//!
//! The context-free pass only looks at tokens and clauses and runs inside the
//! analysis worker. The context-sensitive pass needs a metastore round trip
//! and runs afterwards on the caller's side.

crate::reexport!(warning);
crate::reexport!(context_free);
crate::reexport!(context_sensitive);
