//! Off-task analysis.
//!
//! A [`Dispatcher`] owns one blocking worker that tokenizes, splits, extracts
//! lineage and runs the context-free linter. Callers talk to it only through
//! JSON messages correlated by request id; see [`WorkerRequest`] and
//! [`WorkerResponse`] for the wire format.

crate::reexport!(protocol);
crate::reexport!(analysis);
crate::reexport!(pending);
crate::reexport!(dispatcher);
