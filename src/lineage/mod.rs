//! Table references, aliases and column references of a document, plus the
//! dropped-table check run before executing a script.

crate::reexport!(map);
crate::reexport!(extractor);
crate::reexport!(dropped);
