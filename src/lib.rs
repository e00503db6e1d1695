//! Client-side SQL analysis for notebook editors: tokenizing, statement
//! splitting, lineage extraction, linting and autocompletion, run off the
//! caller's task by a single analysis worker.

reexport!(testing, test);
reexport!(config);
reexport!(error);
reexport!(sql);
reexport!(lineage);
reexport!(lint);
reexport!(metadata);
reexport!(autocomplete);
reexport!(worker);
reexport!(service);
#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, info, span, trace, warn};

#[macro_export]
macro_rules! reexport {
    ($module:ident) => {
        $crate::reexport!($module, false);
    };
    ($module:ident, test) => {
        $crate::reexport!($module, true);
    };
    ($module:ident, $is_test:literal) => {
        #[cfg_attr($is_test, cfg(test))]
        mod $module;
        #[cfg_attr($is_test, cfg(test))]
        #[allow(unused_imports)]
        #[allow(ambiguous_glob_reexports)]
        pub use $module::*;
    };
}
