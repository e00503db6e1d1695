crate::reexport!(datatype);
crate::reexport!(column);
crate::reexport!(table);
crate::reexport!(schema);
crate::reexport!(database);
crate::reexport!(metastore);
crate::reexport!(postgres);

use crate::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

pub type Data<T> = RwLock<HashMap<String, T>>;
