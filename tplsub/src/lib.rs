//! # tplsub
//!
//! Template substitution over JSON data with a library of typed functions.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on `tplsub`
//! for everything, or on the individual crates for finer-grained control.
//!
//! ```
//! use tplsub::core::Settings;
//! use tplsub::template::{FunctionRegistry, RegistryBuilder, Value};
//!
//! let settings = Settings::default();
//! tplsub::core::logging::setup_logging(&settings);
//!
//! let registry: FunctionRegistry = RegistryBuilder::new(&settings).build();
//! let data = Value::from(tplsub::serde_json::json!({"name": "john"}));
//! let name = data.as_map().and_then(|m| m.get("name")).cloned().unwrap();
//!
//! let _span = tplsub::core::logging::render_span("doc-example").entered();
//! let upper = registry.call("upper", &[name]).unwrap();
//! assert_eq!(registry.call("len", &[upper]).unwrap(), Value::Int(4));
//! ```

/// Error types, settings and their loaders, and logging setup.
pub use tplsub_core as core;

/// Dynamic values, coercion, and the function registry.
#[cfg(feature = "template")]
pub use tplsub_template as template;

pub use chrono;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;
