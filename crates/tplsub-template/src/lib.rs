//! # tplsub-template
//!
//! The function layer of the tplsub template renderer. A templating engine
//! resolves data into [`Value`]s and calls functions from a
//! [`FunctionRegistry`] by name; this crate provides both, along with the
//! coercion rules every function shares.
//!
//! ## Modules
//!
//! - [`value`] - The dynamic value model
//! - [`coerce`] - Conversions from values to integers, floats, and text
//! - [`layout`] - The date layout language used by `parseDate` and `formatDate`
//! - [`path`] - Lexical slash-separated path helpers
//! - [`functions`] - The built-in template functions
//! - [`registry`] - The function registry and its builder

pub mod coerce;
pub mod functions;
pub mod layout;
pub mod path;
pub mod registry;
pub mod value;

pub use registry::{Function, FunctionRegistry, RegistryBuilder};
pub use value::Value;
