//! The name-to-function table a templating engine calls into.
//!
//! A [`FunctionRegistry`] maps names to [`Function`] entries, each a plain
//! `fn` pointer of fixed arity. The engine looks a name up when it parses a
//! template and calls [`FunctionRegistry::call`] with evaluated arguments when
//! it executes one.
//!
//! Registries are built per render by a [`RegistryBuilder`]; there is no
//! shared default table.
//!
//! ## Examples
//!
//! ```
//! use tplsub_core::Settings;
//! use tplsub_template::registry::RegistryBuilder;
//! use tplsub_template::value::Value;
//!
//! let registry = RegistryBuilder::new(&Settings::default()).build();
//! let upper = registry.call("upper", &[Value::from("john")]).unwrap();
//! let n = registry.call("len", &[upper]).unwrap();
//! assert_eq!(n, Value::Int(4));
//! ```

use std::collections::HashMap;
use std::fmt;

use tplsub_core::error::{TplError, TplResult};
use tplsub_core::settings::{Settings, TimeZoneSetting};

use crate::functions::{now_local, now_utc, BUILTINS};
use crate::value::Value;

/// A function taking no arguments.
pub type NullaryFn = fn() -> TplResult<Value>;
/// A function taking one argument.
pub type UnaryFn = fn(&Value) -> TplResult<Value>;
/// A function taking two arguments.
pub type BinaryFn = fn(&Value, &Value) -> TplResult<Value>;
/// A function taking three arguments.
pub type TernaryFn = fn(&Value, &Value, &Value) -> TplResult<Value>;
/// A function taking any number of arguments.
pub type VariadicFn = fn(&[Value]) -> TplResult<Value>;

/// A registry entry: a function pointer tagged with its call signature.
#[derive(Clone, Copy)]
pub enum Function {
    Nullary(NullaryFn),
    Unary(UnaryFn),
    Binary(BinaryFn),
    Ternary(TernaryFn),
    Variadic(VariadicFn),
}

impl Function {
    /// Returns the fixed argument count, or `None` for a variadic function.
    pub const fn arity(&self) -> Option<usize> {
        match self {
            Self::Nullary(_) => Some(0),
            Self::Unary(_) => Some(1),
            Self::Binary(_) => Some(2),
            Self::Ternary(_) => Some(3),
            Self::Variadic(_) => None,
        }
    }

    /// Calls the function, checking the argument count first.
    ///
    /// `name` is only used in the error message.
    pub fn call(&self, name: &str, args: &[Value]) -> TplResult<Value> {
        match (self, args) {
            (Self::Nullary(f), []) => f(),
            (Self::Unary(f), [a]) => f(a),
            (Self::Binary(f), [a, b]) => f(a, b),
            (Self::Ternary(f), [a, b, c]) => f(a, b, c),
            (Self::Variadic(f), args) => f(args),
            _ => Err(TplError::ArityMismatch {
                name: name.to_string(),
                expected: self.arity().map_or_else(|| "any".to_string(), |n| n.to_string()),
                got: args.len(),
            }),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Nullary(_) => "Nullary",
            Self::Unary(_) => "Unary",
            Self::Binary(_) => "Binary",
            Self::Ternary(_) => "Ternary",
            Self::Variadic(_) => "Variadic",
        };
        write!(f, "Function::{kind}")
    }
}

/// A table of named template functions.
///
/// A built registry is read-only; add entries through
/// [`RegistryBuilder::function`] before building.
///
/// ```compile_fail
/// use tplsub_template::registry::{Function, FunctionRegistry};
/// use tplsub_template::value::Value;
///
/// fn one() -> tplsub_core::TplResult<Value> {
///     Ok(Value::Int(1))
/// }
///
/// let mut registry = FunctionRegistry::builtin();
/// registry.register("one", Function::Nullary(one));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<&'static str, Function>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Builds a registry holding every built-in function, using default
    /// settings.
    pub fn builtin() -> Self {
        RegistryBuilder::new(&Settings::default()).build()
    }

    /// Registers a function, replacing any existing entry of the same name.
    pub(crate) fn register(&mut self, name: &'static str, function: Function) {
        self.functions.insert(name, function);
    }

    /// Returns the entry registered under `name`.
    pub fn get(&self, name: &str) -> Option<Function> {
        self.functions.get(name).copied()
    }

    /// Returns `true` if a function is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if no functions are registered.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Calls a registered function by name.
    ///
    /// Fails with [`TplError::UnknownFunction`] if nothing is registered under
    /// `name` and with [`TplError::ArityMismatch`] if the argument count is
    /// wrong; otherwise returns whatever the function returns.
    pub fn call(&self, name: &str, args: &[Value]) -> TplResult<Value> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| TplError::UnknownFunction(name.to_string()))?;
        match function.call(name, args) {
            Ok(value) => {
                tracing::trace!(function = name, result = value.type_name(), "Function call");
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(function = name, error = %e, "Function call failed");
                Err(e)
            }
        }
    }
}

/// Assembles a [`FunctionRegistry`] from settings.
///
/// Each [`build`](Self::build) returns a new table, so two renders never
/// share one.
///
/// ```
/// use tplsub_core::Settings;
/// use tplsub_template::registry::{Function, RegistryBuilder};
/// use tplsub_template::value::Value;
///
/// fn shout(v: &Value) -> tplsub_core::TplResult<Value> {
///     Ok(Value::Text(format!("{}!", v)))
/// }
///
/// let settings = Settings {
///     disabled_functions: vec!["env".to_string()],
///     ..Settings::default()
/// };
/// let registry = RegistryBuilder::new(&settings)
///     .function("shout", Function::Unary(shout))
///     .build();
/// assert!(!registry.contains("env"));
/// assert_eq!(registry.call("shout", &[Value::from("hi")]).unwrap(), Value::from("hi!"));
/// ```
#[derive(Debug, Clone)]
pub struct RegistryBuilder<'a> {
    settings: &'a Settings,
    extra: Vec<(&'static str, Function)>,
}

impl<'a> RegistryBuilder<'a> {
    /// Starts a builder for the given settings.
    pub const fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            extra: Vec::new(),
        }
    }

    /// Adds a custom function. Custom functions override built-ins of the
    /// same name and are also subject to `disabled_functions`.
    #[must_use]
    pub fn function(mut self, name: &'static str, function: Function) -> Self {
        self.extra.push((name, function));
        self
    }

    /// Builds a fresh registry.
    pub fn build(&self) -> FunctionRegistry {
        let now = match self.settings.time_zone {
            TimeZoneSetting::Utc => Function::Nullary(now_utc),
            TimeZoneSetting::Local => Function::Nullary(now_local),
        };

        let now = ("now", now);
        let mut registry = FunctionRegistry::new();
        let entries = std::iter::once(&now)
            .chain(BUILTINS.iter())
            .chain(self.extra.iter());
        for &(name, function) in entries {
            if self.settings.is_disabled(name) {
                tracing::trace!(function = name, "Skipping disabled function");
                continue;
            }
            registry.register(name, function);
        }

        tracing::debug!(
            functions = registry.len(),
            time_zone = %self.settings.time_zone,
            "Built function registry"
        );
        registry
    }
}
