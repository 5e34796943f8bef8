use std::fmt;

/// A callable handed over by web content.
///
/// The callable receives a single string argument, which is how native
/// results reach the page.
pub struct HostFunction(Box<dyn FnMut(String) + Send>);

impl HostFunction {
    /// Wrap a closure.
    pub fn new(f: impl FnMut(String) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    /// Invoke the function.
    pub fn call(&mut self, arg: String) {
        (self.0)(arg);
    }

    /// Unwrap into the boxed closure.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn FnMut(String) + Send> {
        self.0
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostFunction(..)")
    }
}

/// A loosely typed value received from web content.
#[derive(Debug, Default)]
pub enum HostValue {
    /// The argument was not supplied.
    #[default]
    Undefined,
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// Something callable.
    Function(HostFunction),
}

impl HostValue {
    /// Wrap a closure as a callable value.
    pub fn function(f: impl FnMut(String) + Send + 'static) -> Self {
        Self::Function(HostFunction::new(f))
    }

    /// Whether the value can be called.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// Whether the value counts as "not supplied" (`undefined` or `null`).
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Whether the value is falsy: absent, `false`, `0`, `NaN` or `""`.
    #[must_use]
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => true,
            Self::Bool(b) => !b,
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::String(s) => s.is_empty(),
            Self::Function(_) => false,
        }
    }

    /// Name of the value's type, for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Function(_) => "function",
        }
    }

    /// Take the callable out of the value, if there is one.
    #[must_use]
    pub fn into_function(self) -> Option<HostFunction> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl From<HostFunction> for HostValue {
    fn from(f: HostFunction) -> Self {
        Self::Function(f)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
