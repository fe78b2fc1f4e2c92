use std::fmt;

/// How a function is bound: the Python counterpart of static vs. instance
/// modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// A module-level function.
    Module,
    /// `@staticmethod` inside a class.
    Static,
    /// `@classmethod` inside a class; the first parameter is the class.
    Class,
    /// A plain method; the first parameter is the instance.
    Instance,
}

impl Receiver {
    #[must_use]
    pub fn binds_first_argument(self) -> bool {
        matches!(self, Receiver::Class | Receiver::Instance)
    }

    /// Decorator that must be re-applied when re-declaring the function.
    #[must_use]
    pub fn decorator(self) -> Option<&'static str> {
        match self {
            Receiver::Static => Some("staticmethod"),
            Receiver::Class => Some("classmethod"),
            Receiver::Module | Receiver::Instance => None,
        }
    }
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Receiver::Module => "function",
            Receiver::Static => "staticmethod",
            Receiver::Class => "classmethod",
            Receiver::Instance => "method",
        };
        f.write_str(label)
    }
}
