use malachite::Integer;
use std::fmt::Display;

/// Element type used when sets are read from text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    Integer(Integer),
    Symbol(String),
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(int) => write!(f, "{int}"),
            Self::Symbol(name) => f.write_str(name),
        }
    }
}

impl From<i64> for Atom {
    fn from(value: i64) -> Self {
        Self::Integer(Integer::from(value))
    }
}

impl From<Integer> for Atom {
    fn from(value: Integer) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        Self::Symbol(name.to_owned())
    }
}
