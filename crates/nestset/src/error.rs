use std::fmt::Display;

/// The set operation that was being performed when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SetOp {
    #[strum(serialize = "union")]
    Union,

    #[strum(serialize = "intersection")]
    Intersection,

    #[strum(serialize = "difference")]
    Difference,

    #[strum(serialize = "powerset")]
    Powerset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    ElementOperand { op: SetOp },
    /// `2^len` does not fit in a `usize`. Guards the shift only; sets far smaller than this still
    /// run out of memory.
    TooManyMembers { len: usize },
}

pub type SetResult<T> = Result<T, SetError>;

impl Display for SetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SetError::*;
        let s = match self {
            ElementOperand { op } => {
                format!("cannot take {op} of an element, only of sets")
            }
            TooManyMembers { len } => format!(
                "cannot enumerate bit masks for a set of {len} members, at most {} are supported",
                usize::BITS - 1
            ),
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for SetError {}
