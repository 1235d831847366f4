use nestset::PowersetAlgorithm;

/// Everything that can be written in front of operands on a line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum Operation {
    #[strum(serialize = "bin")]
    PowersetBinary,

    #[strum(serialize = "rec")]
    PowersetRecursive,

    #[strum(serialize = "mix")]
    PowersetMixed,

    #[strum(serialize = "compare")]
    Compare,

    #[strum(serialize = "masks")]
    Masks,

    #[strum(serialize = "union")]
    Union,

    #[strum(serialize = "inter")]
    Intersection,

    #[strum(serialize = "diff")]
    Difference,

    #[strum(serialize = "dedup")]
    Deduplicate,

    #[strum(serialize = "push")]
    PushDown,

    #[strum(serialize = "pull")]
    PullUp,

    #[strum(serialize = "card")]
    Cardinality,

    #[strum(serialize = "depth")]
    Depth,
}

impl Operation {
    pub fn algorithm(self) -> Option<PowersetAlgorithm> {
        match self {
            Self::PowersetBinary => Some(PowersetAlgorithm::Binary),
            Self::PowersetRecursive => Some(PowersetAlgorithm::Recursive),
            Self::PowersetMixed => Some(PowersetAlgorithm::Mixed),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        if let Some(algorithm) = self.algorithm() {
            return algorithm.description();
        }
        match self {
            Self::Compare => "Runs all three powerset algorithms and reports time and agreement",
            Self::Masks => "Prints the bit masks enumerated by the binary powerset algorithm",
            Self::Union => "Joins sets, removing duplicate members",
            Self::Intersection => "Keeps the members found in every set, duplicates included",
            Self::Difference => "Removes the members of the later sets from the first",
            Self::Deduplicate => "Removes duplicate members, keeping the first occurrence",
            Self::PushDown => "Wraps a set in singleton layers",
            Self::PullUp => "Removes singleton layers, ignoring sets that are not singletons",
            Self::Cardinality => "Counts the members of a set, duplicates included",
            Self::Depth => "Counts the singleton layers around a set",
            _ => "",
        }
    }

    pub fn signature_string(self) -> &'static str {
        match self {
            Self::Union | Self::Intersection | Self::Difference => "set, set...",
            Self::PushDown => "set, depth = 1",
            Self::PullUp => "set, height = 1",
            _ => "set",
        }
    }
}
