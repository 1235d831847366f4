use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::{
    algebra::first_occurrences,
    error::{SetError, SetOp, SetResult},
    node::Node,
};

/// One row per subset, one column per source member.
pub type BitMasks = Vec<Vec<bool>>;

/// The powerset construction strategies. All three produce structurally equal results but with
/// very different amounts of work, which is the reason they are all kept.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum PowersetAlgorithm {
    #[strum(serialize = "bin")]
    Binary,

    #[strum(serialize = "rec")]
    Recursive,

    #[strum(serialize = "mix")]
    Mixed,
}

impl PowersetAlgorithm {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Binary => {
                "Enumerates every bit mask over the members and unions in one subset per mask"
            }
            Self::Recursive => {
                "Removes each member in turn and recurses on the rest, recomputing shared subsets"
            }
            Self::Mixed => {
                "Removes one member, recurses once, and adds the member to a copy of every subset"
            }
        }
    }

    pub fn apply<T: PartialEq + Clone>(self, set: &Node<T>) -> SetResult<Node<T>> {
        match self {
            Self::Binary => set.power_set_bin(),
            Self::Recursive => set.power_set_rec(),
            Self::Mixed => set.power_set_mix(),
        }
    }
}

/// The powerset of the empty set, `{{}}`.
fn empty_power_set<T>() -> Node<T> {
    let mut pset = Node::empty();
    pset.push_down(1);
    pset
}

/// `mask[k]` is set iff bit `k` of `index` is. Bits are read from the most significant of the
/// `len` positions down, subtracting each one found.
fn bit_mask(index: usize, len: usize) -> Vec<bool> {
    let mut mask = vec![false; len];
    let mut remaining = index;
    for bit in (0..len).rev() {
        let weight = 1 << bit;
        if remaining >= weight {
            mask[bit] = true;
            remaining -= weight;
        }
    }
    mask
}

impl<T: PartialEq + Clone> Node<T> {
    /// A copy of the members with structural duplicates removed. Every algorithm works on this, so
    /// `{1, 1}` has the same powerset as `{1}`.
    fn unique_members(&self) -> SetResult<Vec<Node<T>>> {
        Ok(first_occurrences(self.operand(SetOp::Powerset)?.to_vec()))
    }

    pub fn power_set_bin(&self) -> SetResult<Node<T>> {
        self.power_set_bin_with_masks().map(|(pset, _)| pset)
    }

    /// Builds the powerset by walking all `2^n` bit masks over the members, returning the masks
    /// alongside it.
    ///
    /// Every subset is joined with a full [`Node::union`], deduplication included.
    ///
    /// [`SetError::TooManyMembers`] only keeps `2^n` from overflowing a `usize`. It is not a size
    /// limit: the mask table alone holds `n * 2^n` booleans, so far smaller sets already exhaust
    /// memory.
    #[instrument(level = "trace", skip_all)]
    pub fn power_set_bin_with_masks(&self) -> SetResult<(Node<T>, BitMasks)> {
        let source = self.unique_members()?;
        let set_size = source.len();
        if set_size >= usize::BITS as usize {
            return Err(SetError::TooManyMembers { len: set_size });
        }
        let pset_size = 1usize << set_size;
        debug!(members = set_size, subsets = pset_size, "building powerset from bit masks");

        let masks = (0..pset_size)
            .map(|index| bit_mask(index, set_size))
            .collect_vec();

        let mut pset = empty_power_set();
        for (index, mask) in masks.iter().enumerate() {
            let mut subset: Node<T> = source
                .iter()
                .zip(mask)
                .filter(|(_, bit)| **bit)
                .map(|(member, _)| member.clone())
                .collect();
            trace!(index, size = subset.cardinality(), "joining subset");
            subset.push_down(1);
            pset.union([&subset])?;
        }

        Ok((pset, masks))
    }

    /// Builds the powerset by removing each member in turn and recursing on what is left.
    ///
    /// No subresult is shared between branches, so the call tree grows factorially and the same
    /// subsets are built over and over before union discards the repeats.
    pub fn power_set_rec(&self) -> SetResult<Node<T>> {
        Node::Container(self.unique_members()?).power_set_rec_unique()
    }

    #[instrument(level = "trace", skip_all, fields(members = self.cardinality()))]
    fn power_set_rec_unique(&self) -> SetResult<Node<T>> {
        let source = self.operand(SetOp::Powerset)?;
        if source.is_empty() {
            return Ok(empty_power_set());
        }

        let mut pset = self.clone();
        pset.push_down(1);
        for member in source {
            let removed = Node::container([member.clone()]);
            let rest = Node::pure_difference(self, &removed)?;
            pset.union([&rest.power_set_rec_unique()?])?;
        }
        Ok(pset)
    }

    /// Builds the powerset from the powerset of all members but the last: those subsets, plus a
    /// copy of each with the last member added.
    pub fn power_set_mix(&self) -> SetResult<Node<T>> {
        Node::Container(self.unique_members()?).power_set_mix_unique()
    }

    #[instrument(level = "trace", skip_all, fields(members = self.cardinality()))]
    fn power_set_mix_unique(&self) -> SetResult<Node<T>> {
        let source = self.operand(SetOp::Powerset)?;
        let Some(last) = source.last() else {
            return Ok(empty_power_set());
        };

        let last = Node::container([last.clone()]);
        let rest = Node::pure_difference(self, &last)?;
        let pset = rest.power_set_mix_unique()?;

        // The extended subsets must be copies, `pset` is joined in unchanged below.
        let mut extended = pset.operand(SetOp::Powerset)?.to_vec();
        for subset in &mut extended {
            subset.union([&last])?;
        }
        trace!(subsets = extended.len(), "extended copies with last member");

        let mut extended = Node::Container(extended);
        extended.union([&pset])?;
        Ok(extended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn set(values: &[i32]) -> Node<i32> {
        Node::from_elements(values.iter().copied())
    }

    fn power_sets(source: &Node<i32>) -> Vec<Node<i32>> {
        PowersetAlgorithm::iter()
            .map(|algorithm| algorithm.apply(source).unwrap())
            .collect_vec()
    }

    #[test]
    fn power_set_of_empty_set() {
        for pset in power_sets(&Node::empty()) {
            assert_eq!(pset, Node::container([Node::empty()]));
        }
    }

    #[test]
    fn power_set_of_pair() {
        let expected = Node::container([Node::empty(), set(&[1]), set(&[2]), set(&[1, 2])]);
        for pset in power_sets(&set(&[1, 2])) {
            assert_eq!(pset, expected);
        }
    }

    #[test]
    fn power_set_of_triple() {
        let psets = power_sets(&set(&[1, 2, 3]));
        for pset in &psets {
            assert_eq!(pset.cardinality(), 8);
            assert!(pset.members().unwrap().contains(&set(&[1, 3])));
        }
        assert!(psets.iter().all_equal());
    }

    #[test]
    fn power_set_with_nested_member() {
        let source = Node::container([set(&[1]), Node::element(2)]);
        let expected = Node::container([
            Node::empty(),
            Node::container([set(&[1])]),
            set(&[2]),
            source.clone(),
        ]);
        for pset in power_sets(&source) {
            assert_eq!(pset, expected);
        }
    }

    #[test]
    fn subsets_are_containers() {
        for pset in power_sets(&set(&[5, 6, 7])) {
            assert!(pset.members().unwrap().iter().all(Node::is_container));
        }
    }

    #[test]
    fn source_is_left_alone() {
        let source = set(&[1, 2, 3]);
        let _ = power_sets(&source);
        assert_eq!(source, set(&[1, 2, 3]));
    }

    #[test]
    fn duplicate_members_count_once() {
        let expected = Node::container([Node::empty(), set(&[1])]);
        for pset in power_sets(&set(&[1, 1])) {
            assert_eq!(pset, expected);
        }

        let expected = power_sets(&set(&[1, 2, 3]));
        for pset in power_sets(&set(&[3, 1, 2, 1, 3])) {
            assert_eq!(pset.cardinality(), 8);
            assert_eq!(pset, expected[0]);
        }
    }

    #[test]
    fn bit_masks_follow_bit_weights() {
        let (_, masks) = set(&[1, 2, 3]).power_set_bin_with_masks().unwrap();
        assert_eq!(masks.len(), 8);
        assert_eq!(masks[0], vec![false, false, false]);
        assert_eq!(masks[1], vec![true, false, false]);
        assert_eq!(masks[6], vec![false, true, true]);
        assert_eq!(masks[7], vec![true, true, true]);
    }

    #[test]
    fn elements_have_no_power_set() {
        for algorithm in PowersetAlgorithm::iter() {
            assert_eq!(
                algorithm.apply(&Node::element(3)),
                Err(SetError::ElementOperand {
                    op: SetOp::Powerset
                })
            );
        }
    }

    #[test]
    fn algorithm_names_parse() {
        assert_eq!("bin".parse(), Ok(PowersetAlgorithm::Binary));
        assert_eq!("mix".parse(), Ok(PowersetAlgorithm::Mixed));
        assert!("fast".parse::<PowersetAlgorithm>().is_err());
        assert_eq!(PowersetAlgorithm::Recursive.to_string(), "rec");
    }
}
