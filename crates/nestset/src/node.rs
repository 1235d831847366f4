use itertools::Itertools;

use crate::error::{SetError, SetOp, SetResult};

/// A set whose members may be plain elements or further sets, nested to any depth.
///
/// A `Container` is stored as a multiset: duplicates can exist until
/// [`Node::deduplicate`] (or a [`Node::union`]) removes them. Member order carries no meaning.
///
/// Equality is structural. Two containers are equal when they hold the same multiset of members,
/// compared recursively and regardless of order.
#[derive(Debug, Clone)]
pub enum Node<T> {
    Element(T),
    Container(Vec<Node<T>>),
}

impl<T> Node<T> {
    pub fn element(value: T) -> Self {
        Self::Element(value)
    }

    pub fn container<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Node<T>>,
    {
        Self::Container(members.into_iter().collect_vec())
    }

    pub fn empty() -> Self {
        Self::Container(Vec::new())
    }

    /// A container holding one element per value, in iteration order.
    pub fn from_elements<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::container(values.into_iter().map(Self::Element))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }

    pub fn members(&self) -> Option<&[Node<T>]> {
        match self {
            Self::Element(_) => None,
            Self::Container(members) => Some(members),
        }
    }

    /// Number of stored members, duplicates included. Elements have none.
    pub fn cardinality(&self) -> usize {
        self.members().map_or(0, <[_]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.cardinality() == 0
    }

    /// How many singleton layers wrap the value, i.e. how many calls to
    /// [`Node::pull_up_one_level`] would actually unwrap something.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Self::Container(members) = current
            && let [only] = members.as_slice()
        {
            depth += 1;
            current = only;
        }
        depth
    }

    /// Largest number of container layers around any element or empty set, `0` for an element.
    pub fn nesting_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, level)) = stack.pop() {
            if let Self::Container(members) = node {
                deepest = deepest.max(level + 1);
                stack.extend(members.iter().map(|member| (member, level + 1)));
            }
        }
        deepest
    }

    /// Members of a container, or an error naming `op` for an element.
    pub(crate) fn operand(&self, op: SetOp) -> SetResult<&[Node<T>]> {
        self.members().ok_or(SetError::ElementOperand { op })
    }
}

/// Multiset comparison under structural equality. Greedy matching is sound since structural
/// equality is an equivalence relation.
fn same_members<T: PartialEq>(left: &[Node<T>], right: &[Node<T>]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut matched = vec![false; right.len()];
    left.iter().all(|member| {
        let found = (0..right.len()).find(|&i| !matched[i] && right[i] == *member);
        if let Some(i) = found {
            matched[i] = true;
            true
        } else {
            false
        }
    })
}

impl<T: PartialEq> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Container(a), Self::Container(b)) => same_members(a, b),
            _ => false,
        }
    }
}

impl<T: Eq> Eq for Node<T> {}

/// Tears nested containers down with a heap stack, so dropping a node never recurses once per
/// nesting layer.
impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        let Self::Container(members) = self else {
            return;
        };
        if members.iter().all(Self::is_element) {
            return;
        }
        let mut stack = std::mem::take(members);
        while let Some(mut node) = stack.pop() {
            if let Self::Container(children) = &mut node {
                stack.append(children);
            }
        }
    }
}

impl<T> From<Vec<Node<T>>> for Node<T> {
    fn from(members: Vec<Node<T>>) -> Self {
        Self::Container(members)
    }
}

impl<T> FromIterator<Node<T>> for Node<T> {
    fn from_iter<I: IntoIterator<Item = Node<T>>>(iter: I) -> Self {
        Self::container(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[i32]) -> Node<i32> {
        Node::from_elements(values.iter().copied())
    }

    #[test]
    fn equality_ignores_order() {
        assert_eq!(set(&[1, 2, 3]), set(&[3, 1, 2]));
        assert_ne!(set(&[1, 2]), set(&[1, 2, 3]));
    }

    #[test]
    fn equality_counts_duplicates() {
        assert_ne!(set(&[1, 1, 2]), set(&[1, 2, 2]));
        assert_eq!(set(&[1, 2, 1]), set(&[1, 1, 2]));
    }

    #[test]
    fn equality_is_recursive() {
        let a = Node::container([set(&[1, 2]), Node::element(3)]);
        let b = Node::container([Node::element(3), set(&[2, 1])]);
        assert_eq!(a, b);

        let c = Node::container([set(&[1]), Node::element(3)]);
        assert_ne!(a, c);
    }

    #[test]
    fn elements_never_equal_containers() {
        assert_ne!(Node::element(1), set(&[1]));
        assert_ne!(Node::<i32>::empty(), Node::element(0));
    }

    #[test]
    fn copies_are_independent() {
        let original = set(&[1, 2]);
        let mut copy = original.clone();
        copy.union([&set(&[3])]).unwrap();
        assert_eq!(original, set(&[1, 2]));
        assert_eq!(copy, set(&[1, 2, 3]));
    }

    #[test]
    fn depth_counts_singleton_layers() {
        assert_eq!(set(&[1, 2]).depth(), 0);
        assert_eq!(Node::container([set(&[1, 2])]).depth(), 1);
        assert_eq!(Node::container([Node::container([Node::element(5)])]).depth(), 2);
        assert_eq!(Node::element(5).depth(), 0);
    }

    #[test]
    fn nesting_depth_takes_deepest_branch() {
        assert_eq!(Node::element(1).nesting_depth(), 0);
        assert_eq!(Node::<i32>::empty().nesting_depth(), 1);
        let node = Node::container([set(&[1]), Node::container([Node::container([])])]);
        assert_eq!(node.nesting_depth(), 3);
        assert_eq!(node.depth(), 0);
    }

    #[test]
    fn very_deep_nodes_drop() {
        let mut node = set(&[1]);
        node.push_down(1_000_000);
        assert_eq!(node.depth(), 1_000_001);
        assert_eq!(node.nesting_depth(), 1_000_001);
        drop(node);
    }

    #[test]
    fn cardinality_includes_duplicates() {
        assert_eq!(set(&[1, 1, 2]).cardinality(), 3);
        assert_eq!(Node::element(1).cardinality(), 0);
        assert!(Node::<i32>::empty().is_empty());
    }
}
