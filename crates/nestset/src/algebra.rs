use crate::{
    error::{SetOp, SetResult},
    node::Node,
};

impl<T: PartialEq + Clone> Node<T> {
    /// Joins each of `others` into this set, removing structural duplicates after every join.
    ///
    /// Fails without modifying anything if any operand is an element.
    pub fn union<'a, I>(&mut self, others: I) -> SetResult<()>
    where
        I: IntoIterator<Item = &'a Node<T>>,
        T: 'a,
    {
        let others: Vec<_> = others
            .into_iter()
            .map(|other| other.operand(SetOp::Union))
            .collect::<SetResult<_>>()?;
        let mut members = self.operand(SetOp::Union)?.to_vec();

        for other in others {
            members.extend_from_slice(other);
            members = first_occurrences(members);
        }
        *self = Self::Container(members);
        Ok(())
    }

    /// Keeps the members also found in every one of `others`. Duplicates are not removed.
    pub fn intersection<'a, I>(&mut self, others: I) -> SetResult<()>
    where
        I: IntoIterator<Item = &'a Node<T>>,
        T: 'a,
    {
        let others: Vec<_> = others
            .into_iter()
            .map(|other| other.operand(SetOp::Intersection))
            .collect::<SetResult<_>>()?;
        let mut members = self.operand(SetOp::Intersection)?.to_vec();

        for other in others {
            members.retain(|member| other.contains(member));
        }
        *self = Self::Container(members);
        Ok(())
    }

    /// Drops the members found in any of `others`. Duplicates are not removed.
    pub fn difference<'a, I>(&mut self, others: I) -> SetResult<()>
    where
        I: IntoIterator<Item = &'a Node<T>>,
        T: 'a,
    {
        let others: Vec<_> = others
            .into_iter()
            .map(|other| other.operand(SetOp::Difference))
            .collect::<SetResult<_>>()?;
        let mut members = self.operand(SetOp::Difference)?.to_vec();

        for other in others {
            members.retain(|member| !other.contains(member));
        }
        *self = Self::Container(members);
        Ok(())
    }

    /// `left − right` as a new node, leaving both operands alone.
    pub fn pure_difference(left: &Self, right: &Self) -> SetResult<Self> {
        let mut result = left.clone();
        result.difference([right])?;
        Ok(result)
    }

    /// Keeps only the first occurrence of each structurally distinct member.
    ///
    /// Every member is compared against all members kept so far, so this is quadratic in the
    /// number of members. Elements are left as they are.
    pub fn deduplicate(&mut self) {
        if let Self::Container(members) = self {
            *members = first_occurrences(std::mem::take(members));
        }
    }
}

pub(crate) fn first_occurrences<T: PartialEq>(members: Vec<Node<T>>) -> Vec<Node<T>> {
    let mut unique: Vec<Node<T>> = Vec::with_capacity(members.len());
    for member in members {
        if !unique.contains(&member) {
            unique.push(member);
        }
    }
    unique
}
