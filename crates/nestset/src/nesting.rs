use crate::node::Node;

impl<T> Node<T> {
    /// Wraps the value in `depth` additional singleton containers.
    pub fn push_down(&mut self, depth: usize) {
        for _ in 0..depth {
            let inner = std::mem::replace(self, Self::empty());
            *self = Self::Container(vec![inner]);
        }
    }

    /// Replaces a singleton container with its only member.
    ///
    /// Anything else (an element, an empty container, or one with several members) is left
    /// untouched and the caller gets no indication of it. Callers may rely on this, so it is kept
    /// even though an ambiguous unwrap probably deserves an error.
    pub fn pull_up_one_level(&mut self) {
        if let Self::Container(members) = self
            && members.len() == 1
        {
            let only = members.remove(0);
            *self = only;
        }
    }

    /// Calls [`Node::pull_up_one_level`] exactly `height` times.
    pub fn pull_up(&mut self, height: usize) {
        for _ in 0..height {
            self.pull_up_one_level();
        }
    }
}
