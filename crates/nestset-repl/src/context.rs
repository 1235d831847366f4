use std::collections::HashMap;

use nestset::{Atom, Node};

/// Sets defined with `:=`, by name.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub variables: HashMap<String, Node<Atom>>,
}

impl Context {
    pub fn get_var(&self, name: &str) -> Option<&Node<Atom>> {
        self.variables.get(name)
    }

    pub fn set_var(&mut self, name: String, set: Node<Atom>) {
        self.variables.insert(name, set);
    }

    pub fn del_var(&mut self, name: &str) -> Option<Node<Atom>> {
        self.variables.remove(name)
    }

    pub fn clear(&mut self) {
        self.variables.clear();
    }
}
