use itertools::Itertools;
use std::fmt::Display;

use crate::node::Node;

#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    /// Print empty sets as `∅` instead of `{}`.
    pub empty_set_symbol: bool,
    /// Put each top level member on a line of its own. Only affects non-empty sets.
    pub one_member_per_line: bool,
}

impl<T: Display> Node<T> {
    pub fn to_string_opts(&self, opts: PrintOptions) -> String {
        match self {
            Node::Container(members) if !members.is_empty() && opts.one_member_per_line => {
                let inner_opts = PrintOptions {
                    one_member_per_line: false,
                    ..opts
                };
                let lines = members
                    .iter()
                    .map(|member| format!("    {}", member.to_string_opts(inner_opts)))
                    .join(",\n");
                format!("{{\n{lines}\n}}")
            }
            _ => self.to_inline_string(opts),
        }
    }

    fn to_inline_string(&self, opts: PrintOptions) -> String {
        match self {
            Node::Element(value) => value.to_string(),
            Node::Container(members) if members.is_empty() && opts.empty_set_symbol => {
                "∅".to_owned()
            }
            Node::Container(members) => format!(
                "{{{}}}",
                members
                    .iter()
                    .map(|member| member.to_inline_string(opts))
                    .join(", ")
            ),
        }
    }
}

/// Roster notation, e.g. `{1, {2, x}}`.
impl<T: Display> Display for Node<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_opts(PrintOptions::default()))
    }
}
