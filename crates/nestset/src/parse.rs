use lazy_regex::{regex_find, regex_is_match};
use malachite::Integer;
use std::{fmt::Display, str::FromStr};

use crate::{atom::Atom, node::Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeError {
    message: &'static str,
    start: usize,
    end: usize,
}

pub type ParseResult<T> = Result<T, ParseNodeError>;

impl Display for ParseNodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseNodeError {}

impl ParseNodeError {
    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Byte range of the offending input.
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Prints the subject with the offending part underlined.
    pub fn pretty_print(&self, subject: &str) {
        let offset = subject
            .get(..self.start)
            .map_or(0, |before| before.chars().count());
        let width = subject
            .get(self.start..self.end)
            .map_or(1, |span| span.chars().count().max(1));
        println!("{subject}");
        println!(
            "{}\x1b[31m{}\x1b[0m {}",
            " ".repeat(offset),
            "^".repeat(width),
            self.message
        );
    }
}

pub fn is_valid_identifier(name: &str) -> bool {
    regex_is_match!(r"^\p{L}[\p{L}0-9_]*$", name)
}

/// Braces open at once before the parser gives up, since it recurses once per level.
pub const MAX_PARSE_DEPTH: usize = 1_000;

struct Parser<'a> {
    subject: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.subject[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn error_at_next_char(&self, message: &'static str) -> ParseNodeError {
        let len = self.rest().chars().next().map_or(0, char::len_utf8);
        ParseNodeError {
            message,
            start: self.pos,
            end: self.pos + len,
        }
    }

    fn node(&mut self) -> ParseResult<Node<Atom>> {
        self.skip_whitespace();
        if self.rest().starts_with('{') {
            self.container()
        } else if self.eat('∅') {
            Ok(Node::empty())
        } else {
            self.atom().map(Node::Element)
        }
    }

    fn container(&mut self) -> ParseResult<Node<Atom>> {
        let start = self.pos;
        if self.depth == MAX_PARSE_DEPTH {
            return Err(ParseNodeError {
                message: "sets nested too deeply",
                start,
                end: start + 1,
            });
        }
        self.eat('{');
        self.depth += 1;
        let members = self.members(start);
        self.depth -= 1;
        members.map(Node::Container)
    }

    fn members(&mut self, start: usize) -> ParseResult<Vec<Node<Atom>>> {
        let mut members = Vec::new();

        self.skip_whitespace();
        if self.eat('}') {
            return Ok(members);
        }

        loop {
            members.push(self.node()?);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(members);
            }
            if self.rest().is_empty() {
                return Err(ParseNodeError {
                    message: "unclosed brace",
                    start,
                    end: start + 1,
                });
            }
            return Err(self.error_at_next_char("expected ',' or '}'"));
        }
    }

    fn atom(&mut self) -> ParseResult<Atom> {
        let rest = self.rest();
        if let Some(digits) = regex_find!(r"^-?[0-9]+", rest) {
            let int = Integer::from_str(digits).map_err(|()| ParseNodeError {
                message: "invalid integer",
                start: self.pos,
                end: self.pos + digits.len(),
            })?;
            self.pos += digits.len();
            Ok(Atom::Integer(int))
        } else if let Some(name) = regex_find!(r"^\p{L}[\p{L}0-9_]*", rest) {
            self.pos += name.len();
            Ok(Atom::Symbol(name.to_owned()))
        } else if rest.is_empty() {
            Err(self.error_at_next_char("expected a set or an element"))
        } else {
            Err(self.error_at_next_char("unexpected character"))
        }
    }
}

/// Reads a set in roster notation, such as `{1, {2, x}, ∅}`. A lone integer or symbol is read as
/// an element.
pub fn parse(subject: &str) -> ParseResult<Node<Atom>> {
    let mut parser = Parser {
        subject,
        pos: 0,
        depth: 0,
    };
    let node = parser.node()?;
    parser.skip_whitespace();
    if !parser.rest().is_empty() {
        return Err(ParseNodeError {
            message: "unexpected input after set",
            start: parser.pos,
            end: subject.len(),
        });
    }
    Ok(node)
}

impl FromStr for Node<Atom> {
    type Err = ParseNodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Node<Atom> {
        Node::from_elements(values.iter().map(|v| Atom::from(*v)))
    }

    #[test]
    fn parse_successfully() {
        assert!(parse("{}").is_ok());
        assert!(parse("{1, 2, 3}").is_ok());
        assert!(parse(" { {1} ,x_1,∅ } ").is_ok());
        assert!(parse("-12").is_ok());
    }

    #[test]
    fn nested_sets() {
        let parsed = parse("{{1, 2}, 3, {}}").unwrap();
        assert_eq!(
            parsed,
            Node::container([ints(&[1, 2]), Node::element(Atom::from(3)), Node::empty()])
        );
    }

    #[test]
    fn symbols_and_big_integers() {
        let parsed: Node<Atom> = "{a, 123456789012345678901234567890}".parse().unwrap();
        let big = Integer::from_str("123456789012345678901234567890").unwrap();
        assert_eq!(
            parsed,
            Node::container([Node::element(Atom::from("a")), Node::element(Atom::from(big))])
        );
    }

    #[test]
    fn empty_set_symbol() {
        assert_eq!(parse("∅").unwrap(), Node::empty());
        assert_eq!(parse("{∅}").unwrap(), parse("{{}}").unwrap());
    }

    #[test]
    fn display_round_trip() {
        let subject = "{{}, 1, {2, x}}";
        assert_eq!(parse(subject).unwrap().to_string(), subject);
    }

    #[test]
    fn errors_point_at_input() {
        let err = parse("{1, 2").unwrap_err();
        assert_eq!(err.message(), "unclosed brace");
        assert_eq!(err.span(), (0, 1));

        let err = parse("{1 2}").unwrap_err();
        assert_eq!(err.message(), "expected ',' or '}'");
        assert_eq!(err.span(), (3, 4));

        let err = parse("{1}}").unwrap_err();
        assert_eq!(err.message(), "unexpected input after set");

        assert!(parse("{1, }").is_err());
        assert!(parse("").is_err());
        assert!(parse("{+}").is_err());
    }

    #[test]
    fn nesting_limit() {
        let at_limit = format!("{}{}", "{".repeat(MAX_PARSE_DEPTH), "}".repeat(MAX_PARSE_DEPTH));
        assert_eq!(parse(&at_limit).unwrap().depth(), MAX_PARSE_DEPTH - 1);

        let beyond = format!("{{{at_limit}}}");
        let err = parse(&beyond).unwrap_err();
        assert_eq!(err.message(), "sets nested too deeply");
        assert_eq!(err.span(), (MAX_PARSE_DEPTH, MAX_PARSE_DEPTH + 1));
    }

    #[test]
    fn identifiers() {
        assert!(is_valid_identifier("A"));
        assert!(is_valid_identifier("set_2"));
        assert!(!is_valid_identifier("2set"));
        assert!(!is_valid_identifier("a b"));
    }
}
