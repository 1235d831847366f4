use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, prelude::*};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use itertools::Itertools;
use lazy_regex::regex_captures;
use strum::IntoEnumIterator;
use tracing::debug;

use nestset::display::PrintOptions;
use nestset::parse::{MAX_PARSE_DEPTH, ParseNodeError, is_valid_identifier, parse};
use nestset::{Atom, Node, PowersetAlgorithm, SetError};

use crate::context::Context;
use crate::operation::Operation;

/// Sets with more members than this are printed one member per line when pretty printing.
const PRETTY_PRINT_THRESHOLD: usize = 4;

/// Deepest set the REPL will hold. Printing and comparing recurse once per layer, and anything
/// deeper could not be typed back in.
const MAX_NESTING: usize = MAX_PARSE_DEPTH;

pub struct ExecContext {
    pub is_repl: bool,
    pub debug_mode: bool,
    pub pretty_printing: bool,
    pub empty_set_symbol: bool,
}

impl Default for ExecContext {
    fn default() -> Self {
        Self {
            is_repl: false,
            debug_mode: false,
            pretty_printing: true,
            empty_set_symbol: false,
        }
    }
}

impl ExecContext {
    fn print_options(&self, set: &Node<Atom>) -> PrintOptions {
        PrintOptions {
            empty_set_symbol: self.empty_set_symbol,
            one_member_per_line: self.pretty_printing
                && set.cardinality() > PRETTY_PRINT_THRESHOLD,
        }
    }
}

pub fn exec_file(
    path: &Path,
    exec_ctx: &mut ExecContext,
    ctx: &mut Context,
) -> std::io::Result<()> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    exec_reader(reader, exec_ctx, ctx)
}

fn exec_reader(
    reader: BufReader<File>,
    exec_ctx: &mut ExecContext,
    ctx: &mut Context,
) -> std::io::Result<()> {
    for res in reader.lines() {
        let line = res?;
        if let Some(string) = line.strip_prefix("!") {
            println!("{}", string.trim());
            continue;
        }

        let res = exec_line(&line, exec_ctx, ctx);
        match res {
            Some(ExecResult::Error | ExecResult::Exit) => return Ok(()),
            None => (),
        }
    }
    Ok(())
}

pub enum ExecResult {
    Exit,
    Error,
}

#[derive(Debug)]
enum ExecError {
    Parse {
        subject: String,
        error: ParseNodeError,
    },
    Set(SetError),
    UndefinedVariable(String),
    MissingOperand {
        op: Operation,
    },
    WrongOperandCount {
        op: Operation,
        expected: usize,
        got: usize,
    },
    InvalidCount(String),
    NotASet,
    TooDeep {
        depth: usize,
    },
}

impl From<SetError> for ExecError {
    fn from(error: SetError) -> Self {
        Self::Set(error)
    }
}

impl Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ExecError::*;
        let s = match self {
            Parse { error, .. } => error.to_string(),
            Set(error) => error.to_string(),
            UndefinedVariable(name) => format!("{name} is not defined"),
            MissingOperand { op } => format!("{op} needs at least one operand"),
            WrongOperandCount { op, expected, got } => {
                format!("wrong number of operands for {op}, expected at most {expected} but got {got}")
            }
            InvalidCount(text) => format!("{text} is not a natural number"),
            NotASet => "only sets can be assigned to variables".to_owned(),
            TooDeep { depth } => {
                format!("set would be nested {depth} levels deep, at most {MAX_NESTING} are supported")
            }
        };
        write!(f, "{s}")
    }
}

impl ExecError {
    fn report(&self) {
        if let Self::Parse { subject, error } = self {
            error.pretty_print(subject);
        } else {
            println!("Error: {self}");
        }
    }
}

enum Value {
    Set(Node<Atom>),
    Count(usize),
    Report(String),
}

pub fn exec_line(
    mut line: &str,
    exec_ctx: &mut ExecContext,
    ctx: &mut Context,
) -> Option<ExecResult> {
    if line.is_empty() {
        return None;
    }

    if let Some(remainder) = line.strip_prefix(":") {
        let shutdown = eval_command(remainder, exec_ctx, ctx);
        return if shutdown {
            Some(ExecResult::Exit)
        } else {
            None
        };
    }

    if let Some((body, _comment)) = line.split_once("#") {
        line = body;
    }
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some((head, tail)) = line.split_once(":=") {
        let name = head.trim();
        if !is_valid_identifier(name) || Operation::from_str(name).is_ok() {
            println!("Invalid variable name: {name}");
            return Some(ExecResult::Error);
        }

        let evaluated = evaluate(tail.trim(), ctx).and_then(|value| match value {
            Value::Set(set) => Ok(set),
            Value::Count(_) | Value::Report(_) => Err(ExecError::NotASet),
        });
        let set = match evaluated {
            Ok(set) => set,
            Err(error) => {
                error.report();
                return Some(ExecResult::Error);
            }
        };

        if exec_ctx.debug_mode {
            println!("Structure: {set:?}");
        }
        ctx.set_var(name.to_owned(), set);
        if exec_ctx.is_repl {
            println!("Defined variable {name}");
        }
    } else {
        let value = match evaluate(line, ctx) {
            Ok(value) => value,
            Err(error) => {
                error.report();
                return Some(ExecResult::Error);
            }
        };
        print_value(&value, exec_ctx);
    }
    None
}

fn print_value(value: &Value, exec_ctx: &ExecContext) {
    match value {
        Value::Set(set) => {
            println!("{}", set.to_string_opts(exec_ctx.print_options(set)));
            if exec_ctx.debug_mode {
                println!();
                println!("Structure: {set:?}");
            }
        }
        Value::Count(count) => println!("{count}"),
        Value::Report(report) => println!("{report}"),
    }
}

/// Splits on whitespace outside of braces.
fn split_operands(subject: &str) -> Vec<&str> {
    let mut operands = Vec::new();
    let mut depth = 0i32;
    let mut start = None;
    for (i, c) in subject.char_indices() {
        match c {
            '{' => {
                depth += 1;
                start.get_or_insert(i);
            }
            '}' => {
                depth -= 1;
                start.get_or_insert(i);
            }
            c if c.is_whitespace() && depth <= 0 => {
                if let Some(s) = start.take() {
                    operands.push(&subject[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        operands.push(&subject[s..]);
    }
    operands
}

fn operand(subject: &str, ctx: &Context) -> Result<Node<Atom>, ExecError> {
    if is_valid_identifier(subject) {
        return ctx
            .get_var(subject)
            .cloned()
            .ok_or_else(|| ExecError::UndefinedVariable(subject.to_owned()));
    }
    parse(subject).map_err(|error| ExecError::Parse {
        subject: subject.to_owned(),
        error,
    })
}

fn evaluate(subject: &str, ctx: &Context) -> Result<Value, ExecError> {
    let value = evaluate_unchecked(subject, ctx)?;
    if let Value::Set(set) = &value {
        let depth = set.nesting_depth();
        if depth > MAX_NESTING {
            return Err(ExecError::TooDeep { depth });
        }
    }
    Ok(value)
}

fn evaluate_unchecked(subject: &str, ctx: &Context) -> Result<Value, ExecError> {
    if let Some((_, head, tail)) = regex_captures!(r"^([a-z]+)(?:\s+|$)(.*)$", subject)
        && let Ok(op) = Operation::from_str(head)
    {
        debug!(%op, operands = tail, "applying operation");
        apply(op, &split_operands(tail), ctx)
    } else {
        operand(subject, ctx).map(Value::Set)
    }
}

fn expect_operands(op: Operation, operands: &[&str], expected: usize) -> Result<(), ExecError> {
    if operands.len() > expected {
        Err(ExecError::WrongOperandCount {
            op,
            expected,
            got: operands.len(),
        })
    } else {
        Ok(())
    }
}

fn apply(op: Operation, operands: &[&str], ctx: &Context) -> Result<Value, ExecError> {
    use Operation::*;
    let Some((first, rest)) = operands.split_first() else {
        return Err(ExecError::MissingOperand { op });
    };
    let mut set = operand(first, ctx)?;

    if let Some(algorithm) = op.algorithm() {
        expect_operands(op, operands, 1)?;
        return Ok(Value::Set(algorithm.apply(&set)?));
    }

    match op {
        Compare => {
            expect_operands(op, operands, 1)?;
            compare(&set).map(Value::Report)
        }
        Masks => {
            expect_operands(op, operands, 1)?;
            masks_table(&set).map(Value::Report)
        }
        Union | Intersection | Difference => {
            let others = rest
                .iter()
                .map(|subject| operand(subject, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            match op {
                Union => set.union(&others)?,
                Intersection => set.intersection(&others)?,
                _ => set.difference(&others)?,
            }
            Ok(Value::Set(set))
        }
        Deduplicate => {
            expect_operands(op, operands, 1)?;
            set.deduplicate();
            Ok(Value::Set(set))
        }
        PushDown | PullUp => {
            expect_operands(op, operands, 2)?;
            let count = match rest.first() {
                Some(text) => text
                    .parse::<usize>()
                    .map_err(|_| ExecError::InvalidCount((*text).to_owned()))?,
                None => 1,
            };
            if op == PushDown {
                let depth = set.nesting_depth().saturating_add(count);
                if depth > MAX_NESTING {
                    return Err(ExecError::TooDeep { depth });
                }
                set.push_down(count);
            } else {
                set.pull_up(count);
            }
            Ok(Value::Set(set))
        }
        Cardinality => {
            expect_operands(op, operands, 1)?;
            Ok(Value::Count(set.cardinality()))
        }
        Depth => {
            expect_operands(op, operands, 1)?;
            Ok(Value::Count(set.depth()))
        }
        PowersetBinary | PowersetRecursive | PowersetMixed => {
            unreachable!("powerset operations are applied above")
        }
    }
}

fn compare(set: &Node<Atom>) -> Result<String, ExecError> {
    let mut lines = Vec::new();
    let mut results = Vec::new();
    for algorithm in PowersetAlgorithm::iter() {
        let start = Instant::now();
        let pset = algorithm.apply(set)?;
        let elapsed = start.elapsed();
        debug!(%algorithm, ?elapsed, "powerset finished");
        lines.push(format!(
            "{algorithm}: {} subsets in {elapsed:.2?}",
            pset.cardinality()
        ));
        results.push(pset);
    }

    let verdict = if results.iter().all_equal() {
        "All three results agree"
    } else {
        "Results differ"
    };
    lines.push(verdict.to_owned());
    Ok(lines.join("\n"))
}

fn masks_table(set: &Node<Atom>) -> Result<String, ExecError> {
    let (pset, masks) = set.power_set_bin_with_masks()?;
    let members = set.members().unwrap_or(&[]);
    let width = masks.len().saturating_sub(1).to_string().len();

    let rows = masks
        .iter()
        .enumerate()
        .map(|(i, mask)| {
            let bits: String = mask.iter().rev().map(|bit| if *bit { '1' } else { '0' }).collect();
            let subset: Node<Atom> = members
                .iter()
                .zip(mask)
                .filter(|(_, bit)| **bit)
                .map(|(member, _)| member.clone())
                .collect();
            format!("{i:>width$}  {bits}  {subset}")
        })
        .join("\n");
    Ok(format!("{rows}\n{} subsets", pset.cardinality()))
}

fn eval_command(command: &str, exec_ctx: &mut ExecContext, ctx: &mut Context) -> bool {
    let Some(kind) = command.chars().next() else {
        return false;
    };
    let args_str = command[kind.len_utf8()..].trim();

    let args = if args_str.is_empty() {
        Vec::with_capacity(0)
    } else {
        args_str.split(' ').collect_vec()
    };
    match kind {
        'q' => return true,
        'h' => {
            if args.is_empty() {
                print_help("");
            }
            for arg in args {
                print_help(arg);
            }
        }
        'l' => list_definitions(ctx),
        's' => update_settings(&args, exec_ctx),
        'r' => reset_definitions(&args, ctx),
        'e' => {
            if let Some(name) = args.first() {
                let path = Path::new(name);
                let res = exec_file(path, exec_ctx, ctx);
                if res.is_err() {
                    println!("Cannot open file");
                }
            }
        }
        _ => println!("Unknown command type {kind}. Ignoring"),
    }

    false
}

fn reset_definitions(vars: &[&str], ctx: &mut Context) {
    if vars.is_empty() {
        ctx.clear();
    } else {
        for arg in vars {
            if ctx.del_var(arg).is_none() {
                println!("{arg} is not defined");
            }
        }
    }
}

fn list_definitions(ctx: &Context) {
    println!("\nVariables:");
    for (name, set) in ctx.variables.iter().sorted_by_key(|(name, _)| *name) {
        println!("   {name: <4}=   {set}");
    }
}

fn update_settings(args: &[&str], exec_ctx: &mut ExecContext) {
    match args.first() {
        Some(&"debug") => exec_ctx.debug_mode = true,
        Some(&"normal") => exec_ctx.debug_mode = false,
        Some(&"pretty") => exec_ctx.pretty_printing = true,
        Some(&"ugly") => exec_ctx.pretty_printing = false,
        Some(&"unicode") => exec_ctx.empty_set_symbol = true,
        Some(&"ascii") => exec_ctx.empty_set_symbol = false,
        _ => println!("Unknown setting"),
    }
}

fn print_help(arg_string: &str) {
    if arg_string.is_empty() {
        println!(
            "Nestset, nested sets and their powersets

Type a set in roster notation, like {{1, {{2, x}}}}, to see it.
Use := to define variables, and put an operation in front of sets to apply it.
For a list of operations, type :h operations
For a list of commands, type :h commands"
        );
    }

    if arg_string == "commands" {
        println!(
            ":q            quit
:h [topic]    help on a topic, operation or command list
:l            list variables
:s <setting>  debug, normal, pretty, ugly, unicode or ascii
:r [names]    remove some or all variables
:e <file>     execute a file"
        );
    }

    if arg_string == "operations" {
        for op in Operation::iter() {
            println!("{op: <8} ({})", op.signature_string());
        }
    }

    if let Ok(op) = Operation::from_str(arg_string) {
        println!("Printing help for {arg_string} operation\n");
        println!("Description: {}", op.description());
        println!("Signature: ({})", op.signature_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_split_outside_braces() {
        assert_eq!(split_operands("A {1, 2}  B"), vec!["A", "{1, 2}", "B"]);
        assert_eq!(split_operands("{{1}, {2 }} 3"), vec!["{{1}, {2 }}", "3"]);
        assert!(split_operands("   ").is_empty());
    }

    #[test]
    fn definitions_and_operations() {
        let mut exec_ctx = ExecContext::default();
        let mut ctx = Context::default();
        assert!(exec_line("A := {1, 2}", &mut exec_ctx, &mut ctx).is_none());
        assert!(exec_line("P := mix A", &mut exec_ctx, &mut ctx).is_none());
        assert_eq!(ctx.get_var("P").map(Node::cardinality), Some(4));

        assert!(exec_line("B := union A {3} # comment", &mut exec_ctx, &mut ctx).is_none());
        assert_eq!(ctx.get_var("B"), Some(&"{1, 2, 3}".parse::<Node<Atom>>().unwrap()));
    }

    #[test]
    fn failures_are_reported() {
        let mut exec_ctx = ExecContext::default();
        let mut ctx = Context::default();
        assert!(matches!(
            exec_line("bin C", &mut exec_ctx, &mut ctx),
            Some(ExecResult::Error)
        ));
        assert!(matches!(
            exec_line("bin := {1}", &mut exec_ctx, &mut ctx),
            Some(ExecResult::Error)
        ));
        assert!(matches!(
            exec_line("N := card {1}", &mut exec_ctx, &mut ctx),
            Some(ExecResult::Error)
        ));
        assert!(matches!(
            exec_line(":q", &mut exec_ctx, &mut ctx),
            Some(ExecResult::Exit)
        ));
    }

    #[test]
    fn evaluation() {
        let mut ctx = Context::default();
        ctx.set_var("A".to_owned(), "{1, 2, 3}".parse().unwrap());

        let Ok(Value::Count(count)) = evaluate("card A", &ctx) else {
            panic!("expected a count");
        };
        assert_eq!(count, 3);

        // Operands are sets or variables, never nested operations
        assert!(matches!(
            evaluate("card rec A", &ctx),
            Err(ExecError::UndefinedVariable(_))
        ));

        let Ok(Value::Set(set)) = evaluate("pull {{{1}}} 2", &ctx) else {
            panic!("expected a set");
        };
        assert_eq!(set, "{1}".parse::<Node<Atom>>().unwrap());

        let Ok(Value::Report(report)) = evaluate("compare A", &ctx) else {
            panic!("expected a report");
        };
        assert!(report.ends_with("All three results agree"));

        assert!(matches!(
            evaluate("push A x", &ctx),
            Err(ExecError::InvalidCount(_))
        ));
    }

    #[test]
    fn nesting_is_capped() {
        let mut ctx = Context::default();
        assert!(matches!(
            evaluate("push {1} 1000000", &ctx),
            Err(ExecError::TooDeep { depth: 1_000_001 })
        ));

        let Ok(Value::Set(deep)) = evaluate(&format!("push {{1}} {}", MAX_NESTING - 1), &ctx)
        else {
            panic!("expected a set");
        };
        assert_eq!(deep.nesting_depth(), MAX_NESTING);
        ctx.set_var("D".to_owned(), deep);
        assert!(matches!(
            evaluate("mix D", &ctx),
            Err(ExecError::TooDeep { .. })
        ));
    }
}
