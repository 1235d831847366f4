use itertools::Itertools;
use lazy_regex::regex_find;
use std::borrow::Cow;
use strum::IntoEnumIterator;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter, MatchingBracketHighlighter};
use rustyline::validate::MatchingBracketValidator;
use rustyline::{Completer, Helper, Hinter, Validator};
use rustyline::{CompletionType, Config, Editor};

use crate::context::Context;
use crate::exec::{ExecContext, ExecResult, exec_line};
use crate::operation::Operation;

const HISTORY_FILE: &str = "nestset_history.txt";

#[derive(Helper, Completer, Hinter, Validator)]
struct ReplHelper {
    #[rustyline(Completer)]
    completer: OperationCompleter,
    highlighter: MatchingBracketHighlighter,
    #[rustyline(Validator)]
    validator: MatchingBracketValidator,
}

struct OperationCompleter {}

impl Completer for OperationCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        // Operations only ever start a line or the right hand side of a definition
        if pos == line.len()
            && let Some(partial) = regex_find!(r"(?:^|:=\s*)[a-z]+$", line)
        {
            let partial = partial.trim_start_matches(|c: char| c == ':' || c == '=' || c.is_whitespace());
            let start = pos - partial.len();
            let ops = Operation::iter().filter(|op| op.to_string().starts_with(partial));
            let pairs = ops
                .map(|op| Pair {
                    display: op.to_string(),
                    replacement: format!("{op} "),
                })
                .collect_vec();
            Ok((start, pairs))
        } else {
            Ok((0, Vec::with_capacity(0)))
        }
    }
}

/// Only braces are highlighted, so unbalanced sets stand out while typing.
impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, kind: CmdKind) -> bool {
        self.highlighter.highlight_char(line, pos, kind)
    }
}

pub fn repl(ctx: &mut Context) -> rustyline::Result<()> {
    println!("\nStarting Nestset REPL...");

    let prompt = "{}> ";

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .auto_add_history(true)
        .build();
    let helper = ReplHelper {
        completer: OperationCompleter {},
        highlighter: MatchingBracketHighlighter::new(),
        validator: MatchingBracketValidator::new(),
    };

    let mut editor = Editor::with_config(config)?;
    editor.set_helper(Some(helper));

    if editor.load_history(HISTORY_FILE).is_err() {
        println!("No history file found. Creating empty file \n");
    }

    let mut exec_ctx = ExecContext {
        is_repl: true,
        ..Default::default()
    };

    loop {
        println!();
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(err) => {
                println!("Encountered error while reading input: {err}");
                continue;
            }
        };

        if let Err(err) = editor.save_history(HISTORY_FILE) {
            tracing::warn!(%err, "could not save history");
        }

        if let Some(ExecResult::Exit) = exec_line(&line, &mut exec_ctx, ctx) {
            println!("Exiting...");
            break;
        }
    }
    Ok(())
}
