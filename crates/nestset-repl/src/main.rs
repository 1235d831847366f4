use std::env;
use std::error::Error;
use std::path::Path;
use std::str::FromStr;

use context::Context;
use exec::ExecContext;
use itertools::Itertools;
use tracing::Level;

mod context;
mod exec;
mod operation;
mod repl;

const LOG_ENV_VAR: &str = "NESTSET_LOG";

fn log_level() -> Level {
    env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|level| Level::from_str(&level).ok())
        .unwrap_or(Level::WARN)
}

fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = env::args().collect_vec();
    let mut ctx = Context::default();
    if args.len() == 1 {
        repl::repl(&mut ctx)?;
    } else {
        let path = Path::new(&args[1]);
        exec::exec_file(path, &mut ExecContext::default(), &mut ctx)?;
    }
    Ok(())
}
