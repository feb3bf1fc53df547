//! Driver: load a front-end dump, translate, write Zig source.

pub mod cli;
#[cfg(test)]
mod tests_driver;

use std::fs;
use std::io::Write;

use log::debug;

use crate::c_ast::CAst;
use crate::error::Error;
use crate::translator;

pub use cli::Cli;

/// Run one translation according to the CLI configuration.
pub fn run(cli: &Cli) -> Result<(), Error> {
    let input = fs::read_to_string(&cli.input)?;
    let ast: CAst = serde_json::from_str(&input)?;
    debug!(
        "loaded unit: {} decls, {} macros, target {}",
        ast.top_decls.len(),
        ast.macros.len(),
        ast.target
    );

    let output = translator::translate(&ast);
    let rendered = output.render();

    match &cli.output {
        Some(path) => fs::write(path, rendered)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
        }
    }
    Ok(())
}
