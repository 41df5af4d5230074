use std::io::Write;

use anyhow::{bail, Result};
use rustyline::{error::ReadlineError, Editor};

use crate::term::TermRef;

mod eval;
mod parser;
mod term;

const HISTORY_FILE: &str = "history.txt";

fn parse_line(input: &str) -> Result<TermRef, parser::ParseError> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    parser::parse(&collapsed)
}

fn exec(input: &str) -> Result<()> {
    if let Some(input) = input.strip_prefix("parse") {
        let term = parse_line(input)?;
        println!("{term:?}");
    } else if let Some(input) = input.strip_prefix("limit") {
        let input = input.trim_start();
        let (steps, input) = input.split_once(' ').unwrap_or((input, ""));
        let steps: usize = steps.parse()?;
        let term = parse_line(input)?;
        let result = eval::normalize_within(&term, steps)?;
        println!("{term} = {result}");
    } else {
        let term = parse_line(input)?;
        println!("{} = {}", term, eval::normalize(&term));
    }
    Ok(())
}

fn show_help() {
    println!(
        "{}",
        r#"
x                  -- a variable is one character; digits and '_' are reserved
(λx.E) or (\x.E)   -- abstraction binding x in E
(λx y.E)           -- shorthand for (λx.(λy.E))
(E1 E2 ... En)     -- application, grouping to the left

E                  -- reduce E to normal form and show it
parse E            -- show the syntax tree of E without reducing it
limit N E          -- reduce E, giving up after N beta reductions
help               -- show this message
clear              -- clear the screen
quit               -- leave the evaluator
"#
        .trim()
    );
}

fn main() -> Result<()> {
    println!("Hi, this is an untyped lambda calculus evaluator. help to show help.");
    let mut editor = Editor::<()>::new();
    editor.load_history(HISTORY_FILE).ok();
    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                editor.add_history_entry(input);
                match input {
                    "quit" => {
                        println!("Bye!");
                        break;
                    }
                    "help" => show_help(),
                    "clear" => {
                        print!("\x1b[2J\x1b[1;1H");
                        std::io::stdout().flush().ok();
                    }
                    _ => {
                        if let Err(e) = exec(input) {
                            eprintln!("Error: {e}")
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye!");
                break;
            }
            Err(e) => bail!(e),
        }
    }
    editor.save_history(HISTORY_FILE).ok();
    Ok(())
}
