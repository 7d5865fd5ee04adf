//! # btree_index
//! An in-memory ordered key-value index built on a classic B-tree.
//!
//! ## Features
//! - Generic [`BTreeIndex<K, V>`] with a configurable minimum degree
//! - Insert (first write wins), point search, and delete with full
//!   rebalancing: split, borrow, merge and root collapse
//! - Structural validation of every B-tree invariant
//! - A small line-based command front end over `BTreeIndex<String, String>`
//!
//! ## Usage
//! The library is consumed by the word index (one tree keyed by word)
//! and by the REPL binary in `main.rs`. All reusable logic and unit
//! tests live here so the project can be tested with `cargo test`.
// =====================================================================
// File: lib.rs
// Author: Bob Jack
// Date: Sept 20, 2025 - Reworked Oct. 8, 2025
//
//   This module implements the command-line interface (CLI)
//   that accepts the following commands:
//
//     `SET <key> <value>`   -> Store a key-value pair: OK, or EXISTS if the key is taken
//     `GET <key>`           -> Retrieve the value for a key, or NULL
//     `DEL <key>`           -> Deletes key entry: 1 if removed, 0 if not found
//     `EXISTS <key>`        -> Indicates presence of key: 1 if present, else 0
//     `MGET <k1> [<k2> ...]` -> Gets multiple keys: one line per key: the value or nil
//     `KEYS`                -> Every key in order, one per line, then a final END
//     `LEN`                 -> Number of stored entries
//     `HEIGHT`              -> Number of levels in the tree
//     `CHECK`               -> OK, or the first broken B-tree invariant
//     `EXIT` / `QUIT`       -> Terminate the program
// =====================================================================
pub mod error;
pub use error::{Error, Result};

pub mod index;
pub use index::{BTreeIndex, BTreeNode};

pub mod config;
pub use config::Config;

pub mod session;
pub use session::Session;

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

/// Result of handling a single user command.
///
/// - `Continue` means the REPL should keep running.
/// - `Exit` means the REPL should break out and terminate.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Exit,
}

const PROPER_SYNTAX: &str =
    "Syntax Usage: SET <key> <value>, GET <key>, DEL <key>, EXISTS <key>, MGET <keys...>, KEYS, LEN, HEIGHT, CHECK, EXIT";


/// Read–Evaluate–Print Loop (REPL) to handle command input.
///
/// Reads one command per line from `input`, executes it against the
/// [`Session`], and writes the replies to `out`. Stops at `EXIT`/`QUIT`
/// or at the end of the input.
///
/// # Errors
/// Only I/O errors on `input` or `out` end the loop early. Bad commands
/// are answered with an `ERR:` line and the loop keeps going.
///
/// # Example
/// ```
/// use btree_index::{repl_loop, Config, Session};
///
/// let mut session = Session::new(&Config::default()).unwrap();
/// let mut out = Vec::new();
/// repl_loop(&mut session, "SET dog bark\nGET dog\nEXIT\n".as_bytes(), &mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "OK\nbark\n");
/// ```
pub fn repl_loop<R: BufRead, W: Write>(session: &mut Session, input: R, out: &mut W) -> io::Result<()> {
    for input_line in input.lines() {
        let full_command = input_line?;
        let (cmd, args) = parse_command(&full_command);

        // Process command and arguments
        match handle_command(&cmd, &args, session, out)? {
            CommandResult::Exit => break,
            CommandResult::Continue => (),
        }
        out.flush()?;
    }
    Ok(())
}


/// Parses a raw input line into a command and its arguments.
///
/// The first token is treated as the command (normalized to uppercase),
/// and the remaining tokens are collected as arguments. Leading and
/// trailing whitespace is ignored.
fn parse_command(line: &str) -> (String, Vec<String>) {
    let mut command_segments = line.split_whitespace();
    // Pulling out the command to normalize if lowercase is used
    let cmd = command_segments.next().unwrap_or("").to_uppercase();
    // Remaining arguments
    let args: Vec<String> = command_segments.map(|s| s.to_string()).collect();

    (cmd, args)
}


/// Handles a single user command and returns whether the REPL should
/// continue or exit.
///
/// Replies go to `out`, one per line. Argument errors are printed as
/// `ERR: <reason>`; unknown commands also print the syntax help.
pub fn handle_command<W: Write>(
    cmd: &str,
    args: &[String],
    session: &mut Session,
    out: &mut W,
) -> io::Result<CommandResult> {
    debug!(cmd, args = args.len(), "command");

    match cmd {
        "SET" => reply(out, session.set(args))?,
        "GET" => reply(out, session.get(args))?,
        "DEL" => reply(out, session.del(args))?,
        "EXISTS" => reply(out, session.exists(args))?,
        "LEN" => reply(out, session.len(args))?,
        "HEIGHT" => reply(out, session.height(args))?,

        "MGET" => match session.mget(args) {
            Ok(values) => {
                for value in values {
                    writeln!(out, "{value}")?;
                }
            }
            Err(e) => writeln!(out, "ERR: {e}")?,
        },

        // KEYS - one key per line then a final END
        "KEYS" => match session.keys(args) {
            Ok(keys) => {
                for key in keys {
                    writeln!(out, "{key}")?;
                }
                writeln!(out, "END")?;
            }
            Err(e) => writeln!(out, "ERR: {e}")?,
        },

        "CHECK" => match session.check(args) {
            Ok(()) => writeln!(out, "OK")?,
            Err(e) => {
                warn!(error = %e, "index failed validation");
                writeln!(out, "ERR: {e}")?;
            }
        },

        "EXIT" | "QUIT" => return Ok(CommandResult::Exit),

        // Blank line - nothing to do
        "" => {}

        // Everything else will be noted and returned as an error
        _ => {
            writeln!(out, "ERR: command '{cmd}' not handled")?;
            writeln!(out, "{PROPER_SYNTAX}")?;
        }
    }
    Ok(CommandResult::Continue)
}


/// Writes a single-line reply or the `ERR:` line for a failed command.
fn reply<W: Write, T: Display>(out: &mut W, result: Result<T>) -> io::Result<()> {
    match result {
        Ok(value) => writeln!(out, "{value}"),
        Err(e) => writeln!(out, "ERR: {e}"),
    }
}
