// =====================================================================
// File: session.rs
// Author: Bob Jack
// Date: Sept 20, 2025 - Reworked for the word index, Oct. 8, 2025
//
// Description:
// Defines the `Session` struct, which represents a running index
// context: one `BTreeIndex<String, String>` built from a `Config`.
//
// Responsibilities:
// - Own the live B-tree for one REPL run.
// - Turn parsed command arguments into index calls.
// - Reject missing or extra arguments with `Error::InvalidArgument`
//   before the index is touched.
// =====================================================================

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::BTreeIndex;

/// Represents a single in-memory index session.
#[derive(Debug)]
pub struct Session {
    /// The B-tree holding every key–value pair of this session.
    pub index: BTreeIndex<String, String>,
}


impl Session {
    /// Creates a new, empty session with the configured degree.
    ///
    /// # Example
    /// ```
    /// use btree_index::{Config, Session};
    /// let session = Session::new(&Config::default()).unwrap();
    /// assert!(session.index.is_empty());
    /// ```
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            index: BTreeIndex::new(config.min_degree)?,
        })
    }


    /// `SET <key> <value...>` - `OK` when stored, `EXISTS` when the key
    /// was already present (values are never overwritten).
    pub fn set(&mut self, args: &[String]) -> Result<&'static str> {
        let Some((key, value)) = args.split_first().filter(|(_, rest)| !rest.is_empty()) else {
            return Err(Error::InvalidArgument("SET requires a key and a value".into()));
        };
        let value = value.join(" ");

        if self.index.insert(key.clone(), value) {
            debug!(key = %key, "stored");
            Ok("OK")
        } else {
            Ok("EXISTS")
        }
    }


    /// `GET <key>` - the value, or `NULL`.
    pub fn get(&self, args: &[String]) -> Result<String> {
        let key = single_key("GET", args)?;
        Ok(self
            .index
            .search(key)
            .cloned()
            .unwrap_or_else(|| "NULL".to_string()))
    }


    /// `DEL <key>` - `1` if removed, `0` if not found.
    pub fn del(&mut self, args: &[String]) -> Result<&'static str> {
        let key = single_key("DEL", args)?;
        if self.index.delete(key) {
            debug!(key, "deleted");
            Ok("1")
        } else {
            Ok("0")
        }
    }


    /// `EXISTS <key>` - `1` if present, else `0`.
    pub fn exists(&self, args: &[String]) -> Result<&'static str> {
        let key = single_key("EXISTS", args)?;
        Ok(if self.index.contains_key(key) { "1" } else { "0" })
    }


    /// `MGET <k1> [<k2> ...]` - one line per key, the value or `nil`.
    pub fn mget(&self, args: &[String]) -> Result<Vec<String>> {
        if args.is_empty() {
            return Err(Error::InvalidArgument("MGET requires at least one key".into()));
        }
        Ok(args
            .iter()
            .map(|key| {
                self.index
                    .search(key.as_str())
                    .cloned()
                    .unwrap_or_else(|| "nil".to_string())
            })
            .collect())
    }


    /// `KEYS` - every key in ascending order.
    pub fn keys(&self, args: &[String]) -> Result<Vec<String>> {
        no_args("KEYS", args)?;
        Ok(self.index.keys())
    }


    /// `LEN` - number of stored entries.
    pub fn len(&self, args: &[String]) -> Result<usize> {
        no_args("LEN", args)?;
        Ok(self.index.len())
    }


    /// `HEIGHT` - number of levels in the tree.
    pub fn height(&self, args: &[String]) -> Result<usize> {
        no_args("HEIGHT", args)?;
        Ok(self.index.height())
    }


    /// `CHECK` - validate every structural invariant of the tree.
    pub fn check(&self, args: &[String]) -> Result<()> {
        no_args("CHECK", args)?;
        self.index.validate()
    }
}


/// Exactly one argument, the key.
fn single_key<'a>(cmd: &str, args: &'a [String]) -> Result<&'a str> {
    match args {
        [key] => Ok(key.as_str()),
        [] => Err(Error::InvalidArgument(format!("{cmd} requires a key"))),
        _ => Err(Error::InvalidArgument(format!("too many arguments for {cmd}"))),
    }
}


fn no_args(cmd: &str, args: &[String]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("{cmd} does not take any arguments")))
    }
}
