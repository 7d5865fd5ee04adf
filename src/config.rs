// =====================================================================
// File: config.rs
// Author: Bob Jack
// Date: Oct. 8, 2025
//
// Description:
//   Runtime settings for the index binary. Right now the only knob is
//   the B-tree minimum degree. It is resolved in this order, later
//   sources winning:
//
//     1. `DEFAULT_MIN_DEGREE`
//     2. the `BTREE_MIN_DEGREE` environment variable
//     3. `--degree <n>`, `--degree=<n>` or `-t <n>` on the command line
// =====================================================================

use crate::error::{Error, Result};

/// Degree used when nothing else is configured.
pub const DEFAULT_MIN_DEGREE: usize = 3;

/// Environment variable holding the minimum degree.
pub const DEGREE_ENV: &str = "BTREE_MIN_DEGREE";


/// Settings for a [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// B-tree minimum degree `t`, always >= 2 once loaded.
    pub min_degree: usize,
}


impl Default for Config {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
        }
    }
}


impl Config {
    /// Load from the process environment and command line.
    pub fn load() -> Result<Self> {
        Self::from_sources(std::env::args().skip(1), std::env::var(DEGREE_ENV).ok())
    }


    /// Resolve settings from explicit sources.
    ///
    /// `args` are the command-line arguments without the program name,
    /// `env_degree` is the raw value of [`DEGREE_ENV`], if set.
    ///
    /// # Errors
    /// [`Error::InvalidConfiguration`] for unknown flags, a missing flag
    /// value, or a degree that is not a number >= 2.
    ///
    /// # Example
    /// ```
    /// use btree_index::Config;
    ///
    /// let args = vec!["--degree".to_string(), "4".to_string()];
    /// let config = Config::from_sources(args, Some("2".to_string())).unwrap();
    /// assert_eq!(config.min_degree, 4);
    /// ```
    pub fn from_sources<I>(args: I, env_degree: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();

        if let Some(raw) = env_degree {
            config.min_degree = parse_degree(&raw, DEGREE_ENV)?;
        }

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if let Some(raw) = arg.strip_prefix("--degree=") {
                config.min_degree = parse_degree(raw, "--degree")?;
                continue;
            }
            match arg.as_str() {
                "--degree" | "-t" => {
                    let Some(raw) = args.next() else {
                        return Err(invalid(format!("{arg} requires a value")));
                    };
                    config.min_degree = parse_degree(&raw, &arg)?;
                }
                _ => return Err(invalid(format!("unrecognized argument '{arg}'"))),
            }
        }

        Ok(config)
    }
}


fn parse_degree(raw: &str, source: &str) -> Result<usize> {
    let degree: usize = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("{source}: '{raw}' is not a valid degree")))?;
    if degree < 2 {
        return Err(invalid(format!("{source}: minimum degree must be >= 2, got {degree}")));
    }
    Ok(degree)
}


fn invalid(reason: String) -> Error {
    Error::InvalidConfiguration { reason }
}
