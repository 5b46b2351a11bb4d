//! Error taxonomy for a dump run. Every variant is terminal: nothing is retried,
//! and `main` turns the error into a diagnostic plus a per-kind exit code.

use dumpdb_kv_store::lmdb;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit code for usage errors. Matches the code clap uses for its own parse
/// failures.
pub const EXIT_ARGUMENT: i32 = 2;
pub const EXIT_ENVIRONMENT_OPEN: i32 = 3;
pub const EXIT_SUB_DATABASE_NOT_FOUND: i32 = 4;
pub const EXIT_STORAGE_READ: i32 = 5;
pub const EXIT_OUTPUT: i32 = 6;

/// Error produced while dumping a database.
#[derive(Debug)]
pub enum DumpError {
    /// The command line was unusable. Raised before the environment is touched.
    Argument(String),

    /// The environment at `path` could not be opened.
    EnvironmentOpen { path: PathBuf, source: lmdb::Error },

    /// The environment has no database with the requested name.
    SubDatabaseNotFound { name: String },

    /// Reading from the store failed after the environment was opened.
    StorageRead(Box<dyn StdError + Send + Sync>),

    /// Writing a record to the output failed.
    Output(io::Error),
}

impl DumpError {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DumpError::Argument(_) => EXIT_ARGUMENT,
            DumpError::EnvironmentOpen { .. } => EXIT_ENVIRONMENT_OPEN,
            DumpError::SubDatabaseNotFound { .. } => EXIT_SUB_DATABASE_NOT_FOUND,
            DumpError::StorageRead(_) => EXIT_STORAGE_READ,
            DumpError::Output(_) => EXIT_OUTPUT,
        }
    }

    pub(crate) fn storage_read<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DumpError::StorageRead(Box::new(err))
    }
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpError::Argument(msg) => write!(f, "invalid arguments: {}", msg),
            DumpError::EnvironmentOpen { path, source } if source.is_missing_file() => write!(
                f,
                "cannot open environment {}: no LMDB environment found at this path",
                path.display()
            ),
            DumpError::EnvironmentOpen { path, source } => {
                write!(f, "cannot open environment {}: {}", path.display(), source)
            }
            DumpError::SubDatabaseNotFound { name } => {
                write!(f, "database {:?} does not exist in the environment", name)
            }
            DumpError::StorageRead(err) => write!(f, "failed reading from the store: {}", err),
            DumpError::Output(err) => write!(f, "failed writing output: {}", err),
        }
    }
}

impl StdError for DumpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DumpError::Argument(_) | DumpError::SubDatabaseNotFound { .. } => None,
            DumpError::EnvironmentOpen { source, .. } => Some(source),
            DumpError::StorageRead(err) => Some(err.as_ref()),
            DumpError::Output(err) => Some(err),
        }
    }
}

impl From<io::Error> for DumpError {
    fn from(src: io::Error) -> Self {
        DumpError::Output(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_has_a_distinct_nonzero_exit_code() {
        let errors = vec![
            DumpError::Argument("x".to_owned()),
            DumpError::EnvironmentOpen {
                path: PathBuf::from("/nope"),
                source: lmdb::Error::InvalidDbName,
            },
            DumpError::SubDatabaseNotFound {
                name: "users".to_owned(),
            },
            DumpError::storage_read(lmdb::Error::InvalidDbName),
            DumpError::Output(io::Error::new(io::ErrorKind::BrokenPipe, "closed")),
        ];
        let mut codes: Vec<i32> = errors.iter().map(DumpError::exit_code).collect();
        assert!(codes.iter().all(|&code| code != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn missing_database_message_names_it() {
        let err = DumpError::SubDatabaseNotFound {
            name: "missing".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "database \"missing\" does not exist in the environment"
        );
    }
}
