use crate::render::Format;
use clap::Parser;
use dumpdb_kv_store::lmdb::{EnvironmentFlags, DEFAULT_MAX_DBS};
use std::path::PathBuf;

/// Prints every record of a named database inside an LMDB environment, one
/// per line, in ascending key order. The environment is opened read-only and
/// read through a single snapshot.
#[derive(Debug, Clone, Parser)]
#[command(name = "dumpdb", version)]
pub struct Args {
    /// Path to an existing LMDB environment.
    pub path: PathBuf,

    /// Name of the database inside the environment to dump.
    pub db: String,

    /// Only dump records whose key starts with this prefix.
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Maximum number of named databases to declare when opening the
    /// environment.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DBS)]
    pub max_dbs: u32,

    /// Treat PATH as the data file itself instead of its directory.
    #[arg(long)]
    pub no_subdir: bool,

    /// Open the environment without its lock file, for read-only media.
    #[arg(long)]
    pub no_lock: bool,

    /// How to render keys and values.
    #[arg(long, value_enum, default_value_t = Format::Repr)]
    pub format: Format,

    /// Log more about what is happening on stderr. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// LMDB flags to apply on top of read-only mode.
    pub fn env_flags(&self) -> EnvironmentFlags {
        let mut flags = EnvironmentFlags::empty();
        if self.no_subdir {
            flags |= EnvironmentFlags::NO_SUB_DIR;
        }
        if self.no_lock {
            flags |= EnvironmentFlags::NO_LOCK;
        }
        flags
    }

    /// Key prefix as raw bytes.
    pub fn prefix_bytes(&self) -> Option<&[u8]> {
        self.prefix.as_deref().map(str::as_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn positional_arguments_only() {
        let args = Args::try_parse_from(["dumpdb", "/tmp/env", "users"]).unwrap();
        assert_eq!(args.path, PathBuf::from("/tmp/env"));
        assert_eq!(args.db, "users");
        assert_eq!(args.max_dbs, 200);
        assert_eq!(args.format, Format::Repr);
        assert_eq!(args.prefix_bytes(), None);
        assert_eq!(args.env_flags(), EnvironmentFlags::empty());
    }

    #[test]
    fn missing_database_argument_is_rejected() {
        let err = Args::try_parse_from(["dumpdb", "/tmp/env"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn options() {
        let args = Args::try_parse_from([
            "dumpdb",
            "--no-subdir",
            "--no-lock",
            "--max-dbs",
            "8",
            "--prefix",
            "user:",
            "--format",
            "hex",
            "-vv",
            "/tmp/data.mdb",
            "users",
        ])
        .unwrap();
        assert_eq!(args.max_dbs, 8);
        assert_eq!(args.prefix_bytes(), Some(&b"user:"[..]));
        assert_eq!(args.format, Format::Hex);
        assert_eq!(args.verbose, 2);
        assert_eq!(
            args.env_flags(),
            EnvironmentFlags::NO_SUB_DIR | EnvironmentFlags::NO_LOCK
        );
    }
}
