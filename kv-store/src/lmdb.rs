//! This module provides the LMDB-based implementation of this crate's generic
//! storage API. Since the generic API is largely based on LMDB in the first
//! place, this implementation should be a thin, inexpensive wrapper.
//!
//! Environments are always opened read-only, so nothing in this module can
//! modify an environment's data file.

use crate::Record;
use lmdb::{Cursor, Transaction};
use std::fmt;
use std::path::Path;

pub use lmdb::EnvironmentFlags;

/// Maximum number of named databases declared when opening an environment,
/// unless configured otherwise.
pub const DEFAULT_MAX_DBS: u32 = 200;

/// Error type for the LMDB wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Error originating in the wrapped LMDB library.
    LmdbError(lmdb::Error),

    /// Indicates that a database name contains a NUL byte, which cannot be
    /// passed through LMDB's C API.
    InvalidDbName,
}

impl Error {
    /// Checks if this error means that the requested item does not exist. For
    /// [`open_db`][open_db], this means the named database is missing.
    ///
    /// [open_db]: crate::EnvironmentExt::open_db
    pub fn is_not_found(&self) -> bool {
        *self == Error::LmdbError(lmdb::Error::NotFound)
    }

    /// Checks if this error is the operating system's "no such file or
    /// directory" error, which LMDB reports when an environment path is
    /// missing.
    pub fn is_missing_file(&self) -> bool {
        *self == Error::LmdbError(lmdb::Error::Other(libc::ENOENT))
    }
}

impl From<lmdb::Error> for Error {
    fn from(src: lmdb::Error) -> Self {
        Error::LmdbError(src)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LmdbError(err) => fmt::Display::fmt(err, f),
            Error::InvalidDbName => f.write_str("database name contains a NUL byte"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::LmdbError(err) => Some(err),
            Error::InvalidDbName => None,
        }
    }
}

/// Configuration data needed to initialize the storage environment.
///
/// # Parameters
/// - `'path`: Lifetime of the held [`Path`][Path] reference that determines
///   where the data is stored on disk.
///
/// [Path]: std::path::Path
#[derive(Debug)]
pub struct EnvironmentConfig<'path> {
    // See constructor for documentation of these fields.
    env_builder: lmdb::EnvironmentBuilder,
    open_path: &'path Path,
}

impl<'path> EnvironmentConfig<'path> {
    /// Constructor.
    ///
    /// # Parameters
    /// - `open_path`: Path where the data is stored on disk. This is a
    ///   directory, unless `extra_flags` contains
    ///   [`NO_SUB_DIR`][lmdb::EnvironmentFlags::NO_SUB_DIR], in which case it
    ///   names the data file itself.
    /// - `max_dbs`: Maximum number of named databases the environment is
    ///   declared to hold. Must be at least as large as the value the
    ///   environment's writers use, or lookups of some databases may fail.
    /// - `extra_flags`: LMDB environment flags to apply on top of
    ///   [`READ_ONLY`][lmdb::EnvironmentFlags::READ_ONLY], which is always set.
    ///
    /// [lmdb::EnvironmentFlags::NO_SUB_DIR]: lmdb::EnvironmentFlags::NO_SUB_DIR
    /// [lmdb::EnvironmentFlags::READ_ONLY]: lmdb::EnvironmentFlags::READ_ONLY
    pub fn read_only(
        open_path: &'path Path,
        max_dbs: u32,
        extra_flags: lmdb::EnvironmentFlags,
    ) -> Self {
        let mut env_builder = lmdb::Environment::new();
        env_builder
            .set_flags(lmdb::EnvironmentFlags::READ_ONLY | extra_flags)
            .set_max_dbs(max_dbs);
        Self {
            env_builder,
            open_path,
        }
    }

    /// Path where the environment is stored on disk.
    pub fn open_path(&self) -> &'path Path {
        self.open_path
    }

    /// Opens an LMDB environment with the specified configuration.
    fn open(&self) -> Result<lmdb::Environment, Error> {
        self.env_builder.open(self.open_path).map_err(Into::into)
    }
}

/// Configuration data for an individual database within an environment.
pub type DbConfig = lmdb::DatabaseFlags;

/// Database handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Database(lmdb::Database);

/// Main storage environment type for the LMDB wrapper. Dropping it closes the
/// environment.
#[derive(Debug)]
pub struct Environment(lmdb::Environment);

impl crate::EnvironmentBasic for Environment {
    type Error = Error;
    type Database = Database;
}

impl<'env> crate::Environment<'env> for Environment {
    type RoTransaction = RoTransaction<'env>;

    fn begin_ro_txn(&'env self) -> Result<Self::RoTransaction, Self::Error>
    where
        Self: 'env,
    {
        Ok(RoTransaction(self.0.begin_ro_txn()?))
    }
}

impl<'cfg, 'path, 'env, 'dbid>
    crate::EnvironmentExt<'env, &'cfg EnvironmentConfig<'path>, Option<&'dbid str>> for Environment
{
    type ReturnedDbConfig = DbConfig;

    fn new(config: &'cfg EnvironmentConfig<'path>) -> Result<Self, Self::Error>
    where
        Self: 'env,
    {
        Ok(Self(config.open()?))
    }

    fn open_db(&'env self, id: Option<&'dbid str>) -> Result<Self::Database, Self::Error>
    where
        Self: 'env,
    {
        // LMDB converts the name to a C string, which cannot hold NUL.
        if id.map_or(false, |name| name.contains('\0')) {
            return Err(Error::InvalidDbName);
        }
        Ok(Database(self.0.open_db(id)?))
    }

    fn db_config(&'env self, db: &Self::Database) -> Result<Self::ReturnedDbConfig, Self::Error>
    where
        Self: 'env,
    {
        self.0.get_db_flags(db.0).map_err(Into::into)
    }
}

/// Read-only transaction type for the LMDB wrapper.
#[derive(Debug)]
pub struct RoTransaction<'env>(lmdb::RoTransaction<'env>);

impl<'env> crate::TransactionBasic for RoTransaction<'env> {
    type Error = Error;
    type Database = Database;
}

impl<'env, 'txn> crate::Transaction<'txn> for RoTransaction<'env> {
    type RoCursor = RoCursor<'txn>;

    fn commit(self) -> Result<(), Self::Error>
    where
        Self: 'txn,
    {
        self.0.commit().map_err(Into::into)
    }

    fn open_ro_cursor(&'txn self, db: &Self::Database) -> Result<Self::RoCursor, Self::Error>
    where
        Self: 'txn,
    {
        Ok(RoCursor(self.0.open_ro_cursor(db.0)?))
    }
}

/// Helper function that performs commonly needed processing on the result of an
/// LMDB cursor read operation. If the cursor read failed with
/// [`lmdb::Error::NotFound`][lmdb::Error::NotFound], the error is replaced with
/// [`Ok`][Ok]`(`[`None`][None]`)`. If a different error occurred, the error is
/// preserved. If the cursor read succeeded, the key-value pair is returned
/// inside [`Ok`][Ok]`(`[`Some`][Some]`)`.
///
/// [lmdb::Error::NotFound]: lmdb::Error::NotFound
/// [Ok]: std::result::Result::Ok
/// [None]: std::option::Option::None
/// [Some]: std::option::Option::Some
fn lmdb_cursor_result_to_record<'txn>(
    lmdb_result: Result<(Option<&'txn [u8]>, &'txn [u8]), lmdb::Error>,
) -> Result<Option<Record<'txn>>, Error> {
    match lmdb_result {
        // Positioning operations always report the key.
        Ok((key, value)) => Ok(Some((key.unwrap_or(&[]), value))),
        Err(lmdb::Error::NotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Read-only cursor type for the LMDB wrapper.
#[derive(Debug)]
pub struct RoCursor<'txn>(lmdb::RoCursor<'txn>);

impl<'txn> crate::CursorBasic for RoCursor<'txn> {
    type Error = Error;
}

impl<'txn> crate::Cursor<'txn> for RoCursor<'txn> {
    fn get(&self) -> Result<Option<Record<'txn>>, Self::Error> {
        lmdb_cursor_result_to_record(self.0.get(None, None, lmdb_sys::MDB_GET_CURRENT))
    }

    fn move_to_first(&mut self) -> Result<Option<Record<'txn>>, Self::Error> {
        lmdb_cursor_result_to_record(self.0.get(None, None, lmdb_sys::MDB_FIRST))
    }

    fn move_to_next(&mut self) -> Result<Option<Record<'txn>>, Self::Error> {
        lmdb_cursor_result_to_record(self.0.get(None, None, lmdb_sys::MDB_NEXT))
    }

    fn move_to_key_or_after(&mut self, key: &[u8]) -> Result<Option<Record<'txn>>, Self::Error> {
        lmdb_cursor_result_to_record(self.0.get(Some(key), None, lmdb_sys::MDB_SET_RANGE))
    }
}
