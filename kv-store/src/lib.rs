//! This module provides a read-only, transactional key-value storage API with
//! semantics that are largely modeled after [LMDB][lmdb].
//!
//! The API only covers what is needed to inspect an existing store: opening an
//! environment, looking up a named database, starting a read-only transaction,
//! and walking the database's entries with a cursor. Keys and values are always
//! raw byte strings; no interpretation of their contents is ever attempted.
//!
//! An implementation wrapping LMDB is provided behind the `lmdb_impl` Cargo
//! feature, which is disabled by default.
//!
//! [lmdb]: http://symas.com/mdb/

pub mod iter;
#[cfg(feature = "lmdb_impl")]
pub mod lmdb;

/// A single database entry as returned by cursor operations. Both halves borrow
/// from the transaction that produced them.
pub type Record<'txn> = (&'txn [u8], &'txn [u8]);

/// Supertrait for [`Environment`][Environment] containing functionality that is
/// independent of any lifetime or type parameters.
///
/// [Environment]: self::Environment
pub trait EnvironmentBasic {
    /// Error that may occur when operating on the storage environment.
    type Error;

    /// Handle that the environment provides for referencing a database after it
    /// has been opened.
    type Database;
}

/// Trait for storage environment handles. A storage environment is essentially
/// a type of session that can interact with a set of databases. Each database
/// contains a key-value store.
///
/// # Transaction semantics
/// Transactions are tied to a specific environment, but not to a specific
/// database within that environment. The environment must give each
/// transaction a consistent view of its entire collection of databases, fixed
/// at the moment the transaction starts.
///
/// Read-only transactions must never be blocked by other transactions, and must
/// never block other transactions.
///
/// # Parameters
/// - `'env`: Lifetime for environment references.
pub trait Environment<'env>: EnvironmentBasic {
    /// Read-only transaction type that can be opened from the environment.
    type RoTransaction: 'env
        + TransactionBasic<Error = Self::Error, Database = Self::Database>
        + for<'txn> Transaction<'txn>;

    /// Starts a new read-only transaction in the environment.
    fn begin_ro_txn(&'env self) -> Result<Self::RoTransaction, Self::Error>
    where
        Self: 'env;
}

/// Subtrait of [`Environment`][Environment] that provides initialization and
/// database lookup. The main reason for keeping this trait separate from
/// [`Environment`][Environment] is to keep the configuration types out of
/// signatures that only need to start transactions.
///
/// # Parameters
/// - `'env`: Lifetime for environment references.
/// - `EC`: Configuration data that can be provided to initialize an
///   environment.
/// - `DI`: Unique ID associated with each database in the environment.
///
/// [Environment]: self::Environment
pub trait EnvironmentExt<'env, EC, DI>: Sized + Environment<'env> {
    /// Configuration information that can be obtained for an individual
    /// database.
    type ReturnedDbConfig;

    /// Initializes an environment. To close the environment, simply drop the
    /// returned environment object.
    fn new(config: EC) -> Result<Self, Self::Error>
    where
        Self: 'env;

    /// Opens a database with the specified database ID. Always fails if the
    /// database does not already exist; databases are never created.
    ///
    /// The returned database handle can be used by multiple transactions
    /// concurrently. It is recommended to get handles to all required databases
    /// before starting any transactions.
    fn open_db(&'env self, id: DI) -> Result<Self::Database, Self::Error>
    where
        Self: 'env;

    /// Gets the configuration of the specified open database.
    fn db_config(&'env self, db: &Self::Database) -> Result<Self::ReturnedDbConfig, Self::Error>
    where
        Self: 'env;
}

/// Supertrait for [`Transaction`][Transaction] containing functionality that is
/// independent of any lifetime or type parameters.
///
/// [Transaction]: self::Transaction
pub trait TransactionBasic {
    /// Error that may occur when operating on the transaction.
    type Error;

    /// Handle to an open database.
    type Database;
}

/// Trait for read-only transaction handles.
///
/// Implementations must ensure that any active transaction has no more than one
/// handle in existence at a time. Usually this means that `Transaction` types
/// should not implement [`Clone`][Clone].
///
/// A transaction is finalized by committing it. If a transaction is not
/// committed, implementations must automatically abort it when the transaction
/// handle is dropped. For a read-only transaction both outcomes simply release
/// the snapshot.
///
/// # Parameters
/// - `'txn`: Lifetime for transaction references.
///
/// [Clone]: std::clone::Clone
pub trait Transaction<'txn>: Sized + TransactionBasic {
    /// Read-only cursor that can be opened within the transaction.
    type RoCursor: 'txn + CursorBasic<Error = Self::Error> + Cursor<'txn>;

    /// Finalizes the transaction and releases its snapshot.
    fn commit(self) -> Result<(), Self::Error>
    where
        Self: 'txn;

    /// Opens a new read-only cursor inside the transaction. The cursor can only
    /// operate on the specified database.
    fn open_ro_cursor(&'txn self, db: &Self::Database) -> Result<Self::RoCursor, Self::Error>
    where
        Self: 'txn;
}

/// Supertrait for [`Cursor`][Cursor] containing functionality that is
/// independent of any lifetime or type parameters.
///
/// [Cursor]: self::Cursor
pub trait CursorBasic {
    /// Error that may occur when operating on the cursor.
    type Error;
}

/// Trait for database cursor handles. Unlike transactions, each cursor is tied
/// to a specific database within an environment and can only operate on that
/// database.
///
/// Each cursor is initially in an unpositioned state, but may later be
/// positioned at a specific key, which we call the cursor's *position key*.
///
/// The cursor API assumes that entries in the database are sorted by key using
/// an unambiguous, stable key ordering. For LMDB databases with default flags
/// this is byte-lexicographic order, the same as [`Ord`][Ord] on `[u8]`.
///
/// Returned data borrows from the transaction rather than the cursor. This is
/// sound because a read-only transaction never mutates the data it exposes, so
/// every returned slice stays valid until the transaction ends.
///
/// # Parameters
/// - `'txn`: Lifetime of the transaction the cursor was opened in.
///
/// [Ord]: std::cmp::Ord
pub trait Cursor<'txn>: CursorBasic {
    /// Retrieves the key-value pair at the cursor's current position. The
    /// cursor's position does not change.
    ///
    /// Implementations may either return an error or
    /// [`Ok`][Ok]`(`[`None`][None]`)` if the cursor is unpositioned, so callers
    /// should only use this after a successful positioning operation.
    ///
    /// [Ok]: std::result::Result::Ok
    /// [None]: std::option::Option::None
    fn get(&self) -> Result<Option<Record<'txn>>, Self::Error>;

    /// Repositions the cursor to the first key in the database, and retrieves
    /// the corresponding key-value pair.
    ///
    /// If the database is empty but no other error occurs, the cursor's
    /// position state is left unchanged, and [`Ok`][Ok]`(`[`None`][None]`)` is
    /// returned.
    ///
    /// [Ok]: std::result::Result::Ok
    /// [None]: std::option::Option::None
    fn move_to_first(&mut self) -> Result<Option<Record<'txn>>, Self::Error>;

    /// Repositions the cursor to the next key in the database, and retrieves
    /// the corresponding key-value pair. If the cursor is unpositioned, this
    /// behaves like [`move_to_first`][move_to_first].
    ///
    /// Returns [`Ok`][Ok]`(`[`None`][None]`)` once the cursor has moved past
    /// the last key (assuming no error occurs).
    ///
    /// [move_to_first]: self::Cursor::move_to_first
    /// [Ok]: std::result::Result::Ok
    /// [None]: std::option::Option::None
    fn move_to_next(&mut self) -> Result<Option<Record<'txn>>, Self::Error>;

    /// Repositions the cursor to the first key in the database that is greater
    /// than or equal to the specified key, and retrieves the corresponding
    /// key-value pair.
    ///
    /// If there is no such key but no other error occurs, the cursor's position
    /// state is left unchanged, and [`Ok`][Ok]`(`[`None`][None]`)` is returned.
    ///
    /// [Ok]: std::result::Result::Ok
    /// [None]: std::option::Option::None
    fn move_to_key_or_after(&mut self, key: &[u8]) -> Result<Option<Record<'txn>>, Self::Error>;
}
