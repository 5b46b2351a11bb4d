//! The dump pipeline: open the environment, look up the database, take one
//! read-only snapshot and stream its records to the output in key order.

use crate::error::DumpError;
use crate::render::{self, Format};
use dumpdb_kv_store::iter::CursorIter;
use dumpdb_kv_store::lmdb::{self, EnvironmentConfig};
use dumpdb_kv_store::{Cursor, Environment as _, EnvironmentExt, Transaction as _};
use log::{debug, info};
use std::error::Error as StdError;
use std::io::Write;

/// What to dump and how to print it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions<'a> {
    /// Name of the database inside the environment.
    pub db_name: &'a str,

    /// When set, only records whose key starts with these bytes are dumped.
    pub prefix: Option<&'a [u8]>,

    pub format: Format,
}

/// Summary of a completed dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpStats {
    /// Number of records written.
    pub records: u64,
}

/// Dumps one database of the environment described by `config` to `out`.
///
/// Records are written as soon as the cursor produces them. If an error occurs
/// part way through, the records already written stay written and nothing
/// further is emitted. The snapshot and the environment are released on every
/// return path.
pub fn dump<W: Write>(
    config: &EnvironmentConfig<'_>,
    options: &DumpOptions<'_>,
    out: &mut W,
) -> Result<DumpStats, DumpError> {
    let path = config.open_path();
    let env: lmdb::Environment =
        EnvironmentExt::new(config).map_err(|source| DumpError::EnvironmentOpen {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("opened environment {}", path.display());

    let db = env.open_db(Some(options.db_name)).map_err(|err| match err {
        lmdb::Error::InvalidDbName => DumpError::Argument(err.to_string()),
        _ if err.is_not_found() => DumpError::SubDatabaseNotFound {
            name: options.db_name.to_owned(),
        },
        _ => DumpError::storage_read(err),
    })?;
    match env.db_config(&db) {
        Ok(flags) => debug!("opened database {:?} with flags {:?}", options.db_name, flags),
        Err(err) => debug!("opened database {:?}, flags unavailable: {}", options.db_name, err),
    }

    let txn = env.begin_ro_txn().map_err(DumpError::storage_read)?;
    debug!("snapshot started");
    let stats = {
        let mut cursor = txn.open_ro_cursor(&db).map_err(DumpError::storage_read)?;
        write_records(&mut cursor, options.prefix, options.format, out)?
    };
    txn.commit().map_err(DumpError::storage_read)?;

    info!(
        "dumped {} record(s) from database {:?} in {}",
        stats.records,
        options.db_name,
        path.display()
    );
    Ok(stats)
}

/// Walks `cursor` from the first key (or from `prefix`, when given) and writes
/// each record to `out` as one line.
pub fn write_records<'txn, C, W>(
    cursor: &mut C,
    prefix: Option<&[u8]>,
    format: Format,
    out: &mut W,
) -> Result<DumpStats, DumpError>
where
    C: Cursor<'txn>,
    C::Error: StdError + Send + Sync + 'static,
    W: Write,
{
    // Every key starts with the empty prefix, and LMDB rejects zero-length
    // seek keys.
    let prefix = prefix.filter(|prefix| !prefix.is_empty());
    let records = match prefix {
        Some(prefix) => {
            CursorIter::iter_from(cursor, prefix).map_err(DumpError::storage_read)?
        }
        None => CursorIter::iter_start(cursor),
    };

    let mut stats = DumpStats::default();
    for item in records {
        let (key, value) = item.map_err(DumpError::storage_read)?;
        // Keys sort bytewise, so the first key without the prefix ends the run.
        if prefix.map_or(false, |prefix| !key.starts_with(prefix)) {
            break;
        }
        render::write_record(out, format, key, value)?;
        stats.records += 1;
    }
    out.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dumpdb_kv_store::lmdb;
    use dumpdb_kv_store::{CursorBasic, Record};
    use std::fmt;
    use std::io;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    type Entries<'a> = &'a [(&'a [u8], &'a [u8])];

    fn make_env(dbs: &[(&str, Entries<'_>)]) -> TempDir {
        let temp_dir = tempdir().unwrap();
        let env = ::lmdb::Environment::new()
            .set_max_dbs(10)
            .open(temp_dir.path())
            .unwrap();
        for (name, entries) in dbs {
            let db = env
                .create_db(Some(*name), ::lmdb::DatabaseFlags::empty())
                .unwrap();
            let mut txn = env.begin_rw_txn().unwrap();
            for (key, value) in entries.iter() {
                txn.put(db, key, value, ::lmdb::WriteFlags::empty()).unwrap();
            }
            ::lmdb::Transaction::commit(txn).unwrap();
        }
        temp_dir
    }

    fn run(
        path: &Path,
        db_name: &str,
        prefix: Option<&[u8]>,
    ) -> (Result<DumpStats, DumpError>, String) {
        let config = EnvironmentConfig::read_only(
            path,
            lmdb::DEFAULT_MAX_DBS,
            lmdb::EnvironmentFlags::empty(),
        );
        let options = DumpOptions {
            db_name,
            prefix,
            format: Format::Repr,
        };
        let mut out = Vec::new();
        let result = dump(&config, &options, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn dumps_users_in_key_order() {
        let temp_dir = make_env(&[("users", &[(b"bob", b"2"), (b"alice", b"1")])]);
        let (result, out) = run(temp_dir.path(), "users", None);
        assert_eq!(result.unwrap(), DumpStats { records: 2 });
        assert_eq!(out, "(b'alice', b'1')\n(b'bob', b'2')\n");
    }

    #[test]
    fn empty_database_prints_nothing() {
        let temp_dir = make_env(&[("empty", &[])]);
        let (result, out) = run(temp_dir.path(), "empty", None);
        assert_eq!(result.unwrap(), DumpStats { records: 0 });
        assert!(out.is_empty());
    }

    #[test]
    fn missing_database() {
        let temp_dir = make_env(&[("users", &[(b"alice", b"1")])]);
        let (result, out) = run(temp_dir.path(), "missing", None);
        match result {
            Err(DumpError::SubDatabaseNotFound { name }) => assert_eq!(name, "missing"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn missing_environment() {
        let temp_dir = tempdir().unwrap();
        let (result, out) = run(&temp_dir.path().join("absent"), "users", None);
        match result {
            Err(err @ DumpError::EnvironmentOpen { .. }) => {
                assert!(err.to_string().contains("no LMDB environment found"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn nul_in_database_name_is_an_argument_error() {
        let temp_dir = make_env(&[("users", &[])]);
        let (result, _) = run(temp_dir.path(), "us\0ers", None);
        assert!(matches!(result, Err(DumpError::Argument(_))));
    }

    #[test]
    fn prefix_limits_records() {
        let temp_dir = make_env(&[(
            "keys",
            &[
                (b"user:1", b"a"),
                (b"group:1", b"g"),
                (b"user:2", b"b"),
                (b"userz", b"z"),
            ],
        )]);
        let (result, out) = run(temp_dir.path(), "keys", Some(&b"user:"[..]));
        assert_eq!(result.unwrap(), DumpStats { records: 2 });
        assert_eq!(out, "(b'user:1', b'a')\n(b'user:2', b'b')\n");

        let (result, out) = run(temp_dir.path(), "keys", Some(&b"zzz"[..]));
        assert_eq!(result.unwrap(), DumpStats { records: 0 });
        assert!(out.is_empty());
    }

    #[test]
    fn empty_prefix_dumps_everything() {
        let temp_dir = make_env(&[("users", &[(b"bob", b"2"), (b"alice", b"1")])]);
        let (result, out) = run(temp_dir.path(), "users", Some(&b""[..]));
        assert_eq!(result.unwrap(), DumpStats { records: 2 });
        assert_eq!(out, "(b'alice', b'1')\n(b'bob', b'2')\n");
    }

    #[derive(Debug)]
    struct DiskGone;

    impl fmt::Display for DiskGone {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("disk gone")
        }
    }

    impl StdError for DiskGone {}

    /// Cursor that yields its entries in order, then fails instead of reporting
    /// the end of the database.
    struct FailingCursor<'txn> {
        entries: Vec<Record<'txn>>,
        next: usize,
    }

    impl<'txn> CursorBasic for FailingCursor<'txn> {
        type Error = DiskGone;
    }

    impl<'txn> Cursor<'txn> for FailingCursor<'txn> {
        fn get(&self) -> Result<Option<Record<'txn>>, DiskGone> {
            Ok(self.next.checked_sub(1).and_then(|i| self.entries.get(i).copied()))
        }

        fn move_to_first(&mut self) -> Result<Option<Record<'txn>>, DiskGone> {
            self.next = 0;
            self.move_to_next()
        }

        fn move_to_next(&mut self) -> Result<Option<Record<'txn>>, DiskGone> {
            let entry = self.entries.get(self.next).copied().ok_or(DiskGone)?;
            self.next += 1;
            Ok(Some(entry))
        }

        fn move_to_key_or_after(
            &mut self,
            _key: &[u8],
        ) -> Result<Option<Record<'txn>>, DiskGone> {
            Err(DiskGone)
        }
    }

    /// Output that accepts `capacity` lines, then reports a closed pipe.
    struct ClosedPipe {
        written: Vec<u8>,
        capacity: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let lines = self.written.iter().filter(|&&b| b == b'\n').count();
            if lines >= self.capacity {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn read_failure_keeps_already_written_records() {
        let mut cursor = FailingCursor {
            entries: vec![(&b"a"[..], &b"1"[..]), (&b"b"[..], &b"2"[..])],
            next: 0,
        };
        let mut out = Vec::new();
        let err = write_records(&mut cursor, None, Format::Repr, &mut out).unwrap_err();
        assert!(matches!(err, DumpError::StorageRead(_)));
        assert_eq!(err.to_string(), "failed reading from the store: disk gone");
        assert_eq!(out, b"(b'a', b'1')\n(b'b', b'2')\n".to_vec());
    }

    #[test]
    fn seek_failure_writes_nothing() {
        let mut cursor = FailingCursor {
            entries: vec![(&b"a"[..], &b"1"[..])],
            next: 0,
        };
        let mut out = Vec::new();
        let err =
            write_records(&mut cursor, Some(&b"a"[..]), Format::Hex, &mut out).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_STORAGE_READ);
        assert!(out.is_empty());
    }

    #[test]
    fn write_failure_stops_the_dump() {
        let mut cursor = FailingCursor {
            entries: vec![
                (&b"a"[..], &b"1"[..]),
                (&b"b"[..], &b"2"[..]),
                (&b"c"[..], &b"3"[..]),
            ],
            next: 0,
        };
        let mut out = ClosedPipe {
            written: Vec::new(),
            capacity: 1,
        };
        let err = write_records(&mut cursor, None, Format::Repr, &mut out).unwrap_err();
        match &err {
            DumpError::Output(io_err) => assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.exit_code(), crate::error::EXIT_OUTPUT);
        assert_eq!(out.written, b"(b'a', b'1')\n".to_vec());
        // The cursor was not advanced past the record that failed to print.
        assert_eq!(cursor.next, 2);
    }
}
