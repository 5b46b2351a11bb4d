//! This module provides an iterator type that can wrap a [`Cursor`][Cursor],
//! allowing for iteration over the entries in a database's key-value store.
//!
//! [Cursor]: crate::Cursor

use crate::{Cursor, Record};
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// State held by the iterator in addition to the cursor's internal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum IterState {
    /// In this state, the iterator's next operation should be to move the
    /// cursor to the first key in the database.
    MoveToFirst,

    /// In this state, the iterator's next operation should be to move the
    /// cursor to the next key in the database.
    MoveToNext,

    /// In this state, the iterator's next operation should be to read the entry
    /// from the cursor's current position.
    GetCurrent,

    /// In this state, the iterator has terminated and should not produce any
    /// more items. This can be due to normal termination or an error.
    Finished,
}

/// Iterator type that wraps a database cursor. Iteration is forward-only and
/// cannot be restarted; once the end of the database is reached or an error
/// is yielded, the iterator produces nothing further.
///
/// # Parameters
/// - `'cursor`: Lifetime for the wrapped cursor reference.
/// - `'txn`: Lifetime of the transaction that owns the returned data.
/// - `C`: Cursor type to wrap.
#[derive(Debug)]
pub struct CursorIter<'cursor, 'txn, C> {
    /// The wrapped cursor.
    cursor: &'cursor mut C,

    /// Extra state information for the iterator.
    state: IterState,

    phantom: PhantomData<Record<'txn>>,
}

impl<'cursor, 'txn, C> CursorIter<'cursor, 'txn, C>
where
    C: Cursor<'txn>,
{
    /// Wraps the specified cursor in an iterator that starts at the first key
    /// in the database regardless of the cursor's current position. The
    /// iteration will be empty if the database is empty (assuming no error
    /// occurs).
    pub fn iter_start(cursor: &'cursor mut C) -> Self {
        Self {
            cursor,
            state: IterState::MoveToFirst,
            phantom: PhantomData,
        }
    }

    /// Similar to [`iter_start`][iter_start], except iteration starts at the
    /// specified key regardless of the cursor's current position. More
    /// specifically, iteration will start with the first key in the database
    /// that is greater than *or* equal to the specified key. The iteration will
    /// be empty if there is no such key (assuming no error occurs).
    ///
    /// [iter_start]: self::CursorIter::iter_start
    pub fn iter_from(cursor: &'cursor mut C, key: &[u8]) -> Result<Self, C::Error> {
        let state = if cursor.move_to_key_or_after(key)?.is_some() {
            IterState::GetCurrent
        } else {
            IterState::Finished
        };
        Ok(Self {
            cursor,
            state,
            phantom: PhantomData,
        })
    }
}

impl<'cursor, 'txn, C> Iterator for CursorIter<'cursor, 'txn, C>
where
    C: Cursor<'txn>,
{
    type Item = Result<Record<'txn>, C::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor_result = match self.state {
            IterState::MoveToFirst => self.cursor.move_to_first(),
            IterState::MoveToNext => self.cursor.move_to_next(),
            IterState::GetCurrent => self.cursor.get(),
            IterState::Finished => return None,
        };
        match cursor_result {
            Ok(Some(item)) => {
                self.state = IterState::MoveToNext;
                Some(Ok(item))
            }
            Ok(None) => {
                self.state = IterState::Finished;
                None
            }
            Err(err) => {
                self.state = IterState::Finished;
                Some(Err(err))
            }
        }
    }
}

impl<'cursor, 'txn, C> FusedIterator for CursorIter<'cursor, 'txn, C> where C: Cursor<'txn> {}
