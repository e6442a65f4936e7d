//! SQLite-backed append-only operation journal.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};
use tracing::debug;

use crate::{
    core::log::OperationLog,
    op::Operation,
    types::OpIndex,
    wire::WireError,
};

use super::{LogSink, OpEnvelope, PersistError, PersistResult};

/// SQLite implementation of [`crate::persist::LogSink`].
pub struct SqliteJournal {
    conn: Connection,
}

impl SqliteJournal {
    /// Opens or creates a journal at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory journal.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Rebuilds the log journaled under `doc`, holding at most `capacity` operations.
    pub fn load_log(&self, doc: &str, capacity: usize) -> PersistResult<OperationLog> {
        let mut stmt = self
            .conn
            .prepare("SELECT idx, payload FROM operations WHERE doc = ?1 ORDER BY idx ASC")?;
        let rows = stmt.query_map(params![doc], |row| {
            let idx: i64 = row.get(0)?;
            let payload: Vec<u8> = row.get(1)?;
            Ok((idx, payload))
        })?;

        let mut log = OperationLog::with_capacity(capacity);
        for (expected, row) in rows.enumerate() {
            let (idx, payload) = row?;
            if idx != expected as i64 {
                return Err(PersistError::Message(format!(
                    "journal for {doc} has a gap: expected index {expected}, found {idx}"
                )));
            }
            let op = serde_json::from_slice::<OpEnvelope>(&payload)?.into_operation()?;
            log.append(op).map_err(WireError::from)?;
        }
        debug!(doc, ops = log.len(), "loaded journaled log");
        Ok(log)
    }

    /// Number of operations journaled under `doc`; the next expected index.
    pub fn next_index(&self, doc: &str) -> PersistResult<OpIndex> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(idx) FROM operations WHERE doc = ?1",
            params![doc],
            |row| row.get(0),
        )?;
        Ok(max.map(|v| v as OpIndex + 1).unwrap_or(0))
    }

    /// Index of the newest operation journaled under `doc`, if any.
    pub fn latest_index(&self, doc: &str) -> PersistResult<Option<OpIndex>> {
        Ok(self.next_index(doc)?.checked_sub(1))
    }

    /// Every document key with at least one journaled operation, sorted.
    pub fn documents(&self) -> PersistResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT doc FROM operations ORDER BY doc ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Deletes everything journaled under `doc`, returning the row count.
    pub fn clear(&mut self, doc: &str) -> PersistResult<usize> {
        let count = self
            .conn
            .execute("DELETE FROM operations WHERE doc = ?1", params![doc])?;
        Ok(count)
    }
}

impl LogSink for SqliteJournal {
    fn append_ops(&mut self, doc: &str, start: OpIndex, ops: &[Operation]) -> PersistResult<OpIndex> {
        let next = self.next_index(doc)?;
        if start != next {
            return Err(PersistError::Message(format!(
                "non-contiguous append for {doc}: journal ends at {next}, got start {start}"
            )));
        }
        if ops.is_empty() {
            return Ok(next);
        }

        let ts_ms = now_ms();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO operations(doc, idx, ts_ms, name, payload) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (offset, op) in ops.iter().enumerate() {
                let payload = serde_json::to_vec(&OpEnvelope::new(op)?)?;
                stmt.execute(params![
                    doc,
                    (start + offset) as i64,
                    ts_ms as i64,
                    op.command().name(),
                    payload,
                ])?;
            }
        }
        tx.commit()?;

        debug!(doc, start, count = ops.len(), "journaled operations");
        Ok(start + ops.len())
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
