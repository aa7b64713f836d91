use crate::error::{IoError, Result};
use crate::serialization::{from_json, to_json};
use eve_core::FrameSink;
use eve_data::SystemFrame;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

/// One persisted frame with its position in the macrocosm's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFrame {
    pub macrocosm: usize,
    pub seq: u64,
    pub frame: SystemFrame,
    pub recorded_at: String,
}

/// Commands for the background storage thread.
pub enum StorageCommand {
    /// Appends a frame under the macrocosm's next sequence number.
    AppendFrame {
        macrocosm: usize,
        frame: SystemFrame,
    },
    /// Stores a key/value pair describing the run (config fingerprint etc).
    SetMeta { key: String, value: String },
    /// Queries every frame of a macrocosm in sequence order.
    QueryFrames(usize, Sender<Vec<StoredFrame>>),
    /// Queries the identifiers of all macrocosms with at least one frame.
    QueryMacrocosms(Sender<Vec<usize>>),
    QueryMeta(String, Sender<Option<String>>),
    /// Replies once every earlier command has been handled.
    Flush(Sender<()>),
    /// Shutdown the storage thread.
    Stop,
}

fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS frames (
             macrocosm INTEGER NOT NULL,
             seq INTEGER NOT NULL,
             frame TEXT NOT NULL,
             recorded_at TEXT NOT NULL,
             PRIMARY KEY (macrocosm, seq)
         );
         CREATE TABLE IF NOT EXISTS meta (
             key TEXT PRIMARY KEY,
             value TEXT NOT NULL
         );",
    )
}

struct Worker {
    conn: Connection,
    next_seq: HashMap<usize, u64>,
}

impl Worker {
    /// Sequence number the next frame of `macrocosm` will get. Only a
    /// successful insert moves it on.
    fn next_seq(&mut self, macrocosm: usize) -> rusqlite::Result<u64> {
        if let Some(&seq) = self.next_seq.get(&macrocosm) {
            return Ok(seq);
        }
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(seq) + 1, 0) FROM frames WHERE macrocosm = ?1",
            params![macrocosm as i64],
            |row| row.get(0),
        )?;
        let next = next as u64;
        self.next_seq.insert(macrocosm, next);
        Ok(next)
    }

    fn append(&mut self, macrocosm: usize, frame: &SystemFrame) -> Result<u64> {
        let json = to_json(frame)?;
        let seq = self.next_seq(macrocosm)?;
        self.conn.execute(
            "INSERT INTO frames (macrocosm, seq, frame, recorded_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                macrocosm as i64,
                seq as i64,
                json,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        self.next_seq.insert(macrocosm, seq + 1);
        Ok(seq)
    }

    fn frames(&self, macrocosm: usize) -> Result<Vec<StoredFrame>> {
        let mut stmt = self.conn.prepare(
            "SELECT seq, frame, recorded_at FROM frames WHERE macrocosm = ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![macrocosm as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut frames = Vec::new();
        for row in rows {
            let (seq, json, recorded_at) = row?;
            frames.push(StoredFrame {
                macrocosm,
                seq: seq as u64,
                frame: from_json(&json)?,
                recorded_at,
            });
        }
        Ok(frames)
    }

    fn macrocosms(&self) -> Result<Vec<usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT macrocosm FROM frames ORDER BY macrocosm")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        Ok(rows.filter_map(|r| r.ok()).map(|id| id as usize).collect())
    }

    fn meta(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    fn run(mut self, rx: mpsc::Receiver<StorageCommand>) {
        while let Ok(cmd) = rx.recv() {
            match cmd {
                StorageCommand::AppendFrame { macrocosm, frame } => {
                    if let Err(e) = self.append(macrocosm, &frame) {
                        tracing::error!(macrocosm, error = %e, "Failed to append frame");
                    }
                }
                StorageCommand::SetMeta { key, value } => {
                    if let Err(e) = self.conn.execute(
                        "INSERT INTO meta (key, value) VALUES (?1, ?2)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        params![key, value],
                    ) {
                        tracing::error!(key, error = %e, "Failed to store meta");
                    }
                }
                StorageCommand::QueryFrames(macrocosm, reply_tx) => {
                    let frames = self.frames(macrocosm).unwrap_or_else(|e| {
                        tracing::error!(macrocosm, error = %e, "Failed to query frames");
                        Vec::new()
                    });
                    let _ = reply_tx.send(frames);
                }
                StorageCommand::QueryMacrocosms(reply_tx) => {
                    let _ = reply_tx.send(self.macrocosms().unwrap_or_default());
                }
                StorageCommand::QueryMeta(key, reply_tx) => {
                    let _ = reply_tx.send(self.meta(&key).ok().flatten());
                }
                StorageCommand::Flush(reply_tx) => {
                    let _ = reply_tx.send(());
                }
                StorageCommand::Stop => break,
            }
        }
    }
}

/// Append-only frame log in SQLite.
///
/// Writes are queued to a background thread so the tick loop never waits on
/// disk. Queries block until the thread has handled every earlier command,
/// so a frame appended before a query is always visible to it.
pub struct StorageManager {
    sender: Sender<StorageCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StorageManager {
    /// Opens (or creates) the log at `path` and spawns its worker thread.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| IoError::from(e).with_context(format!("opening {}", path.display())))?;
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;");
        Self::with_connection(conn)
    }

    /// Log held in memory for the lifetime of the manager.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        let (tx, rx) = mpsc::channel();
        let worker = Worker {
            conn,
            next_seq: HashMap::new(),
        };
        let handle = thread::Builder::new()
            .name("eve-storage".to_string())
            .spawn(move || worker.run(rx))?;
        Ok(Self {
            sender: tx,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Returns a new sender handle to communicate with the storage thread.
    pub fn clone_sender(&self) -> Sender<StorageCommand> {
        self.sender.clone()
    }

    fn send(&self, cmd: StorageCommand) -> Result<()> {
        self.sender.send(cmd).map_err(|_| IoError::Disconnected)
    }

    /// Queues a frame for the macrocosm's log.
    pub fn append_frame(&self, macrocosm: usize, frame: SystemFrame) -> Result<()> {
        self.send(StorageCommand::AppendFrame { macrocosm, frame })
    }

    pub fn set_meta(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.send(StorageCommand::SetMeta {
            key: key.into(),
            value: value.into(),
        })
    }

    pub fn meta(&self, key: impl Into<String>) -> Result<Option<String>> {
        let (tx, rx) = mpsc::channel();
        self.send(StorageCommand::QueryMeta(key.into(), tx))?;
        rx.recv().map_err(|_| IoError::Disconnected)
    }

    /// Frames of `macrocosm` in sequence order.
    pub fn frames(&self, macrocosm: usize) -> Result<Vec<StoredFrame>> {
        let (tx, rx) = mpsc::channel();
        self.send(StorageCommand::QueryFrames(macrocosm, tx))?;
        rx.recv().map_err(|_| IoError::Disconnected)
    }

    pub fn macrocosms(&self) -> Result<Vec<usize>> {
        let (tx, rx) = mpsc::channel();
        self.send(StorageCommand::QueryMacrocosms(tx))?;
        rx.recv().map_err(|_| IoError::Disconnected)
    }

    /// Blocks until every queued command has been written.
    pub fn flush(&self) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        self.send(StorageCommand::Flush(tx))?;
        rx.recv().map_err(|_| IoError::Disconnected)
    }

    /// Drains the queue and stops the worker thread.
    pub fn shutdown(&self) {
        let _ = self.sender.send(StorageCommand::Stop);
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Storage thread panicked");
            }
        }
    }
}

impl Drop for StorageManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl FrameSink for StorageManager {
    fn append(&self, macrocosm: usize, frame: &SystemFrame) -> anyhow::Result<()> {
        Ok(self.append_frame(macrocosm, *frame)?)
    }
}
