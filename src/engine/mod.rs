mod availability;
mod counters;
mod error;
mod mutations;
mod queries;
mod store;
#[cfg(test)]
mod tests;

pub use availability::{available_rooms, free_shifts};
pub use error::EngineError;
pub use mutations::BookingRequest;
use store::Store;

use std::io;
use std::path::PathBuf;

use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{info, warn};

use crate::model::*;
use crate::wal::Wal;

// ── Group-commit WAL channel ─────────────────────────────

pub(super) enum WalCommand {
    /// Events of one commit. They reach the disk in the same flush and
    /// share one acknowledgement.
    Append {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

/// Background task that owns the WAL and batches appends for group commit.
/// 1. Block until the first Append arrives.
/// 2. Buffer it (no fsync).
/// 3. Drain all immediately available Appends.
/// 4. Single flush_sync for the whole batch.
/// 5. Respond to all senders.
async fn wal_writer_loop(mut wal: Wal, mut rx: mpsc::Receiver<WalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            WalCommand::Append { events, response } => {
                let mut batch = vec![(events, response)];
                let mut deferred = None;
                loop {
                    match rx.try_recv() {
                        Ok(WalCommand::Append { events, response }) => batch.push((events, response)),
                        Ok(other) => {
                            deferred = Some(other);
                            break;
                        }
                        Err(_) => break,
                    }
                }

                metrics::histogram!(crate::observability::WAL_FLUSH_BATCH_SIZE)
                    .record(batch.iter().map(|(events, _)| events.len()).sum::<usize>() as f64);
                let flush_start = std::time::Instant::now();
                let result = flush_batch(&mut wal, &batch);
                metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
                    .record(flush_start.elapsed().as_secs_f64());
                respond_batch(batch, &result);

                if let Some(other) = deferred {
                    handle_non_append(&mut wal, other);
                }
            }
            other => handle_non_append(&mut wal, other),
        }
    }
}

fn flush_batch(wal: &mut Wal, batch: &[(Vec<Event>, oneshot::Sender<io::Result<()>>)]) -> io::Result<()> {
    let mut append_err: Option<io::Error> = None;
    for event in batch.iter().flat_map(|(events, _)| events) {
        if let Err(e) = wal.append_buffered(event) {
            append_err = Some(e);
            break;
        }
    }
    // Flush even after an append error so partial bytes don't leak into the next batch.
    let flush_err = wal.flush_sync().err();
    match (append_err, flush_err) {
        (Some(e), _) | (None, Some(e)) => Err(e),
        (None, None) => Ok(()),
    }
}

fn respond_batch(batch: Vec<(Vec<Event>, oneshot::Sender<io::Result<()>>)>, result: &io::Result<()>) {
    for (_, tx) in batch {
        let r = match result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

fn handle_non_append(wal: &mut Wal, cmd: WalCommand) {
    match cmd {
        WalCommand::Compact { events, response } => {
            let result = wal.compact(&events);
            if result.is_ok() {
                info!("compacted {} to {} events", wal.path().display(), events.len());
            }
            let _ = response.send(result);
        }
        WalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(wal.appends_since_compact());
        }
        WalCommand::Append { events, response } => {
            let result = events
                .iter()
                .try_for_each(|event| wal.append_buffered(event))
                .and_then(|()| wal.flush_sync());
            let _ = response.send(result);
        }
    }
}

/// The reservation store: in-memory tables, the WAL that makes them durable,
/// and the id sequences. Open once at startup, `close` at shutdown.
pub struct Engine {
    pub(super) store: Store,
    pub(super) wal_tx: mpsc::Sender<WalCommand>,
    /// Held across every peek → insert → advance sequence.
    pub(super) commit: Mutex<()>,
    compact_threshold: u64,
}

impl Engine {
    /// Replay the WAL at `wal_path` and start the background writer.
    /// Must be called from within a tokio runtime.
    pub fn open(wal_path: PathBuf, compact_threshold: u64) -> io::Result<Self> {
        let events = Wal::replay(&wal_path)?;
        let store = Store::new();
        for event in &events {
            if let Err(e) = store.apply_event(event) {
                warn!("replay: skipping event: {e}");
            }
        }
        for (seq, value) in store.repair_counters() {
            warn!("replay: {seq} counter behind stored ids, moved to {value}");
        }
        info!(
            "opened {} ({} events, {} clients, {} rooms, {} bookings)",
            wal_path.display(),
            events.len(),
            store.client_count(),
            store.room_count(),
            store.booking_count()
        );

        let wal = Wal::open(&wal_path)?;
        let (wal_tx, wal_rx) = mpsc::channel(1024);
        tokio::spawn(wal_writer_loop(wal, wal_rx));

        Ok(Self {
            store,
            wal_tx,
            commit: Mutex::new(()),
            compact_threshold,
        })
    }

    /// Write events to WAL via the background group-commit writer.
    async fn wal_append(&self, events: &[Event]) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Append {
                events: events.to_vec(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    /// WAL-append then apply to the tables, all events or none. Callers
    /// check constraints first, so a rejected write never reaches the log.
    pub(super) async fn persist_and_apply(&self, events: &[Event]) -> Result<(), EngineError> {
        self.wal_append(events).await?;
        for event in events {
            self.store.apply_event(event)?;
        }
        Ok(())
    }

    /// Rewrite the WAL with only the events needed to recreate the current state.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let _commit = self.commit.lock().await;
        let events = self.store.snapshot();
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Compact { events, response: tx })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .wal_tx
            .send(WalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }

    /// Shut the store down, compacting the WAL first if enough appends piled up.
    pub async fn close(self) -> Result<(), EngineError> {
        let appends = self.wal_appends_since_compact().await;
        if appends >= self.compact_threshold {
            self.compact_wal().await?;
        }
        info!("store closed after {appends} appends");
        Ok(())
    }
}
