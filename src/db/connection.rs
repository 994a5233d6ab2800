use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex, PoisonError},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::{Connection, Transaction};
use tokio::sync::oneshot;

use super::migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

/// Owns the worker thread. Dropping the last handle closes the queue, which
/// ends the thread's loop; the thread is then joined.
struct Worker {
    queue: Mutex<Option<mpsc::Sender<DbTask>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).take();
        let handle = self.thread.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if let Err(err) = handle.join() {
                error!("Failed to join DB thread: {err:?}");
            }
        }
    }
}

/// Handle to the single SQLite connection. Every query runs on one worker
/// thread, so each task is serialized against all others. Session
/// completion and frame inserts rely on this.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
    db_path: Arc<PathBuf>,
}

/// Open the file, switch on WAL and foreign keys, and bring the schema up
/// to date.
fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;
    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        error!("Failed to enable WAL mode: {err}");
    }
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    run_migrations(&mut conn).context("failed to run database migrations")?;
    Ok(conn)
}

fn serve(mut conn: Connection, tasks: mpsc::Receiver<DbTask>) {
    for task in tasks {
        task(&mut conn);
    }
    info!("Database thread shutting down");
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (queue, tasks) = mpsc::channel::<DbTask>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let path = db_path.clone();

        let thread = thread::Builder::new()
            .name("screenwell-db".into())
            .spawn(move || match open_connection(&path) {
                Ok(conn) => {
                    if ready_tx.send(Ok(())).is_ok() {
                        serve(conn, tasks);
                    }
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database ready at {}", db_path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                queue: Mutex::new(Some(queue)),
                thread: Mutex::new(Some(thread)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Run `task` on the DB thread and wait for its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: DbTask = Box::new(move |conn| {
            if reply_tx.send(task(conn)).is_err() {
                error!("DB caller dropped before receiving result");
            }
        });

        {
            let queue = self.worker.queue.lock().unwrap_or_else(PoisonError::into_inner);
            queue
                .as_ref()
                .ok_or_else(|| anyhow!("database is closed"))?
                .send(job)
                .map_err(|_| anyhow!("database thread is gone"))?;
        }

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    /// Like [`execute`](Self::execute) inside one transaction: committed
    /// when `task` returns `Ok`, rolled back otherwise.
    pub async fn transaction<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let value = task(&tx)?;
            tx.commit()?;
            Ok(value)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use rusqlite::params;

    async fn user_count(db: &Database) -> i64 {
        db.execute(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?))
            .await
            .unwrap()
    }

    fn insert_user(tx: &Transaction<'_>, email: &str) -> Result<()> {
        tx.execute(
            "INSERT INTO users (email, name, quiz_completed, created_at) VALUES (?1, 'x', 0, '2026-01-01T00:00:00Z')",
            params![email],
        )?;
        Ok(())
    }

    #[tokio::test]
    async fn failed_transaction_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("nested").join("test.db")).unwrap();
        assert!(db.path().exists());

        db.transaction(|tx| insert_user(tx, "a@example.com")).await.unwrap();
        let failed: Result<()> = db
            .transaction(|tx| {
                insert_user(tx, "b@example.com")?;
                bail!("abort");
            })
            .await;
        assert!(failed.is_err());
        assert_eq!(user_count(&db).await, 1);
    }

    #[tokio::test]
    async fn clones_share_one_connection() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let other = db.clone();
        other.transaction(|tx| insert_user(tx, "c@example.com")).await.unwrap();
        drop(other);
        assert_eq!(user_count(&db).await, 1);
    }
}
