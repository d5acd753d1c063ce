use super::DbPool;
use crate::errors::StorageError;
use abacus_core::errors::{DatabaseError, Error, Result};
use diesel::SqliteConnection;
use log::error;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::{mpsc, oneshot};

// A write job runs against the actor's connection inside an open transaction.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type Reply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

fn writer_gone() -> Error {
    Error::Database(DatabaseError::ConnectionFailed(
        "database writer is not running".to_string(),
    ))
}

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, Reply)>,
}

impl WriteHandle {
    /// Runs `job` on the writer's connection inside an `IMMEDIATE` transaction.
    ///
    /// Jobs run one at a time in submission order. If the job returns `Err`,
    /// the transaction is rolled back and the job's error is returned as is.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_gone())?;

        let boxed = ret_rx.await.map_err(|_| writer_gone())??;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::Unexpected("write job returned an unexpected type".to_string()))
    }
}

/// Spawns the single database writer.
///
/// The actor holds one pooled connection for its whole lifetime and processes
/// jobs serially, so SQLite never sees two writers from this process.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, Reply)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Database writer could not acquire a connection: {}", e);
                while let Some((_, reply_tx)) = rx.recv().await {
                    let _ = reply_tx.send(Err(Error::Database(DatabaseError::ConnectionFailed(
                        e.to_string(),
                    ))));
                }
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    // A panicking job rolls back like a failed one and the actor keeps running.
                    panic::catch_unwind(AssertUnwindSafe(|| job(c)))
                        .unwrap_or_else(|_| {
                            error!("Database write job panicked; transaction rolled back");
                            Err(Error::Unexpected("write job panicked".to_string()))
                        })
                        .map_err(StorageError::from)
                })
                .map_err(Error::from);

            // The requester may have gone away (timeout, cancelled request).
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations};
    use diesel::prelude::*;
    use diesel::sql_types::BigInt;

    #[derive(QueryableByName)]
    struct Count {
        #[diesel(sql_type = BigInt)]
        n: i64,
    }

    fn count_assets(conn: &mut SqliteConnection) -> Result<i64> {
        let row: Count = diesel::sql_query("SELECT COUNT(*) AS n FROM assets")
            .get_result(conn)
            .map_err(StorageError::from)?;
        Ok(row.n)
    }

    #[tokio::test]
    async fn failed_job_rolls_back_and_keeps_its_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("writer.db");
        let db_path = init(path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer((*pool).clone());

        let result: Result<()> = writer
            .exec(|conn| {
                diesel::sql_query(
                    "INSERT INTO assets (id, name, created_at) VALUES ('a1', 'A', '2024-01-01 00:00:00')",
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Err(Error::not_found("Portfolio", "p9"))
            })
            .await;

        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert_eq!(writer.exec(count_assets).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn panicking_job_does_not_stop_the_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("writer.db");
        let db_path = init(path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer((*pool).clone());

        let result: Result<()> = writer
            .exec(|conn| {
                diesel::sql_query(
                    "INSERT INTO assets (id, name, created_at) VALUES ('a1', 'A', '2024-01-01 00:00:00')",
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                panic!("job blew up");
            })
            .await;

        assert!(matches!(result, Err(Error::Unexpected(_))));
        assert_eq!(writer.exec(count_assets).await.unwrap(), 0);
    }
}
