//! Bounded pool of DuckDB connections with scoped checkout.
//!
//! Every pooled connection is cloned from one origin connection, so an
//! in-memory database is shared by the whole pool. The origin is opened
//! eagerly and never handed out; it keeps the database alive until close.
use crate::database::config::DatabaseConfig;
use crate::database::config::Target;
use crate::database::DatabaseError;
use duckdb::Connection;
use std::ops::Deref;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use std::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::warn;

struct PoolState {
    /// Source of new connections, `None` once closed
    origin: Option<Connection>,
    idle: Vec<Connection>,
    /// Connections in existence, idle or checked out
    open: usize,
}

pub(crate) struct ConnectionPool {
    state: Mutex<PoolState>,
    available: Condvar,
    max_size: usize,
    acquire_timeout: Duration,
}

impl ConnectionPool {
    /// Opens the origin connection and one pooled connection.
    pub(crate) fn open(config: &DatabaseConfig) -> Result<ConnectionPool, DatabaseError> {
        config.validate()?;
        let origin = match config.target()? {
            Target::Memory => Connection::open_in_memory(),
            Target::File(path) => Connection::open(&path),
        }
        .map_err(|error| DatabaseError::ConnectionFailure(error.to_string()))?;
        let first = origin
            .try_clone()
            .map_err(|error| DatabaseError::ConnectionFailure(error.to_string()))?;

        info!(address = %config.address, pool_size = config.pool_size, "opened connection pool");
        Ok(ConnectionPool {
            state: Mutex::new(PoolState {
                origin: Some(origin),
                idle: vec![first],
                open: 1,
            }),
            available: Condvar::new(),
            max_size: config.pool_size,
            acquire_timeout: config.acquire_timeout(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, PoolState>, DatabaseError> {
        self.state.lock().map_err(|_| poisoned())
    }

    /// Checks out a connection, growing the pool or waiting for a return.
    ///
    /// Waits at most the configured acquire timeout, or indefinitely when the
    /// timeout is too large to form a deadline.
    pub(crate) fn checkout(&self) -> Result<PooledConnection<'_>, DatabaseError> {
        let deadline = Instant::now().checked_add(self.acquire_timeout);
        let mut state = self.lock()?;
        loop {
            if state.origin.is_none() {
                return Err(DatabaseError::Closed);
            }
            if let Some(connection) = state.idle.pop() {
                debug!(idle = state.idle.len(), "checked out connection");
                return Ok(PooledConnection::new(self, connection));
            }
            if state.open < self.max_size {
                let connection = state
                    .origin
                    .as_ref()
                    .ok_or(DatabaseError::Closed)?
                    .try_clone()
                    .map_err(|error| DatabaseError::ConnectionFailure(error.to_string()))?;
                state.open += 1;
                debug!(open = state.open, max = self.max_size, "grew connection pool");
                return Ok(PooledConnection::new(self, connection));
            }

            state = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(DatabaseError::PoolExhausted(self.acquire_timeout));
                    }
                    self.available.wait_timeout(state, deadline - now).map_err(|_| poisoned())?.0
                }
                None => self.available.wait(state).map_err(|_| poisoned())?,
            };
        }
    }

    fn release(&self, connection: Connection) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.origin.is_none() {
            state.open = state.open.saturating_sub(1);
            warn!(outstanding = state.open, "connection returned after pool close, discarding");
            drop(connection);
            return;
        }
        state.idle.push(connection);
        debug!(idle = state.idle.len(), "returned connection");
        drop(state);
        self.available.notify_one();
    }

    /// Closes idle connections and the origin; later checkouts fail.
    ///
    /// Connections still checked out are discarded when returned.
    pub(crate) fn close(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.origin.is_none() {
            return;
        }
        let idle = std::mem::take(&mut state.idle);
        state.open -= idle.len();
        state.origin = None;
        let outstanding = state.open;
        drop(state);
        drop(idle);
        self.available.notify_all();
        info!(outstanding, "closed connection pool");
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state.lock().map(|state| state.origin.is_some()).unwrap_or(false)
    }

    /// Connections currently in existence.
    pub(crate) fn size(&self) -> usize {
        self.state.lock().map(|state| state.open).unwrap_or(0)
    }
}

fn poisoned() -> DatabaseError {
    DatabaseError::ConnectionFailure("connection pool mutex poisoned".to_owned())
}

impl Drop for ConnectionPool {
    fn drop(&mut self) {
        self.close();
    }
}

/// A checked-out connection, returned to its pool when dropped.
pub(crate) struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    /// Always `Some` until dropped
    connection: Option<Connection>,
}

impl<'a> PooledConnection<'a> {
    fn new(pool: &'a ConnectionPool, connection: Connection) -> Self {
        PooledConnection {
            pool,
            connection: Some(connection),
        }
    }
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match &self.connection {
            Some(connection) => connection,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(size: usize, timeout_ms: u64) -> ConnectionPool {
        let config = DatabaseConfig::in_memory()
            .with_pool_size(size)
            .with_acquire_timeout(Duration::from_millis(timeout_ms));
        ConnectionPool::open(&config).unwrap()
    }

    #[test]
    fn pool_grows_to_max_and_reuses() {
        let pool = pool(2, 50);
        assert_eq!(pool.size(), 1);
        {
            let first = pool.checkout().unwrap();
            let second = pool.checkout().unwrap();
            assert_eq!(pool.size(), 2);
            first.execute_batch("CREATE TABLE shared (id INTEGER)").unwrap();
            // Clones of the origin see the same in-memory database
            second.execute_batch("INSERT INTO shared VALUES (1)").unwrap();

            let error = pool.checkout().err().unwrap();
            assert!(matches!(error, DatabaseError::PoolExhausted(_)));
        }
        let _again = pool.checkout().unwrap();
        assert_eq!(pool.size(), 2);
    }

    #[test]
    fn pool_waiter_gets_returned_connection() {
        let pool = pool(1, 5_000);
        let held = pool.checkout().unwrap();
        std::thread::scope(|scope| {
            let waiter = scope.spawn(|| pool.checkout().map(|_| ()));
            std::thread::sleep(Duration::from_millis(50));
            drop(held);
            assert!(waiter.join().unwrap().is_ok());
        });
    }

    #[test]
    fn pool_unbounded_timeout_waits_without_deadline() {
        let config = DatabaseConfig::in_memory()
            .with_pool_size(1)
            .with_acquire_timeout(Duration::MAX);
        assert_eq!(config.acquire_timeout_ms, u64::MAX);
        let pool = ConnectionPool::open(&config).unwrap();
        let held = pool.checkout().unwrap();
        std::thread::scope(|scope| {
            let waiter = scope.spawn(|| pool.checkout().map(|_| ()));
            std::thread::sleep(Duration::from_millis(50));
            drop(held);
            assert!(waiter.join().unwrap().is_ok());
        });
        assert!(pool.checkout().is_ok());
    }

    #[test]
    fn pool_close_discards_outstanding() {
        let pool = pool(2, 50);
        let held = pool.checkout().unwrap();
        pool.close();
        pool.close();
        assert!(!pool.is_open());
        assert!(matches!(pool.checkout().err(), Some(DatabaseError::Closed)));
        assert_eq!(pool.size(), 1);
        drop(held);
        assert_eq!(pool.size(), 0);
    }
}
