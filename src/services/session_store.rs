//! Session Store for TaskaDeck.
//!
//! One named cookie partition shared by every browsing surface. Persistent
//! partitions (`persist:<name>`) live under `<data dir>/Partitions/<name>/`,
//! which is also handed to the webview engine, and keep an explicit SQLite
//! cookie jar that is flushed on every non-removal change and on a timer.
//! Flushes run on a tokio blocking task and are never awaited by the shell.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::database::connection::Database;
use crate::types::cookie::{CookieChange, CookieKey, StoredCookie};
use crate::types::errors::SessionError;

const PERSIST_PREFIX: &str = "persist:";
const JAR_FILE: &str = "Cookies.db";
const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Callback run on every periodic flush tick.
pub type PeriodicTick = Box<dyn Fn() + Send + 'static>;

/// Trait defining session store operations.
pub trait SessionStoreTrait {
    fn partition(&self) -> &str;
    fn data_directory(&self) -> Option<&Path>;
    fn cookie_changed(&mut self, change: CookieChange);
    fn observe_snapshot(&mut self, cookies: Vec<StoredCookie>) -> usize;
    fn flush(&self) -> JoinHandle<()>;
    fn flush_blocking(&self) -> Result<(), SessionError>;
    fn start_periodic_flush(&mut self, interval: Duration, tick: PeriodicTick);
    fn stop_periodic_flush(&mut self);
}

/// Shared cookie session backed by an on-disk jar.
pub struct SessionStore {
    partition: String,
    directory: Option<PathBuf>,
    jar: BTreeMap<CookieKey, StoredCookie>,
    db: Option<Arc<Mutex<Database>>>,
    runtime: Handle,
    periodic: Option<JoinHandle<()>>,
    periodic_interval: Option<Duration>,
}

impl SessionStore {
    /// Obtains or creates the named partition below `data_root`.
    ///
    /// Existing jar contents are loaded so the first snapshot is diffed
    /// against what is already on disk.
    pub fn init(partition: &str, data_root: &Path, runtime: Handle) -> Result<Self, SessionError> {
        let (directory, db) = match partition.strip_prefix(PERSIST_PREFIX) {
            Some(name) => {
                let dir = data_root.join("Partitions").join(partition_dir_name(name));
                fs::create_dir_all(&dir).map_err(|e| {
                    SessionError::IoError(format!(
                        "Failed to create partition directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
                let db = Database::open(dir.join(JAR_FILE))?;
                (Some(dir), Some(db))
            }
            None => (None, None),
        };

        let mut jar = BTreeMap::new();
        if let Some(db) = &db {
            for cookie in db.load_cookies()? {
                jar.insert(cookie.key(), cookie);
            }
        }

        match &directory {
            Some(dir) => log::info!(
                "Session partition '{}' at {} ({} stored cookies)",
                partition,
                dir.display(),
                jar.len()
            ),
            None => log::info!("Session partition '{}' is in-memory", partition),
        }

        Ok(Self {
            partition: partition.to_string(),
            directory,
            jar,
            db: db.map(|db| Arc::new(Mutex::new(db))),
            runtime,
            periodic: None,
            periodic_interval: None,
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.db.is_some()
    }

    pub fn cookie_count(&self) -> usize {
        self.jar.len()
    }

    pub fn cookies(&self) -> impl Iterator<Item = &StoredCookie> {
        self.jar.values()
    }

    pub fn is_periodic_flush_running(&self) -> bool {
        self.periodic.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn periodic_flush_interval(&self) -> Option<Duration> {
        self.periodic_interval
    }

    /// Applies one change to the in-memory jar. Returns whether it warrants a flush.
    fn apply_change(&mut self, change: CookieChange) -> bool {
        let key = change.cookie.key();
        if change.removed {
            self.jar.remove(&key);
            return false;
        }
        self.jar.insert(key, change.cookie);
        true
    }
}

impl SessionStoreTrait for SessionStore {
    fn partition(&self) -> &str {
        &self.partition
    }

    /// Directory handed to the webview engine; `None` for in-memory partitions.
    fn data_directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Change listener: non-removal changes schedule a flush.
    fn cookie_changed(&mut self, change: CookieChange) {
        if self.apply_change(change) {
            drop(self.flush());
        }
    }

    /// Diffs a full cookie snapshot against the jar and feeds every difference
    /// through the change listener. At most one flush is scheduled per call.
    ///
    /// Returns the number of changes observed.
    fn observe_snapshot(&mut self, cookies: Vec<StoredCookie>) -> usize {
        let incoming: BTreeMap<CookieKey, StoredCookie> =
            cookies.into_iter().map(|c| (c.key(), c)).collect();

        let mut changes: Vec<CookieChange> = self
            .jar
            .iter()
            .filter(|(key, _)| !incoming.contains_key(*key))
            .map(|(_, cookie)| CookieChange {
                cookie: cookie.clone(),
                removed: true,
            })
            .collect();
        changes.extend(
            incoming
                .into_values()
                .filter(|cookie| self.jar.get(&cookie.key()) != Some(cookie))
                .map(|cookie| CookieChange {
                    cookie,
                    removed: false,
                }),
        );

        let count = changes.len();
        let mut needs_flush = false;
        for change in changes {
            needs_flush |= self.apply_change(change);
        }
        if needs_flush {
            drop(self.flush());
        }
        if count > 0 {
            log::debug!("Observed {} cookie change(s) in '{}'", count, self.partition);
        }
        count
    }

    /// Writes the jar to disk on a blocking task. Failures are logged.
    fn flush(&self) -> JoinHandle<()> {
        let cookies: Vec<StoredCookie> = self.jar.values().cloned().collect();
        let db = self.db.clone();
        let partition = self.partition.clone();
        self.runtime.spawn_blocking(move || {
            let Some(db) = db else {
                return;
            };
            match write_jar(&db, &cookies) {
                Ok(()) => log::debug!("Flushed {} cookie(s) for '{}'", cookies.len(), partition),
                Err(e) => log::warn!("Cookie flush for '{}' failed: {}", partition, e),
            }
        })
    }

    /// Synchronous flush used at shutdown.
    fn flush_blocking(&self) -> Result<(), SessionError> {
        match &self.db {
            Some(db) => {
                let cookies: Vec<StoredCookie> = self.jar.values().cloned().collect();
                write_jar(db, &cookies)
            }
            None => Ok(()),
        }
    }

    /// Starts a fixed-interval timer that calls `tick`, independent of activity.
    ///
    /// The first tick fires one full interval after the call.
    fn start_periodic_flush(&mut self, interval: Duration, tick: PeriodicTick) {
        self.stop_periodic_flush();
        let interval = interval.max(MIN_FLUSH_INTERVAL);
        let task = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                tick();
            }
        });
        self.periodic = Some(task);
        self.periodic_interval = Some(interval);
        log::info!("Periodic cookie flush every {:?}", interval);
    }

    fn stop_periodic_flush(&mut self) {
        if let Some(task) = self.periodic.take() {
            task.abort();
        }
        self.periodic_interval = None;
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.stop_periodic_flush();
    }
}

fn write_jar(db: &Mutex<Database>, cookies: &[StoredCookie]) -> Result<(), SessionError> {
    let db = db
        .lock()
        .map_err(|e| SessionError::DatabaseError(format!("cookie jar lock poisoned: {}", e)))?;
    db.replace_cookies(cookies)?;
    Ok(())
}

/// Directory name for a partition: anything outside `[A-Za-z0-9._-]` becomes `_`.
fn partition_dir_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "default".to_string()
    } else {
        cleaned
    }
}
