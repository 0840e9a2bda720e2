//! Flat-file JSON backend.
//!
//! The whole collection lives in one pretty-printed JSON array. Every call
//! loads the file fresh and every mutation rewrites it in full through a
//! uniquely named temp file + rename, so readers never observe a
//! half-written document and concurrent writers never share a temp file.
//!
//! ```text
//! tasks.json           # [ {id, title, description, status, created_at, updated_at}, ... ]
//! tasks.counter.json   # {"next_id": N}, ID high-water mark
//! tasks.json.lock      # advisory lock, only when locking is enabled
//! ```

use std::cell::Cell;
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::model::{Status, Task};
use crate::store::lock::FileLock;
use crate::store::{TaskRepository, allocate_id, sorted_by_id, successor};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Counter {
    next_id: u64,
}

#[derive(Debug)]
pub struct JsonTaskStore {
    path: PathBuf,
    locking: bool,
    /// Set while an [`ExclusiveSection`] from this handle is alive.
    held: Cell<bool>,
}

/// Lock held across several calls on one [`JsonTaskStore`].
///
/// Empty when locking is disabled or when the handle is already inside a
/// section; only the outermost section unlocks on drop.
#[derive(Debug)]
pub struct ExclusiveSection<'a> {
    lock: Option<FileLock>,
    held: Option<&'a Cell<bool>>,
}

impl Drop for ExclusiveSection<'_> {
    fn drop(&mut self) {
        if let Some(held) = self.held {
            held.set(false);
        }
        if let Some(lock) = self.lock.take() {
            let path = lock.path().to_path_buf();
            if let Err(e) = lock.release() {
                tracing::warn!(path = %path.display(), error = %e, "failed to release lock");
            }
        }
    }
}

impl Clone for JsonTaskStore {
    /// A clone is a separate handle: it does not inherit a held section.
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            locking: self.locking,
            held: Cell::new(false),
        }
    }
}

impl JsonTaskStore {
    /// Point at a data file. Nothing is touched on disk until the first call.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            locking: false,
            held: Cell::new(false),
        }
    }

    /// Hold `<file>.lock` for the duration of each repository call, and for
    /// the whole of each [`exclusive`](TaskRepository::exclusive) section.
    pub fn with_locking(mut self, enabled: bool) -> Self {
        self.locking = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn locking(&self) -> bool {
        self.locking
    }

    pub fn counter_path(&self) -> PathBuf {
        self.path.with_extension("counter.json")
    }

    pub fn lock_path(&self) -> PathBuf {
        sibling(&self.path, ".lock")
    }

    fn guard(&self) -> Result<Option<FileLock>> {
        if self.locking && !self.held.get() {
            FileLock::acquire(self.lock_path()).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read the full collection. Missing and zero-byte files are empty.
    pub fn load(&self) -> Result<Vec<Task>> {
        let Some(data) = read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        let tasks: Option<Vec<Task>> =
            serde_json::from_slice(&data).map_err(|e| TrackerError::corrupt(&self.path, e))?;
        let tasks = tasks.unwrap_or_default();
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Overwrite the full collection.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let mut json = serde_json::to_string_pretty(tasks)?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    fn read_floor(&self) -> Result<u64> {
        let path = self.counter_path();
        let Some(data) = read_optional(&path)? else {
            return Ok(0);
        };
        let counter: Counter =
            serde_json::from_slice(&data).map_err(|e| TrackerError::corrupt(&path, e))?;
        Ok(counter.next_id)
    }

    fn raise_floor(&self, allocated: u64) -> Result<()> {
        let next_id = successor(allocated)?;
        if next_id <= self.read_floor()? {
            return Ok(());
        }
        let counter = Counter { next_id };
        write_atomic(&self.counter_path(), serde_json::to_string(&counter)?.as_bytes())
    }
}

impl TaskRepository for JsonTaskStore {
    type Exclusive<'a> = ExclusiveSection<'a>;

    fn exclusive(&self) -> Result<ExclusiveSection<'_>> {
        if !self.locking || self.held.get() {
            return Ok(ExclusiveSection {
                lock: None,
                held: None,
            });
        }
        let lock = FileLock::acquire(self.lock_path())?;
        self.held.set(true);
        Ok(ExclusiveSection {
            lock: Some(lock),
            held: Some(&self.held),
        })
    }

    fn create(&self, task: &Task) -> Result<()> {
        let _lock = self.guard()?;
        let mut tasks = self.load()?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(TrackerError::Validation(format!(
                "task {} already exists",
                task.id
            )));
        }
        // The high-water mark is written first: a failed save leaves a gap
        // in the IDs, never a stored task whose ID can be handed out again.
        self.raise_floor(task.id)?;
        tasks.push(task.clone());
        self.save(&tasks)
    }

    fn get_by_id(&self, id: u64) -> Result<Task> {
        let _lock = self.guard()?;
        self.load()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(TrackerError::TaskNotFound(id))
    }

    fn get_all(&self) -> Result<Vec<Task>> {
        let _lock = self.guard()?;
        Ok(sorted_by_id(self.load()?))
    }

    fn get_by_status(&self, status: Status) -> Result<Vec<Task>> {
        let _lock = self.guard()?;
        let mut tasks = self.load()?;
        tasks.retain(|t| t.status == status);
        Ok(sorted_by_id(tasks))
    }

    fn update(&self, task: &Task) -> Result<()> {
        let _lock = self.guard()?;
        let mut tasks = self.load()?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(TrackerError::TaskNotFound(task.id))?;
        *slot = task.clone();
        self.save(&tasks)
    }

    fn delete(&self, id: u64) -> Result<()> {
        let _lock = self.guard()?;
        let mut tasks = self.load()?;
        let index = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TrackerError::TaskNotFound(id))?;
        tasks.remove(index);
        self.save(&tasks)
    }

    fn next_id(&self) -> Result<u64> {
        let _lock = self.guard()?;
        let tasks = self.load()?;
        allocate_id(&tasks, self.read_floor()?)
    }
}

/// `None` when the file is missing or empty.
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) if data.is_empty() => Ok(None),
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TrackerError::io(path, e)),
    }
}

/// `tasks.json` + `.lock` -> `tasks.json.lock`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Write to a uniquely named temp file beside `path`, fsync, then rename
/// over the target. The temp file is removed on every failure path.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut prefix = OsString::from(".");
    prefix.push(path.file_name().unwrap_or_default());
    prefix.push(".");

    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| TrackerError::io(path, e))?;
    temp.write_all(data)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| TrackerError::io(path, e))?;
    temp.persist(path)
        .map_err(|e| TrackerError::io(path, e.error))?;
    Ok(())
}
