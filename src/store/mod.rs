//! Task persistence.
//!
//! [`TaskRepository`] is the storage contract consumed by the service layer.
//! Every backend must honour the same ordering and error rules:
//!
//! - list operations return tasks sorted ascending by ID;
//! - lookups, updates and deletes of an unknown ID fail with
//!   [`TrackerError::TaskNotFound`](crate::error::TrackerError::TaskNotFound);
//! - `update` never inserts;
//! - `next_id` never hands out an ID that was allocated before, even if that
//!   task has since been deleted;
//! - an exhausted ID space is a validation error, never a wrapped ID.
//!
//! Multi-step operations (allocate then create, read then update) run inside
//! [`TaskRepository::exclusive`] so no other writer can interleave.

pub mod json;
pub mod lock;
pub mod memory;

use crate::error::{Result, TrackerError};
use crate::model::{Status, Task};

pub use json::JsonTaskStore;
pub use memory::MemoryTaskStore;

pub trait TaskRepository {
    /// Held for as long as the caller needs a consistent view across calls.
    type Exclusive<'a>
    where
        Self: 'a;

    /// Enter a section in which no other writer can touch the store. Calls
    /// made on this repository while the section is alive do not re-lock.
    fn exclusive(&self) -> Result<Self::Exclusive<'_>>;

    /// Append a new task to the collection.
    fn create(&self, task: &Task) -> Result<()>;

    fn get_by_id(&self, id: u64) -> Result<Task>;

    /// All tasks, sorted by ID.
    fn get_all(&self) -> Result<Vec<Task>>;

    /// Tasks with exactly `status`, sorted by ID.
    fn get_by_status(&self, status: Status) -> Result<Vec<Task>>;

    /// Replace the stored task with the same ID.
    fn update(&self, task: &Task) -> Result<()>;

    fn delete(&self, id: u64) -> Result<()>;

    fn next_id(&self) -> Result<u64>;
}

/// `max(ids) + 1`, raised to `floor`; 1 for an empty, never-used store.
pub(crate) fn allocate_id(tasks: &[Task], floor: u64) -> Result<u64> {
    let next = match tasks.iter().map(|t| t.id).max() {
        Some(max) => successor(max)?,
        None => 1,
    };
    Ok(next.max(floor))
}

/// The ID after `id`, or a validation error once `u64::MAX` is in use.
pub(crate) fn successor(id: u64) -> Result<u64> {
    id.checked_add(1)
        .ok_or_else(|| TrackerError::Validation("task id space exhausted".into()))
}

pub(crate) fn sorted_by_id(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|t| t.id);
    tasks
}
