use std::cell::{Cell, RefCell};

use crate::error::{Result, TrackerError};
use crate::model::{Status, Task};
use crate::store::{TaskRepository, allocate_id, sorted_by_id, successor};

/// In-process backend with the same contract as [`JsonTaskStore`](super::JsonTaskStore).
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RefCell<Vec<Task>>,
    floor: Cell<u64>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing tasks, stored in the given (unsorted) order.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RefCell::new(tasks),
            floor: Cell::new(0),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl TaskRepository for MemoryTaskStore {
    /// A `RefCell` already serializes access within the process.
    type Exclusive<'a> = ();

    fn exclusive(&self) -> Result<()> {
        Ok(())
    }

    fn create(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.borrow_mut();
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(TrackerError::Validation(format!(
                "task {} already exists",
                task.id
            )));
        }
        let floor = successor(task.id)?;
        self.floor.set(self.floor.get().max(floor));
        tasks.push(task.clone());
        Ok(())
    }

    fn get_by_id(&self, id: u64) -> Result<Task> {
        self.tasks
            .borrow()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(TrackerError::TaskNotFound(id))
    }

    fn get_all(&self) -> Result<Vec<Task>> {
        Ok(sorted_by_id(self.tasks.borrow().clone()))
    }

    fn get_by_status(&self, status: Status) -> Result<Vec<Task>> {
        let matching = self
            .tasks
            .borrow()
            .iter()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        Ok(sorted_by_id(matching))
    }

    fn update(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.borrow_mut();
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(TrackerError::TaskNotFound(task.id))?;
        *slot = task.clone();
        Ok(())
    }

    fn delete(&self, id: u64) -> Result<()> {
        let mut tasks = self.tasks.borrow_mut();
        let index = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TrackerError::TaskNotFound(id))?;
        tasks.remove(index);
        Ok(())
    }

    fn next_id(&self) -> Result<u64> {
        allocate_id(&self.tasks.borrow(), self.floor.get())
    }
}
