//! Business rules layered over a [`TaskRepository`].
//!
//! The repository knows nothing about validation; this layer rejects empty
//! titles and unknown status strings, allocates IDs, and builds the pending
//! view. Errors from the repository pass through with their kind intact.
//!
//! Read-modify-write operations run inside one
//! [`exclusive`](TaskRepository::exclusive) section, so a concurrent writer
//! cannot take the same ID or overwrite a change made in between.

use crate::error::{Result, TrackerError};
use crate::model::{Status, Task};
use crate::store::TaskRepository;

pub struct TaskService<R> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn create_task(&self, title: &str, description: &str) -> Result<Task> {
        if title.is_empty() {
            return Err(TrackerError::Validation("task title cannot be empty".into()));
        }

        let _section = self.repo.exclusive()?;
        let id = self.repo.next_id().inspect_err(|e| {
            tracing::warn!(error = %e, "create_task: failed to allocate id");
        })?;
        let task = Task::new(id, title, description);
        self.repo.create(&task).inspect_err(|e| {
            tracing::warn!(id, error = %e, "create_task: failed to persist");
        })?;

        tracing::info!(id, "created task");
        Ok(task)
    }

    pub fn get_task(&self, id: u64) -> Result<Task> {
        self.repo.get_by_id(id).inspect_err(|e| {
            tracing::debug!(id, error = %e, "get_task failed");
        })
    }

    pub fn get_all_tasks(&self) -> Result<Vec<Task>> {
        self.repo.get_all().inspect_err(|e| {
            tracing::debug!(error = %e, "get_all_tasks failed");
        })
    }

    pub fn get_tasks_by_status(&self, status: Status) -> Result<Vec<Task>> {
        self.repo.get_by_status(status).inspect_err(|e| {
            tracing::debug!(%status, error = %e, "get_tasks_by_status failed");
        })
    }

    /// Todo tasks followed by in-progress tasks, each group sorted by ID.
    ///
    /// The groups are concatenated, not merged: an in-progress task with a
    /// lower ID still comes after every todo task.
    pub fn get_pending_tasks(&self) -> Result<Vec<Task>> {
        let mut pending = self.get_tasks_by_status(Status::Todo)?;
        pending.extend(self.get_tasks_by_status(Status::InProgress)?);
        Ok(pending)
    }

    /// Non-empty arguments replace the stored field; empty ones keep it.
    pub fn update_task(&self, id: u64, title: &str, description: &str) -> Result<Task> {
        let _section = self.repo.exclusive()?;
        let mut task = self.get_task(id)?;
        task.apply_update(title, description);
        self.repo.update(&task).inspect_err(|e| {
            tracing::warn!(id, error = %e, "update_task: failed to persist");
        })?;

        tracing::info!(id, "updated task");
        Ok(task)
    }

    /// Parse `status` and apply it. Any status may follow any other.
    pub fn update_task_status(&self, id: u64, status: &str) -> Result<Task> {
        let status: Status = status.parse()?;
        self.set_status(id, status)
    }

    pub fn set_status(&self, id: u64, status: Status) -> Result<Task> {
        let _section = self.repo.exclusive()?;
        let mut task = self.get_task(id)?;
        task.set_status(status);
        self.repo.update(&task).inspect_err(|e| {
            tracing::warn!(id, %status, error = %e, "set_status: failed to persist");
        })?;

        tracing::info!(id, %status, "changed task status");
        Ok(task)
    }

    pub fn mark_done(&self, id: u64) -> Result<Task> {
        self.set_status(id, Status::Done)
    }

    pub fn mark_in_progress(&self, id: u64) -> Result<Task> {
        self.set_status(id, Status::InProgress)
    }

    pub fn mark_todo(&self, id: u64) -> Result<Task> {
        self.set_status(id, Status::Todo)
    }

    pub fn delete_task(&self, id: u64) -> Result<u64> {
        self.repo.delete(id).inspect_err(|e| {
            tracing::debug!(id, error = %e, "delete_task failed");
        })?;

        tracing::info!(id, "deleted task");
        Ok(id)
    }
}
