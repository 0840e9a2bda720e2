use crate::error::Result;
use crate::model::Status;
use crate::output::{self, Format};
use crate::service::TaskService;
use crate::store::TaskRepository;

fn set_status<R: TaskRepository>(
    service: &TaskService<R>,
    id: u64,
    target: Status,
    format: Format,
) -> Result<()> {
    let task = match target {
        Status::Todo => service.mark_todo(id)?,
        Status::InProgress => service.mark_in_progress(id)?,
        Status::Done => service.mark_done(id)?,
    };
    output::print_task(&task, format)
}

pub fn todo<R: TaskRepository>(service: &TaskService<R>, id: u64, format: Format) -> Result<()> {
    set_status(service, id, Status::Todo, format)
}

pub fn start<R: TaskRepository>(service: &TaskService<R>, id: u64, format: Format) -> Result<()> {
    set_status(service, id, Status::InProgress, format)
}

pub fn finish<R: TaskRepository>(service: &TaskService<R>, id: u64, format: Format) -> Result<()> {
    set_status(service, id, Status::Done, format)
}

/// Free-form status string, validated by the service.
pub fn set<R: TaskRepository>(
    service: &TaskService<R>,
    id: u64,
    status: &str,
    format: Format,
) -> Result<()> {
    let task = service.update_task_status(id, status)?;
    output::print_task(&task, format)
}
