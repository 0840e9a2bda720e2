use clap::ValueEnum;

use crate::error::Result;
use crate::model::{Status, Task};
use crate::output::{self, Format};
use crate::service::TaskService;
use crate::store::TaskRepository;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFilter {
    #[default]
    All,
    Todo,
    InProgress,
    Done,
    /// Todo tasks, then in-progress tasks
    Pending,
}

impl ListFilter {
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Todo => Some("todo"),
            Self::InProgress => Some("in-progress"),
            Self::Done => Some("done"),
            Self::Pending => Some("pending"),
        }
    }
}

pub fn collect<R: TaskRepository>(service: &TaskService<R>, filter: ListFilter) -> Result<Vec<Task>> {
    match filter {
        ListFilter::All => service.get_all_tasks(),
        ListFilter::Todo => service.get_tasks_by_status(Status::Todo),
        ListFilter::InProgress => service.get_tasks_by_status(Status::InProgress),
        ListFilter::Done => service.get_tasks_by_status(Status::Done),
        ListFilter::Pending => service.get_pending_tasks(),
    }
}

pub fn run<R: TaskRepository>(
    service: &TaskService<R>,
    filter: ListFilter,
    format: Format,
) -> Result<()> {
    let tasks = collect(service, filter)?;
    output::print_tasks(&tasks, format, filter.label())
}
