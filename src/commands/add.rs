use crate::error::Result;
use crate::output::{self, Format};
use crate::service::TaskService;
use crate::store::TaskRepository;

pub fn run<R: TaskRepository>(
    service: &TaskService<R>,
    title: &str,
    description: &str,
    format: Format,
) -> Result<()> {
    let task = service.create_task(title, description)?;
    output::print_task(&task, format)?;
    Ok(())
}
