use crate::error::Result;
use crate::output::{self, Format};
use crate::service::TaskService;
use crate::store::TaskRepository;

/// Empty `title`/`description` keep the stored values.
pub fn run<R: TaskRepository>(
    service: &TaskService<R>,
    id: u64,
    title: &str,
    description: &str,
    format: Format,
) -> Result<()> {
    let task = service.update_task(id, title, description)?;
    output::print_task(&task, format)?;
    Ok(())
}
