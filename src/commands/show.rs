use crate::error::Result;
use crate::output::{self, Format};
use crate::service::TaskService;
use crate::store::TaskRepository;

pub fn run<R: TaskRepository>(service: &TaskService<R>, id: u64, format: Format) -> Result<()> {
    let task = service.get_task(id)?;
    output::print_task(&task, format)?;
    Ok(())
}
