use anyhow::{anyhow, Result};

use super::project::Project;
use super::Output;

pub(crate) fn cmd_list(project: &Project, target: &str, dir: &str, output: &Output) -> Result<()> {
    let session = &project.session;
    let target = session
        .target(target)
        .ok_or_else(|| anyhow!("unknown target '{}'", target))?;

    let listing = session.list(target, dir)?;
    println!("{}", output.renderer.render_listing(&target.name, &listing));
    Ok(())
}
