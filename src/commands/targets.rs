use std::path::Path;

use anyhow::Result;

use super::project::Project;

pub(crate) fn cmd_targets(project: &Project, file: &Path, fast: bool, on_save: bool, json: bool) -> Result<()> {
    let files = project.absolute_files(&[file.to_path_buf()])?;
    let file = &files[0];
    let session = &project.session;

    let targets = if on_save {
        session.workspace_for(file).and_then(|ws| {
            session
                .resolver(ws)
                .resolve_for_package_file(file, fast || session.fast_check_on_save())
        })
    } else {
        session.targets_for_file(file, fast)
    };
    let targets = targets.unwrap_or_default();

    if json {
        let json = serde_json::json!({
            "file": file.display().to_string(),
            "targets": targets.iter().map(|t| serde_json::json!({
                "name": t.name,
                "type": t.kind,
                "workspace": t.workspace_name,
                "description": t.description,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if targets.is_empty() {
        println!("No target applies to {}", file.display());
    }
    for target in targets {
        println!("{}\t{}\t{}", target.name, target.kind, target.display_name());
    }
    Ok(())
}
