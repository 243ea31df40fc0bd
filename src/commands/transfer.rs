//! `deploy`, `pull` and `delete`

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tracing::warn;

use targetsync::application::{Session, TransferPlan};
use targetsync::domain::services::select_single_target;
use targetsync::domain::value_objects::OperationKind;

use super::project::Project;
use super::prompt::DialoguerPrompt;
use super::{install_cancel_handler, Output};

pub(crate) fn cmd_deploy(
    project: &Project,
    files: &[PathBuf],
    target: Option<&str>,
    output: &Output,
) -> Result<()> {
    let files = project.absolute_files(files)?;
    let session = &project.session;
    let plan = match target {
        Some(name) => named_plan(session, name, &files)?,
        None => session.plan(&files),
    };
    report_unmatched(&plan);

    install_cancel_handler(session.cancellation());
    let outcomes = session.deploy_plan(&plan);
    output.finish(OperationKind::Upload, &outcomes)
}

pub(crate) fn cmd_pull(
    project: &Project,
    files: &[PathBuf],
    target: Option<&str>,
    output: &Output,
) -> Result<()> {
    let files = project.absolute_files(files)?;
    let session = &project.session;
    let plan = match target {
        Some(name) => named_plan(session, name, &files)?,
        None => {
            let prompt = DialoguerPrompt {
                prompt: "Pull from which target?".to_string(),
            };
            let mut plan = TransferPlan::default();
            for file in &files {
                let candidates = session.targets_for_file(file, false).unwrap_or_default();
                match select_single_target(&candidates, &prompt) {
                    Some(target) => plan.add(target, file),
                    None => plan.unmatched.push(file.clone()),
                }
            }
            plan
        }
    };
    report_unmatched(&plan);

    install_cancel_handler(session.cancellation());
    let outcomes = session.pull_plan(&plan);
    output.finish(OperationKind::Download, &outcomes)
}

pub(crate) fn cmd_delete(
    project: &Project,
    files: &[PathBuf],
    target: Option<&str>,
    output: &Output,
) -> Result<()> {
    let files = project.absolute_files(files)?;
    let session = &project.session;
    let plan = match target {
        Some(name) => named_plan(session, name, &files)?,
        None => session.plan(&files),
    };
    report_unmatched(&plan);

    install_cancel_handler(session.cancellation());
    let outcomes = session.delete_plan(&plan);
    output.finish(OperationKind::Delete, &outcomes)
}

fn named_plan<'s>(session: &'s Session, name: &str, files: &[PathBuf]) -> Result<TransferPlan<'s>> {
    let target = session
        .target(name)
        .ok_or_else(|| anyhow!("unknown target '{}'", name))?;
    let mut plan = TransferPlan::default();
    for file in files {
        plan.add(target, file);
    }
    Ok(plan)
}

fn report_unmatched(plan: &TransferPlan<'_>) {
    for file in &plan.unmatched {
        warn!(file = %file.display(), "no target applies");
    }
}
