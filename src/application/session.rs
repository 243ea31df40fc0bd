//! Session - the owned root of all sync state
//!
//! Holds the loaded workspaces, the plugin registry (inside the operation
//! controller) and the TCP proxy registry. Nothing here is global; tests
//! build as many isolated sessions as they like.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::operations::{BatchSummary, OperationController};
use crate::domain::entities::{select_workspace, Target, TargetOperation, Workspace};
use crate::domain::ports::{ConditionEvaluator, HookRunner, OperationEvent};
use crate::domain::services::TargetResolver;
use crate::domain::value_objects::{CancellationFlag, DirectoryListing};
use crate::error::{SyncError, SyncResult};
use crate::infrastructure::proxy::ProxyRegistry;

/// Result of one target's batch within a multi-target operation
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    pub result: SyncResult<BatchSummary>,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(&self.result, Ok(summary) if summary.is_success())
    }
}

/// Files grouped by the target they go to
#[derive(Debug, Default)]
pub struct TransferPlan<'s> {
    pub batches: Vec<(&'s Target, Vec<PathBuf>)>,
    /// Files no target applies to
    pub unmatched: Vec<PathBuf>,
}

impl<'s> TransferPlan<'s> {
    /// Queue `file` for `target`, once.
    pub fn add(&mut self, target: &'s Target, file: &Path) {
        match self
            .batches
            .iter_mut()
            .find(|(t, _)| std::ptr::eq(*t, target))
        {
            Some((_, files)) if files.iter().any(|f| f == file) => {}
            Some((_, files)) => files.push(file.to_path_buf()),
            None => self.batches.push((target, vec![file.to_path_buf()])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

pub struct Session {
    workspaces: Vec<Workspace>,
    controller: OperationController,
    evaluator: Arc<dyn ConditionEvaluator>,
    hooks: Arc<dyn HookRunner>,
    proxies: ProxyRegistry,
    platform: String,
    /// Force fast check when resolving on save
    fast_check_on_save: bool,
    cancel: CancellationFlag,
}

impl Session {
    pub fn new(
        workspaces: Vec<Workspace>,
        controller: OperationController,
        evaluator: Arc<dyn ConditionEvaluator>,
        hooks: Arc<dyn HookRunner>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            workspaces,
            controller,
            evaluator,
            hooks,
            proxies: ProxyRegistry::new(),
            platform: platform.into(),
            fast_check_on_save: false,
            cancel: CancellationFlag::new(),
        }
    }

    pub fn with_fast_check_on_save(mut self, fast: bool) -> Self {
        self.fast_check_on_save = fast;
        self
    }

    pub fn fast_check_on_save(&self) -> bool {
        self.fast_check_on_save
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn controller(&self) -> &OperationController {
        &self.controller
    }

    pub fn proxies(&self) -> &ProxyRegistry {
        &self.proxies
    }

    /// Flag shared by every batch this session starts
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Most specific workspace containing `file`
    pub fn workspace_for(&self, file: &Path) -> Option<&Workspace> {
        select_workspace(&self.workspaces, file)
    }

    pub fn resolver<'a>(&'a self, workspace: &'a Workspace) -> TargetResolver<'a> {
        TargetResolver::new(workspace, self.evaluator.as_ref(), self.platform.clone())
    }

    /// Find a target by name in any workspace
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.workspaces.iter().find_map(|ws| ws.target(name))
    }

    /// Targets applying to `file`, `None` when there are none
    pub fn targets_for_file(&self, file: &Path, fast: bool) -> Option<Vec<&Target>> {
        let workspace = self.workspace_for(file)?;
        self.resolver(workspace).resolve_all_for_file(file, fast)
    }

    /// Group files by every target they resolve to, in workspace then
    /// declaration order.
    pub fn plan(&self, files: &[PathBuf]) -> TransferPlan<'_> {
        let mut plan = TransferPlan::default();
        for file in files {
            match self.targets_for_file(file, false) {
                Some(targets) => {
                    for target in targets {
                        plan.add(target, file);
                    }
                }
                None => plan.unmatched.push(file.clone()),
            }
        }
        plan.batches
            .sort_by_key(|(target, _)| (self.workspace_position(target), target.index));
        plan
    }

    /// Deploy every batch of a plan
    pub fn deploy_plan(&self, plan: &TransferPlan<'_>) -> Vec<TargetOutcome> {
        self.run_plan(plan, |target, files| self.deploy(target, files))
    }

    pub fn pull_plan(&self, plan: &TransferPlan<'_>) -> Vec<TargetOutcome> {
        self.run_plan(plan, |target, files| self.pull(target, files))
    }

    pub fn delete_plan(&self, plan: &TransferPlan<'_>) -> Vec<TargetOutcome> {
        self.run_plan(plan, |target, files| self.delete(target, files))
    }

    /// Deploy files to one target, running its hooks around the batch.
    ///
    /// A failing `before_deploy` step aborts this target only.
    pub fn deploy(&self, target: &Target, files: &[PathBuf]) -> SyncResult<BatchSummary> {
        self.run_hooks(target, &target.before_deploy)?;

        let result = self.controller.upload(target, files, &self.cancel);

        if let Err(e) = self.run_hooks(target, &target.deployed) {
            warn!(target = %target.name, error = %e, "deployed hook failed");
        }
        result
    }

    /// Deploy one file to every target it resolves to
    pub fn deploy_file(&self, file: &Path) -> Vec<TargetOutcome> {
        match self.targets_for_file(file, false) {
            Some(targets) => self.deploy_to(targets, file),
            None => {
                info!(file = %file.display(), "no target applies");
                Vec::new()
            }
        }
    }

    /// Deploy a saved file to the deploy-on-save targets of its packages
    pub fn deploy_on_save(&self, file: &Path) -> Vec<TargetOutcome> {
        let Some(workspace) = self.workspace_for(file) else {
            return Vec::new();
        };
        match self
            .resolver(workspace)
            .resolve_for_package_file(file, self.fast_check_on_save)
        {
            Some(targets) => self.deploy_to(targets, file),
            None => Vec::new(),
        }
    }

    pub fn pull(&self, target: &Target, files: &[PathBuf]) -> SyncResult<BatchSummary> {
        self.controller.download(target, files, &self.cancel)
    }

    pub fn delete(&self, target: &Target, files: &[PathBuf]) -> SyncResult<BatchSummary> {
        self.controller.delete(target, files, &self.cancel)
    }

    pub fn list(&self, target: &Target, dir: &str) -> SyncResult<DirectoryListing> {
        self.controller.list(target, dir, &self.cancel)
    }

    fn run_plan<F>(&self, plan: &TransferPlan<'_>, run: F) -> Vec<TargetOutcome>
    where
        F: Fn(&Target, &[PathBuf]) -> SyncResult<BatchSummary>,
    {
        plan.batches
            .iter()
            .map(|(target, files)| TargetOutcome {
                target: target.name.clone(),
                result: run(target, files),
            })
            .collect()
    }

    fn workspace_position(&self, target: &Target) -> usize {
        self.workspaces
            .iter()
            .position(|ws| ws.name == target.workspace_name && ws.root == target.workspace_root)
            .unwrap_or(usize::MAX)
    }

    fn deploy_to(&self, targets: Vec<&Target>, file: &Path) -> Vec<TargetOutcome> {
        let files = [file.to_path_buf()];
        targets
            .into_iter()
            .map(|target| TargetOutcome {
                target: target.name.clone(),
                result: self.deploy(target, &files),
            })
            .collect()
    }

    fn run_hooks(&self, target: &Target, hooks: &[TargetOperation]) -> SyncResult<()> {
        for hook in hooks {
            if self.cancel.is_cancelling() {
                return Err(SyncError::Cancelled);
            }
            let result = self.hooks.run(target, hook);
            self.controller.events().on_event(OperationEvent::HookExecuted {
                target: target.name.clone(),
                hook: hook.label(),
                success: result.is_ok(),
            });
            result?;
        }
        Ok(())
    }
}
