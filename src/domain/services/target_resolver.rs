//! Target resolution
//!
//! Decides which targets of a workspace receive an operation for a file.
//! Results are in declaration order; `None` means "no applicable targets"
//! and is never represented by an empty list.

use std::path::Path;

use tracing::{debug, trace};

use super::item_filters::{is_item_active, ConditionalFilterOptions, ConditionalItem};
use crate::domain::entities::{Package, Target, Workspace};
use crate::domain::ports::{ConditionEvaluator, TargetPrompt};
use crate::domain::value_objects::platform_allowed;

/// Resolves targets for files of one workspace
pub struct TargetResolver<'a> {
    workspace: &'a Workspace,
    evaluator: &'a dyn ConditionEvaluator,
    platform: String,
}

impl<'a> TargetResolver<'a> {
    pub fn new(
        workspace: &'a Workspace,
        evaluator: &'a dyn ConditionEvaluator,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            workspace,
            evaluator,
            platform: platform.into(),
        }
    }

    pub fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    /// Resolve the targets that apply to `file`.
    ///
    /// `targets_provider` supplies the candidates (`None` when there are
    /// none to consider). In fast-check mode only path containment and
    /// the file mappings are checked; full mode also requires the target's
    /// conditions and platform restriction to hold.
    pub fn resolve_for_file<P, F>(
        &self,
        file: &Path,
        targets_provider: P,
        fast_check_provider: F,
    ) -> Option<Vec<&'a Target>>
    where
        P: FnOnce() -> Option<Vec<&'a Target>>,
        F: FnOnce() -> bool,
    {
        if !self.workspace.is_path_of(file) {
            trace!(file = %file.display(), "file is outside the workspace");
            return None;
        }
        let relative = self.workspace.relative_path(file)?;

        let candidates = targets_provider()?;
        let fast = fast_check_provider();

        let mut resolved: Vec<&'a Target> = candidates
            .into_iter()
            .filter(|target| target.matches_path(&relative))
            .filter(|target| fast || self.is_target_active(target))
            .collect();

        resolved.sort_by_key(|t| t.index);
        resolved.dedup_by(|a, b| std::ptr::eq(*a, *b));

        debug!(
            file = %relative,
            fast,
            targets = resolved.len(),
            "resolved targets for file"
        );
        if resolved.is_empty() {
            None
        } else {
            Some(resolved)
        }
    }

    /// Resolve against every target of the workspace
    pub fn resolve_all_for_file(&self, file: &Path, fast: bool) -> Option<Vec<&'a Target>> {
        let workspace = self.workspace;
        self.resolve_for_file(
            file,
            || {
                let all: Vec<&Target> = workspace.targets().iter().collect();
                (!all.is_empty()).then_some(all)
            },
            || fast,
        )
    }

    /// Resolve the deploy-on-save targets of every package containing `file`.
    ///
    /// Only packages that opt into deploy on save take part. A package in
    /// fast-check mode (or `force_fast`) skips its own and its targets'
    /// conditions and platform checks.
    pub fn resolve_for_package_file(
        &self,
        file: &Path,
        force_fast: bool,
    ) -> Option<Vec<&'a Target>> {
        let relative = self.workspace.relative_path(file)?;

        let mut resolved: Vec<&'a Target> = Vec::new();
        for package in self.workspace.packages() {
            let Some(names) = package.save_target_names() else {
                continue;
            };
            let fast = force_fast || package.fast_check_on_save;
            if !package.filter.matches(&relative) {
                continue;
            }
            if !fast && !self.is_package_active(package) {
                continue;
            }

            let workspace = self.workspace;
            if let Some(targets) = self.resolve_for_file(
                file,
                || {
                    let named = workspace.targets_by_name(names.as_slice());
                    (!named.is_empty()).then_some(named)
                },
                || fast,
            ) {
                resolved.extend(targets);
            }
        }

        resolved.sort_by_key(|t| t.index);
        resolved.dedup_by(|a, b| std::ptr::eq(*a, *b));
        if resolved.is_empty() {
            None
        } else {
            Some(resolved)
        }
    }

    fn is_target_active(&self, target: &Target) -> bool {
        platform_allowed(&target.platforms, &self.platform) && self.conditions_hold(target)
    }

    fn is_package_active(&self, package: &Package) -> bool {
        platform_allowed(&package.platforms, &self.platform) && self.conditions_hold(package)
    }

    fn conditions_hold<T: ConditionalItem>(&self, item: &T) -> bool {
        // Recovery already logged the failure; it maps to "inactive".
        is_item_active(
            item,
            self.evaluator,
            &self.platform,
            ConditionalFilterOptions::default(),
        )
        .unwrap_or(false)
    }
}

/// Pick at most one target.
///
/// A single candidate is returned without asking; with several the prompt
/// decides.
pub fn select_single_target<'a>(
    candidates: &[&'a Target],
    prompt: &dyn TargetPrompt,
) -> Option<&'a Target> {
    match candidates {
        [] => None,
        [only] => Some(*only),
        _ => prompt
            .choose(candidates)
            .and_then(|index| candidates.get(index).copied()),
    }
}
