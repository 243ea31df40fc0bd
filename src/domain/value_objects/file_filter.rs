//! File filter value object
//!
//! Include/exclude glob patterns deciding whether a workspace path applies to
//! a target or package. Matching is case-insensitive, includes dotfiles and
//! always runs against the canonical leading-slash form of a path
//! (`src/app.js` and `\src\app.js` both become `/src/app.js`).
//!
//! Exclusion always wins: a path matching any exclude pattern is rejected even
//! when an include pattern matches it too.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::string_list;
use crate::error::{SyncError, SyncResult};

/// Pattern used when `files` is absent or blank
pub const MATCH_EVERYTHING: &str = "**";

/// Include/exclude glob pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub files: Vec<String>,

    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub exclude: Vec<String>,
}

impl FileFilter {
    pub fn new<I, E>(files: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter that matches every path
    pub fn all() -> Self {
        Self::default()
    }

    /// Normalized include patterns; falls back to `**` when nothing usable is set.
    pub fn include_patterns(&self) -> Vec<String> {
        let patterns = normalize_patterns(&self.files);
        if patterns.is_empty() {
            vec![MATCH_EVERYTHING.to_string()]
        } else {
            patterns
        }
    }

    /// Normalized exclude patterns (possibly empty)
    pub fn exclude_patterns(&self) -> Vec<String> {
        normalize_patterns(&self.exclude)
    }

    /// Compile the patterns once for repeated matching.
    pub fn compile(&self) -> SyncResult<CompiledFilter> {
        Ok(CompiledFilter {
            include: build_glob_set(&self.include_patterns())?,
            exclude: build_glob_set(&self.exclude_patterns())?,
        })
    }

    /// Check a single path against this filter.
    ///
    /// Invalid patterns are logged and make the filter match nothing.
    pub fn matches(&self, path: &str) -> bool {
        match self.compile() {
            Ok(compiled) => compiled.matches(path),
            Err(e) => {
                warn!(error = %e, "ignoring file filter with invalid pattern");
                false
            }
        }
    }
}

/// Compiled include/exclude matcher
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl CompiledFilter {
    pub fn matches(&self, path: &str) -> bool {
        let candidate = to_filter_path(path);
        if self.exclude.is_match(&candidate) {
            return false;
        }
        self.include.is_match(&candidate)
    }
}

/// Convenience wrapper for a one-off match.
pub fn matches(path: &str, filter: &FileFilter) -> bool {
    filter.matches(path)
}

/// Trim, drop blank entries and de-duplicate while keeping the first occurrence.
pub fn normalize_patterns(patterns: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !result.iter().any(|p| p == trimmed) {
            result.push(trimmed.to_string());
        }
    }
    result
}

/// Canonical form used for matching: forward slashes and a leading `/`.
pub fn to_filter_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    if unified.starts_with('/') {
        unified
    } else {
        format!("/{}", unified)
    }
}

fn build_glob_set(patterns: &[String]) -> SyncResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(&to_filter_path(pattern))
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|e| SyncError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| SyncError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}
