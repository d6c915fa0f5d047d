//! Upstream staleness check
//!
//! Compares the local branch with its tracking branch using whatever remote
//! refs are already present. Nothing is fetched.

use std::path::Path;

use git2::{BranchType, ErrorCode, Repository};
use tracing::{debug, warn};

use crate::error::Result;

/// How the current branch relates to its upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamStatus {
    pub branch: String,
    pub upstream: String,
    pub ahead: usize,
    pub behind: usize,
}

impl UpstreamStatus {
    /// Warning text when the local checkout is behind
    pub fn warning(&self) -> Option<String> {
        (self.behind > 0).then(|| {
            format!(
                "Local repo is {} commit(s) behind remote. Run 'git pull' to update specs.",
                self.behind
            )
        })
    }
}

/// Ahead/behind counts for the branch checked out at `project_root`.
///
/// `Ok(None)` when HEAD is detached, unborn, or has no upstream.
pub fn upstream_status(project_root: &Path) -> Result<Option<UpstreamStatus>> {
    let repo = Repository::discover(project_root)?;

    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if !head.is_branch() {
        return Ok(None);
    }
    let (Some(branch_name), Some(local)) = (head.shorthand(), head.target()) else {
        return Ok(None);
    };

    let branch = repo.find_branch(branch_name, BranchType::Local)?;
    let upstream = match branch.upstream() {
        Ok(upstream) => upstream,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let Some(remote) = upstream.get().target() else {
        return Ok(None);
    };

    let (ahead, behind) = repo.graph_ahead_behind(local, remote)?;
    Ok(Some(UpstreamStatus {
        branch: branch_name.to_string(),
        upstream: upstream.name()?.unwrap_or_default().to_string(),
        ahead,
        behind,
    }))
}

/// Staleness warning for `project_root`, if any.
///
/// Git problems (not a repository, no upstream) are not errors here; they
/// just mean there is nothing to warn about.
pub fn staleness_warning(project_root: &Path) -> Option<String> {
    match upstream_status(project_root) {
        Ok(status) => {
            let warning = status.as_ref().and_then(UpstreamStatus::warning);
            if let Some(message) = &warning {
                warn!("{}", message);
            }
            warning
        }
        Err(e) => {
            debug!(error = %e, "Skipping upstream check");
            None
        }
    }
}
