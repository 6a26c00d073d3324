// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Repository Poller
//!
//! Polls a set of local git clones on a fixed interval, diffing each
//! tracked branch's current head against the head it observed last time and
//! the set of tags against the tag set it observed last time. Ported from
//! `git_events.py`'s detector loop: repositories are visited sequentially
//! within one poll tick (never in parallel) so that a slow or wedged
//! repository delays the tick rather than racing with the others.
//!
//! State is persisted to `poller_state_dir` after every tick. Without it, a
//! process restart would find every branch "new" and announce a spurious
//! flood of [`EventKind::BranchCreate`] events for branches the poller has
//! already reported on in a previous run.

use git2::Repository;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use devops_domain::entities::RepositoryEvent;
use devops_domain::error::DevOpsError;
use devops_domain::value_objects::{EventKind, RepositoryRef};

#[derive(Default, Serialize, Deserialize)]
struct RepoState {
    branch_heads: HashMap<String, String>,
    tags: HashSet<String>,
    /// `false` only until the poller has recorded one baseline tick for this
    /// repository; the baseline tick never emits `BranchCreate`/`TagCreate`
    /// for branches or tags it is seeing for the first time.
    #[serde(default)]
    baselined: bool,
}

/// One tracked local clone: the repository identity, its path on disk, and
/// the branches to diff. An empty branch list tracks every local branch.
pub struct TrackedClone {
    pub repository: RepositoryRef,
    pub path: PathBuf,
    pub tracked_branches: Vec<String>,
}

pub struct RepositoryPoller {
    tracked: Vec<TrackedClone>,
    state: HashMap<RepositoryRef, RepoState>,
    state_dir: Option<PathBuf>,
}

fn state_file(state_dir: &Path, repo_ref: &RepositoryRef) -> PathBuf {
    state_dir.join(format!("{}.json", repo_ref.as_str().replace('/', "_")))
}

fn load_state(state_dir: Option<&Path>, repo_ref: &RepositoryRef) -> RepoState {
    let Some(dir) = state_dir else { return RepoState::default() };
    std::fs::read_to_string(state_file(dir, repo_ref))
        .ok()
        .and_then(|contents| serde_json::from_str(&contents).ok())
        .unwrap_or_default()
}

fn save_state(state_dir: Option<&Path>, repo_ref: &RepositoryRef, state: &RepoState) {
    let Some(dir) = state_dir else { return };
    if std::fs::create_dir_all(dir).is_err() {
        return;
    }
    if let Ok(json) = serde_json::to_string(state) {
        let _ = std::fs::write(state_file(dir, repo_ref), json);
    }
}

impl RepositoryPoller {
    pub fn new(tracked: Vec<TrackedClone>, state_dir: Option<PathBuf>) -> Self {
        let state = tracked
            .iter()
            .map(|clone| (clone.repository.clone(), load_state(state_dir.as_deref(), &clone.repository)))
            .collect();
        Self { tracked, state, state_dir }
    }

    /// Runs one poll tick over every tracked repository, returning the
    /// events newly detected this tick. Repositories that fail to open
    /// (missing clone, corrupted `.git`) are skipped with their error
    /// logged by the caller rather than aborting the whole tick.
    pub fn poll_once(&mut self) -> Vec<(RepositoryRef, Result<Vec<RepositoryEvent>, DevOpsError>)> {
        let mut results = Vec::with_capacity(self.tracked.len());
        for clone in &self.tracked {
            let outcome = poll_repository(clone, self.state.entry(clone.repository.clone()).or_default());
            save_state(self.state_dir.as_deref(), &clone.repository, &self.state[&clone.repository]);
            results.push((clone.repository.clone(), outcome));
        }
        results
    }
}

fn diff_commit(repo: &Repository, previous_sha: &str, new_oid: git2::Oid) -> Option<(Option<String>, Option<String>, Vec<String>)> {
    let commit = repo.find_commit(new_oid).ok()?;
    let author = commit.author().name().map(str::to_string);
    let message = commit.message().map(|m| m.lines().next().unwrap_or(m).to_string());

    let new_tree = commit.tree().ok()?;
    let old_tree = git2::Oid::from_str(previous_sha).ok().and_then(|oid| repo.find_commit(oid).ok()).and_then(|c| c.tree().ok());
    let diff = repo.diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), None).ok()?;
    let mut files_changed = Vec::new();
    let _ = diff.foreach(
        &mut |delta, _| {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                files_changed.push(path.to_string_lossy().into_owned());
            }
            true
        },
        None,
        None,
        None,
    );
    Some((author, message, files_changed))
}

fn poll_repository(clone: &TrackedClone, state: &mut RepoState) -> Result<Vec<RepositoryEvent>, DevOpsError> {
    let repo = Repository::open(&clone.path).map_err(|e| DevOpsError::permanent_io(format!("failed to open {:?}: {e}", clone.path)))?;
    let mut events = Vec::new();
    let is_tracked = |name: &str| clone.tracked_branches.is_empty() || clone.tracked_branches.iter().any(|b| b == name);

    let mut current_heads = HashMap::new();
    let branches = repo
        .branches(Some(git2::BranchType::Local))
        .map_err(|e| DevOpsError::permanent_io(format!("failed to list branches: {e}")))?;

    for branch in branches.flatten() {
        let (branch, _) = branch;
        let Some(name) = branch.name().ok().flatten() else {
            continue;
        };
        if !is_tracked(name) {
            continue;
        }
        let Some(oid) = branch.get().target() else {
            continue;
        };
        let sha = oid.to_string();
        current_heads.insert(name.to_string(), sha.clone());

        match state.branch_heads.get(name) {
            None if state.baselined => {
                events.push(RepositoryEvent::new(
                    EventKind::BranchCreate,
                    clone.repository.clone(),
                    Some(name.to_string()),
                    Some(sha),
                    None,
                    Some(format!("branch '{name}' discovered")),
                    Vec::new(),
                    chrono::Utc::now(),
                ));
            }
            Some(previous) if previous != &sha => {
                let (author, message, files_changed) = diff_commit(&repo, previous, oid).unwrap_or_default();
                events.push(RepositoryEvent::new(
                    EventKind::Commit,
                    clone.repository.clone(),
                    Some(name.to_string()),
                    Some(sha),
                    author,
                    message.or_else(|| Some(format!("new commit on '{name}'"))),
                    files_changed,
                    chrono::Utc::now(),
                ));
            }
            _ => {}
        }
    }

    if state.baselined {
        for deleted in state.branch_heads.keys().filter(|k| is_tracked(k) && !current_heads.contains_key(*k)) {
            events.push(RepositoryEvent::new(
                EventKind::BranchDelete,
                clone.repository.clone(),
                Some(deleted.clone()),
                None,
                None,
                Some(format!("branch '{deleted}' deleted")),
                Vec::new(),
                chrono::Utc::now(),
            ));
        }
    }

    let mut current_tags = HashSet::new();
    if let Ok(tag_names) = repo.tag_names(None) {
        for tag in tag_names.iter().flatten() {
            current_tags.insert(tag.to_string());
        }
    }
    if state.baselined {
        for new_tag in current_tags.difference(&state.tags) {
            events.push(RepositoryEvent::new(
                EventKind::TagCreate,
                clone.repository.clone(),
                None,
                None,
                None,
                Some(format!("tag '{new_tag}' created")),
                Vec::new(),
                chrono::Utc::now(),
            ));
        }
        for removed_tag in state.tags.difference(&current_tags) {
            events.push(RepositoryEvent::new(
                EventKind::TagDelete,
                clone.repository.clone(),
                None,
                None,
                None,
                Some(format!("tag '{removed_tag}' deleted")),
                Vec::new(),
                chrono::Utc::now(),
            ));
        }
    }

    // Non-tracked branches are left out of `branch_heads` entirely, so a
    // later config change that starts tracking them announces them as
    // freshly discovered rather than silently backfilling history.
    for (name, sha) in &state.branch_heads {
        if !is_tracked(name) {
            current_heads.entry(name.clone()).or_insert_with(|| sha.clone());
        }
    }

    state.branch_heads = current_heads;
    state.tags = current_tags;
    state.baselined = true;
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tracked_set_polls_cleanly() {
        let mut poller = RepositoryPoller::new(Vec::new(), None);
        assert!(poller.poll_once().is_empty());
    }

    #[test]
    fn first_tick_establishes_a_baseline_without_events() {
        let mut state = RepoState::default();
        assert!(!state.baselined);
        state.branch_heads.insert("main".to_string(), "abc".to_string());
        state.baselined = true;
        // A repeat load of the same state must not look like a fresh process.
        assert!(state.baselined);
    }
}
