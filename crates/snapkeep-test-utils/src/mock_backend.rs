// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory backend for deterministic testing.
//!
//! `MockBackend` implements `AuthProvider`, `SnapshotStore` and
//! `JobStatusService` over a snapshot map, a scripted sequence of job states
//! and a set of injectable failures. Every call is counted.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use snapkeep_core::{
    AccessToken, AuthProvider, Credentials, DatabaseId, Job, JobId, JobState, JobStatusService,
    Snapshot, SnapkeepError, SnapshotId, SnapshotStore,
};

const MOCK_TOKEN: &str = "mock-token";

/// First id handed out to snapshots created through [`SnapshotStore::create`].
const FIRST_CREATED_ID: u64 = 1000;

#[derive(Default)]
struct State {
    snapshots: HashMap<DatabaseId, Vec<Snapshot>>,
    job_script: VecDeque<JobState>,
    last_job_state: Option<JobState>,
    deleted: Vec<SnapshotId>,
    next_id: u64,
    fail_list: Option<String>,
    fail_status: Option<String>,
    fail_create: Option<String>,
    fail_delete_after: Option<(usize, String)>,
    remove_after_list: Option<(usize, SnapshotId)>,
    reject_auth: bool,
}

#[derive(Default)]
struct Calls {
    auth: AtomicUsize,
    list: AtomicUsize,
    create: AtomicUsize,
    delete: AtomicUsize,
    status: AtomicUsize,
}

/// A scriptable backend holding snapshots in memory.
///
/// Job status checks pop states from the script given to
/// [`with_job_states`](Self::with_job_states). Once the script is exhausted the
/// last state is repeated, or `running` if the script was empty.
pub struct MockBackend {
    state: Mutex<State>,
    calls: Calls,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: FIRST_CREATED_ID,
                ..State::default()
            }),
            calls: Calls::default(),
        }
    }

    /// Replaces the snapshots of `database`, kept in the given (backend) order.
    pub fn with_snapshots(mut self, database: DatabaseId, snapshots: Vec<Snapshot>) -> Self {
        self.state_mut().snapshots.insert(database, snapshots);
        self
    }

    pub fn with_job_states(mut self, states: Vec<JobState>) -> Self {
        self.state_mut().job_script = states.into();
        self
    }

    /// Every listing fails with a remote error carrying `code`.
    pub fn fail_list(mut self, code: &str) -> Self {
        self.state_mut().fail_list = Some(code.to_string());
        self
    }

    pub fn fail_status(mut self, code: &str) -> Self {
        self.state_mut().fail_status = Some(code.to_string());
        self
    }

    pub fn fail_create(mut self, code: &str) -> Self {
        self.state_mut().fail_create = Some(code.to_string());
        self
    }

    /// The first `succeeding` deletions go through; every later one fails with `code`.
    pub fn fail_delete_after(mut self, succeeding: usize, code: &str) -> Self {
        self.state_mut().fail_delete_after = Some((succeeding, code.to_string()));
        self
    }

    /// Removes `snapshot` behind the caller's back right after the `nth` listing.
    pub fn remove_after_list(mut self, nth: usize, snapshot: SnapshotId) -> Self {
        self.state_mut().remove_after_list = Some((nth, snapshot));
        self
    }

    pub fn reject_auth(mut self) -> Self {
        self.state_mut().reject_auth = true;
        self
    }

    /// The token this backend hands out and accepts.
    pub fn token(&self) -> AccessToken {
        AccessToken::new(MOCK_TOKEN)
    }

    pub fn auth_calls(&self) -> usize {
        self.calls.auth.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.calls.list.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.calls.create.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.calls.delete.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.calls.status.load(Ordering::SeqCst)
    }

    /// Ids of successfully deleted snapshots, in deletion order.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.lock().deleted.iter().map(|id| id.0.clone()).collect()
    }

    /// Current snapshots of `database`, in backend order.
    pub fn snapshots(&self, database: &DatabaseId) -> Vec<Snapshot> {
        self.lock().snapshots.get(database).cloned().unwrap_or_default()
    }

    pub fn snapshot_count(&self, database: &DatabaseId) -> usize {
        self.lock().snapshots.get(database).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut State {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_token(token: &AccessToken) -> Result<(), SnapkeepError> {
        if token.expose() == MOCK_TOKEN {
            Ok(())
        } else {
            Err(SnapkeepError::Auth {
                message: "token rejected by mock backend".to_string(),
            })
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn remote(code: &str) -> SnapkeepError {
    SnapkeepError::Remote {
        code: code.to_string(),
        detail: "injected by mock backend".to_string(),
    }
}

#[async_trait]
impl AuthProvider for MockBackend {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<AccessToken, SnapkeepError> {
        self.calls.auth.fetch_add(1, Ordering::SeqCst);
        if self.lock().reject_auth {
            return Err(SnapkeepError::Auth {
                message: "invalid credentials".to_string(),
            });
        }
        Ok(self.token())
    }
}

#[async_trait]
impl SnapshotStore for MockBackend {
    async fn list(
        &self,
        token: &AccessToken,
        database: &DatabaseId,
    ) -> Result<Vec<Snapshot>, SnapkeepError> {
        let nth = self.calls.list.fetch_add(1, Ordering::SeqCst) + 1;
        Self::check_token(token)?;
        let mut state = self.lock();
        if let Some(code) = &state.fail_list {
            return Err(remote(code));
        }
        let listed = state.snapshots.get(database).cloned().unwrap_or_default();

        if let Some((after, id)) = state.remove_after_list.clone()
            && after == nth
        {
            for snapshots in state.snapshots.values_mut() {
                snapshots.retain(|s| s.id != id);
            }
        }
        Ok(listed)
    }

    async fn create(
        &self,
        token: &AccessToken,
        database: &DatabaseId,
        name: &str,
    ) -> Result<Job, SnapkeepError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        Self::check_token(token)?;
        let mut state = self.lock();
        if let Some(code) = &state.fail_create {
            return Err(remote(code));
        }
        let id = state.next_id;
        state.next_id += 1;
        state
            .snapshots
            .entry(database.clone())
            .or_default()
            .push(Snapshot {
                id: SnapshotId::from(id),
                name: name.to_string(),
                created_at: Utc::now(),
            });
        Ok(Job::new(format!("job-{id}"), JobState::Pending))
    }

    async fn delete(
        &self,
        token: &AccessToken,
        snapshot: &SnapshotId,
    ) -> Result<(), SnapkeepError> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        Self::check_token(token)?;
        let mut state = self.lock();
        if let Some((succeeding, code)) = &state.fail_delete_after
            && state.deleted.len() >= *succeeding
        {
            return Err(remote(code));
        }

        let mut found = false;
        for snapshots in state.snapshots.values_mut() {
            let before = snapshots.len();
            snapshots.retain(|s| &s.id != snapshot);
            found |= snapshots.len() != before;
        }
        if !found {
            return Err(remote("ERROR_SNAPSHOT_DOES_NOT_EXIST"));
        }
        state.deleted.push(snapshot.clone());
        Ok(())
    }
}

#[async_trait]
impl JobStatusService for MockBackend {
    async fn status(&self, token: &AccessToken, job: &JobId) -> Result<Job, SnapkeepError> {
        self.calls.status.fetch_add(1, Ordering::SeqCst);
        Self::check_token(token)?;
        let mut state = self.lock();
        if let Some(code) = &state.fail_status {
            return Err(remote(code));
        }
        let next = state
            .job_script
            .pop_front()
            .or(state.last_job_state)
            .unwrap_or(JobState::Running);
        state.last_job_state = Some(next);

        let mut status = Job::new(job.clone(), next);
        if next == JobState::Finished {
            status.progress_percentage = Some(100);
        }
        Ok(status)
    }
}
