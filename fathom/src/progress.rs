//! Progress tracking and event bus for one or more running jobs.
//!
//! Mirrors the shape of the adapter runtime's registries: one struct per
//! job (`ProgressTracker`), looked up through an owning `ProgressManager`
//! keyed by job id. Subscribers get a bounded `tokio::sync::broadcast`
//! channel rather than a direct callback, decoupling a slow or absent
//! listener from the scheduler emitting the events.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use fathom_types::{JobStatus, ModuleId, WaveStatus};
use tokio::sync::broadcast;

/// Bounded so a slow or absent subscriber can never make a job's progress
/// updates back up into the scheduler.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default retention window for a completed tracker before `gc` reclaims it.
pub const DEFAULT_RETENTION_SECONDS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleProgressState {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ModuleProgress {
    pub module_id: ModuleId,
    pub state: ModuleProgressState,
    pub wave: u8,
}

#[derive(Debug, Clone)]
pub struct WaveProgress {
    pub wave_number: u8,
    pub status: Option<WaveStatus>,
    pub module_ids: Vec<ModuleId>,
}

/// Event payload broadcast on every state transition. `overall_percent` is
/// recomputed fresh on every event rather than cached, since the tracker
/// already holds everything needed to derive it.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub event: &'static str,
    pub job_id: uuid::Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub overall_percent: f64,
    pub detail: String,
}

struct TrackerState {
    domain: String,
    status: JobStatus,
    current_wave: u8,
    total_modules: usize,
    modules: HashMap<ModuleId, ModuleProgress>,
    waves: HashMap<u8, WaveProgress>,
    queued_at: chrono::DateTime<chrono::Utc>,
    started_at: Instant,
    completed_at: Option<Instant>,
    critical_errors: Vec<String>,
}

impl TrackerState {
    fn completed_count(&self) -> usize {
        self.modules
            .values()
            .filter(|m| matches!(m.state, ModuleProgressState::Completed | ModuleProgressState::Failed))
            .count()
    }

    fn overall_percent(&self) -> f64 {
        if self.total_modules == 0 {
            return 100.0;
        }
        100.0 * self.completed_count() as f64 / self.total_modules as f64
    }

    fn elapsed_seconds(&self) -> f64 {
        self.completed_at
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.started_at)
            .as_secs_f64()
    }

    /// Linear extrapolation from progress so far; falls back to an upfront
    /// estimate of 8 seconds per remaining module when nothing has
    /// completed yet.
    fn estimated_remaining_seconds(&self) -> f64 {
        let progress = self.overall_percent() / 100.0;
        if progress > 0.0 {
            (self.elapsed_seconds() / progress - self.elapsed_seconds()).max(0.0)
        } else {
            let remaining = self.total_modules.saturating_sub(self.completed_count());
            remaining as f64 * 8.0
        }
    }
}

/// One job's progress state plus its event channel. Cheap to clone the
/// `Arc` wrapper; the inner state is mutex-guarded and never held across an
/// await point.
pub struct ProgressTracker {
    job_id: uuid::Uuid,
    state: Mutex<TrackerState>,
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(job_id: uuid::Uuid, domain: impl Into<String>, total_modules: usize) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            job_id,
            state: Mutex::new(TrackerState {
                domain: domain.into(),
                status: JobStatus::Queued,
                current_wave: 0,
                total_modules,
                modules: HashMap::new(),
                waves: HashMap::new(),
                queued_at: chrono::Utc::now(),
                started_at: Instant::now(),
                completed_at: None,
                critical_errors: Vec::new(),
            }),
            sender,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    fn emit(&self, event: &'static str, detail: impl Into<String>) {
        let (overall_percent, timestamp) = {
            let state = self.state.lock().expect("progress mutex poisoned");
            (state.overall_percent(), chrono::Utc::now())
        };
        // A full mailbox just means no subscriber is listening; dropping
        // the event is fine, the tracker itself is the source of truth.
        let _ = self.sender.send(ProgressEvent {
            event,
            job_id: self.job_id,
            timestamp,
            overall_percent,
            detail: detail.into(),
        });
    }

    pub fn job_started(&self, wave_count: usize) {
        let mut state = self.state.lock().expect("progress mutex poisoned");
        state.status = JobStatus::Running;
        state.started_at = Instant::now();
        drop(state);
        self.emit("job_start", format!("{wave_count} waves planned"));
    }

    pub fn wave_started(&self, wave_number: u8, module_ids: &[ModuleId]) {
        {
            let mut state = self.state.lock().expect("progress mutex poisoned");
            state.current_wave = wave_number;
            for &id in module_ids {
                state.modules.insert(
                    id,
                    ModuleProgress {
                        module_id: id,
                        state: ModuleProgressState::Running,
                        wave: wave_number,
                    },
                );
            }
            state.waves.insert(
                wave_number,
                WaveProgress {
                    wave_number,
                    status: None,
                    module_ids: module_ids.to_vec(),
                },
            );
        }
        self.emit("wave_start", format!("wave {wave_number}"));
    }

    pub fn module_completed(&self, module_id: ModuleId, succeeded: bool) {
        {
            let mut state = self.state.lock().expect("progress mutex poisoned");
            let wave = state.current_wave;
            state.modules.insert(
                module_id,
                ModuleProgress {
                    module_id,
                    state: if succeeded {
                        ModuleProgressState::Completed
                    } else {
                        ModuleProgressState::Failed
                    },
                    wave,
                },
            );
        }
        self.emit(
            if succeeded { "module_complete" } else { "error" },
            module_id.slug().to_string(),
        );
    }

    pub fn wave_completed(&self, wave_number: u8, status: WaveStatus) {
        {
            let mut state = self.state.lock().expect("progress mutex poisoned");
            if let Some(wave) = state.waves.get_mut(&wave_number) {
                wave.status = Some(status);
            }
        }
        self.emit("wave_complete", format!("wave {wave_number}: {status:?}"));
    }

    pub fn job_completed(&self, status: JobStatus) {
        {
            let mut state = self.state.lock().expect("progress mutex poisoned");
            state.status = status;
            state.completed_at = Some(Instant::now());
        }
        self.emit("job_complete", format!("{status:?}"));
    }

    pub fn record_critical_error(&self, message: impl Into<String>) {
        let message = message.into();
        {
            let mut state = self.state.lock().expect("progress mutex poisoned");
            state.critical_errors.push(message.clone());
        }
        self.emit("error", message);
    }

    /// Snapshot the current state into the wire-shaped `JobProgress`.
    #[must_use]
    pub fn snapshot(&self) -> JobProgress {
        let state = self.state.lock().expect("progress mutex poisoned");
        JobProgress {
            job_id: self.job_id,
            domain: state.domain.clone(),
            status: state.status,
            current_wave: state.current_wave,
            modules: state.modules.clone(),
            waves: state.waves.clone(),
            queued_at: state.queued_at,
            overall_percent: state.overall_percent(),
            elapsed_seconds: state.elapsed_seconds(),
            estimated_remaining_seconds: state.estimated_remaining_seconds(),
            critical_errors: state.critical_errors.clone(),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state.lock().expect("progress mutex poisoned").status,
            JobStatus::Completed | JobStatus::Partial | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    fn age_since_completion(&self) -> Option<std::time::Duration> {
        self.state
            .lock()
            .expect("progress mutex poisoned")
            .completed_at
            .map(|at| at.elapsed())
    }
}

/// Wire-shaped read-only view of a job's progress, returned by
/// `ProgressManager::get` and carried in `event_stream` updates.
#[derive(Debug, Clone)]
pub struct JobProgress {
    pub job_id: uuid::Uuid,
    pub domain: String,
    pub status: JobStatus,
    pub current_wave: u8,
    pub modules: HashMap<ModuleId, ModuleProgress>,
    pub waves: HashMap<u8, WaveProgress>,
    pub queued_at: chrono::DateTime<chrono::Utc>,
    pub overall_percent: f64,
    pub elapsed_seconds: f64,
    pub estimated_remaining_seconds: f64,
    pub critical_errors: Vec<String>,
}

/// Owns every in-flight and recently-completed tracker, keyed by job id.
/// `gc` drops trackers whose job completed more than `retention_seconds`
/// ago; callers typically run it on a timer alongside batch dispatch.
#[derive(Default)]
pub struct ProgressManager {
    trackers: Mutex<HashMap<uuid::Uuid, std::sync::Arc<ProgressTracker>>>,
}

impl ProgressManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tracker: std::sync::Arc<ProgressTracker>) {
        self.trackers
            .lock()
            .expect("progress manager mutex poisoned")
            .insert(tracker.job_id, tracker);
    }

    #[must_use]
    pub fn get(&self, job_id: uuid::Uuid) -> Option<JobProgress> {
        self.trackers
            .lock()
            .expect("progress manager mutex poisoned")
            .get(&job_id)
            .map(|t| t.snapshot())
    }

    #[must_use]
    pub fn tracker(&self, job_id: uuid::Uuid) -> Option<std::sync::Arc<ProgressTracker>> {
        self.trackers
            .lock()
            .expect("progress manager mutex poisoned")
            .get(&job_id)
            .cloned()
    }

    #[must_use]
    pub fn active_job_ids(&self) -> Vec<uuid::Uuid> {
        self.trackers
            .lock()
            .expect("progress manager mutex poisoned")
            .iter()
            .filter(|(_, t)| !t.is_terminal())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Drop any terminal tracker whose job completed more than
    /// `retention_seconds` ago. Returns the number reclaimed.
    pub fn gc(&self, retention_seconds: u64) -> usize {
        let retention = std::time::Duration::from_secs(retention_seconds);
        let mut trackers = self.trackers.lock().expect("progress manager mutex poisoned");
        let before = trackers.len();
        trackers.retain(|_, t| {
            !t.is_terminal() || t.age_since_completion().is_none_or(|age| age < retention)
        });
        before - trackers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_percent_reflects_completed_and_failed_modules() {
        let tracker = ProgressTracker::new(uuid::Uuid::new_v4(), "example.com", 4);
        tracker.job_started(1);
        tracker.wave_started(1, &[ModuleId::M01CompanyContext, ModuleId::M02TechnologyStack]);
        tracker.module_completed(ModuleId::M01CompanyContext, true);
        tracker.module_completed(ModuleId::M02TechnologyStack, false);
        let snapshot = tracker.snapshot();
        assert!((snapshot.overall_percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gc_reclaims_only_old_terminal_trackers() {
        let manager = ProgressManager::new();
        let tracker = std::sync::Arc::new(ProgressTracker::new(uuid::Uuid::new_v4(), "example.com", 1));
        tracker.job_started(1);
        tracker.job_completed(JobStatus::Completed);
        manager.register(tracker);
        assert_eq!(manager.gc(3600), 0, "freshly completed tracker must survive a long retention window");
        assert_eq!(manager.gc(0), 1, "a zero retention window reclaims it immediately");
    }

    #[tokio::test]
    async fn subscribers_receive_job_lifecycle_events() {
        let tracker = ProgressTracker::new(uuid::Uuid::new_v4(), "example.com", 1);
        let mut rx = tracker.subscribe();
        tracker.job_started(1);
        let event = rx.recv().await.expect("channel open");
        assert_eq!(event.event, "job_start");
    }
}
