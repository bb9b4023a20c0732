use es_core::{SimulationJob, SimulationMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Validating,
    Submitting,
    /// Batch requests are in flight; carries per-job counts.
    AwaitingJobs,
    Aggregating,
    SavingHistory,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobProgress {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    /// Job whose request just settled.
    pub last: Option<SimulationJob>,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub mode: SimulationMode,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub jobs: Option<JobProgress>,
}
