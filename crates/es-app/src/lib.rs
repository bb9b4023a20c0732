//! Shared service layer for energysim front ends.
//!
//! Runs wizard tickets against a simulation backend, keeps the user session
//! explicit, and persists completed runs to the hosted row store or a local
//! history directory.

pub mod config;
pub mod error;
pub mod feedback_service;
pub mod history_service;
pub mod progress;
pub mod run_service;
pub mod session;

pub use config::{AppConfig, HostedBackendConfig};
pub use error::{AppError, AppResult};
pub use feedback_service::{FeedbackDraft, submit_feedback};
pub use history_service::{HistoryBackend, LOCAL_USER_ID, record_for_outcome};
pub use progress::{JobProgress, RunProgressEvent, RunStage};
pub use run_service::{
    BatchFailurePolicy, JobFailure, RunOptions, RunOutcome, RunOutput, execute_run,
    execute_run_with_progress, run_and_save,
};
pub use session::SessionContext;
