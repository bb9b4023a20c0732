//! Executes run tickets against a simulation backend.

use std::time::Instant;

use es_client::{ClientError, CustomRequest, PresetRequest, SimulationBackend};
use es_core::{SimulationJob, SimulationMode};
use es_results::{
    BatchAggregate, BatchResultEntry, NewSimulationRecord, SimulationRecord, SimulationResponse,
    aggregate_batch,
};
use es_wizard::{RunPlan, RunTicket, fingerprint_plan};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::history_service::{HistoryBackend, record_for_outcome};
use crate::progress::{JobProgress, RunProgressEvent, RunStage};
use crate::session::SessionContext;

/// How a batch treats failed jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchFailurePolicy {
    /// The first failed job fails the whole run.
    #[default]
    AllOrNothing,
    /// Successful jobs are kept and failures reported alongside them.
    CollectPartial,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub failure_policy: BatchFailurePolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobFailure {
    pub job: SimulationJob,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutput {
    Single(SimulationResponse),
    Batch {
        /// In job order.
        entries: Vec<BatchResultEntry>,
        aggregate: BatchAggregate,
        failures: Vec<JobFailure>,
    },
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub ticket: RunTicket,
    pub output: RunOutput,
    pub elapsed_wall_s: f64,
}

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(RunProgressEvent)>;

fn emit_progress(
    progress_cb: &mut ProgressCallback<'_>,
    mode: SimulationMode,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    jobs: Option<JobProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            mode,
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            jobs,
        });
    }
}

pub async fn execute_run<B: SimulationBackend>(
    backend: &B,
    ticket: &RunTicket,
    options: &RunOptions,
) -> AppResult<RunOutcome> {
    execute_run_with_progress(backend, ticket, options, None).await
}

/// Runs the ticket and streams progress events to `progress_cb`.
pub async fn execute_run_with_progress<B: SimulationBackend>(
    backend: &B,
    ticket: &RunTicket,
    options: &RunOptions,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<RunOutcome> {
    let started = Instant::now();
    let outcome = run_ticket(backend, ticket, options, &mut progress_cb, started).await?;
    emit_progress(
        &mut progress_cb,
        ticket.plan.mode(),
        RunStage::Completed,
        started,
        None,
        None,
    );
    Ok(outcome)
}

/// Runs the ticket and records the outcome in history. A failed save is
/// logged and returned next to the outcome; it never fails the run.
pub async fn run_and_save<B: SimulationBackend>(
    backend: &B,
    history: &HistoryBackend,
    session: &SessionContext,
    ticket: &RunTicket,
    options: &RunOptions,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<(RunOutcome, Option<AppResult<SimulationRecord>>)> {
    let started = Instant::now();
    let mode = ticket.plan.mode();
    let outcome = run_ticket(backend, ticket, options, &mut progress_cb, started).await?;

    let saved = match record_for_outcome(&outcome) {
        Ok(Some(record)) => {
            emit_progress(&mut progress_cb, mode, RunStage::SavingHistory, started, None, None);
            Some(save_record(history, session, record).await)
        }
        Ok(None) => None,
        Err(err) => {
            warn!(%err, "failed to build history record");
            Some(Err(err))
        }
    };

    emit_progress(&mut progress_cb, mode, RunStage::Completed, started, None, None);
    Ok((outcome, saved))
}

async fn save_record(
    history: &HistoryBackend,
    session: &SessionContext,
    record: NewSimulationRecord,
) -> AppResult<SimulationRecord> {
    let result = history.save(session, record).await;
    if let Err(err) = &result {
        warn!(%err, "failed to save simulation");
    }
    result
}

async fn run_ticket<B: SimulationBackend>(
    backend: &B,
    ticket: &RunTicket,
    options: &RunOptions,
    progress_cb: &mut ProgressCallback<'_>,
    started: Instant,
) -> AppResult<RunOutcome> {
    let mode = ticket.plan.mode();
    emit_progress(progress_cb, mode, RunStage::Validating, started, None, None);
    let fingerprint = fingerprint_plan(&ticket.plan)
        .map_err(|err| AppError::InvalidInput(format!("run plan could not be encoded: {err}")))?;
    if fingerprint != ticket.fingerprint {
        return Err(AppError::InvalidInput(
            "run ticket does not match its plan".to_string(),
        ));
    }

    info!(
        mode = %mode,
        station = ticket.plan.weather_station(),
        jobs = ticket.plan.job_count(),
        "starting simulation run"
    );

    let output = match &ticket.plan {
        RunPlan::PreConfigured {
            weather_station,
            building_type,
            construction_period,
        } => {
            emit_progress(progress_cb, mode, RunStage::Submitting, started, None, None);
            let request = PresetRequest {
                weather_station: weather_station.clone(),
                construction_period: *construction_period,
                building_type: *building_type,
            };
            let response = backend
                .simulate(&request)
                .await
                .map_err(|err| AppError::Simulation(err.to_string()))?;
            RunOutput::Single(response)
        }
        RunPlan::RealTime {
            weather_station,
            building_type,
            parameters,
        } => {
            emit_progress(progress_cb, mode, RunStage::Submitting, started, None, None);
            let request = CustomRequest {
                weather_station: weather_station.clone(),
                parameters: *parameters,
                building_type: *building_type,
            };
            let response = backend
                .simulate_custom(&request)
                .await
                .map_err(|err| AppError::Simulation(err.to_string()))?;
            RunOutput::Single(response)
        }
        RunPlan::Batch {
            weather_station,
            jobs,
            ..
        } => {
            run_batch(
                backend,
                weather_station,
                jobs,
                options.failure_policy,
                progress_cb,
                started,
            )
            .await?
        }
    };

    let elapsed_wall_s = started.elapsed().as_secs_f64();
    info!(mode = %mode, elapsed_wall_s, "simulation run finished");
    Ok(RunOutcome {
        ticket: ticket.clone(),
        output,
        elapsed_wall_s,
    })
}

fn job_error_message(job: &SimulationJob, err: &ClientError) -> String {
    match err {
        ClientError::Http { .. } => format!(
            "Simulation failed for {} {}",
            job.building_type, job.period_id
        ),
        other => other.to_string(),
    }
}

async fn run_batch<B: SimulationBackend>(
    backend: &B,
    weather_station: &str,
    jobs: &[SimulationJob],
    policy: BatchFailurePolicy,
    progress_cb: &mut ProgressCallback<'_>,
    started: Instant,
) -> AppResult<RunOutput> {
    let mode = SimulationMode::Batch;
    emit_progress(
        progress_cb,
        mode,
        RunStage::Submitting,
        started,
        Some(format!("{} simulations", jobs.len())),
        None,
    );

    let mut pending: FuturesUnordered<_> = jobs
        .iter()
        .enumerate()
        .map(|(index, job)| {
            let request = PresetRequest {
                weather_station: weather_station.to_string(),
                construction_period: job.period_id,
                building_type: job.building_type,
            };
            async move { (index, *job, backend.simulate(&request).await) }
        })
        .collect();

    let mut progress = JobProgress {
        total: jobs.len(),
        ..JobProgress::default()
    };
    let mut settled: Vec<(usize, BatchResultEntry)> = Vec::with_capacity(jobs.len());
    let mut failures: Vec<(usize, JobFailure)> = Vec::new();

    while let Some((index, job, result)) = pending.next().await {
        match result {
            Ok(response) => {
                progress.completed += 1;
                settled.push((
                    index,
                    BatchResultEntry {
                        building_type: job.building_type,
                        period_id: job.period_id,
                        count: job.count,
                        annual: response.annual,
                        hourly: response.hourly,
                    },
                ));
            }
            Err(err) => {
                progress.failed += 1;
                let message = job_error_message(&job, &err);
                warn!(
                    building_type = %job.building_type,
                    period = %job.period_id,
                    %err,
                    "batch job failed"
                );
                if policy == BatchFailurePolicy::AllOrNothing {
                    // Dropping the set abandons the requests still in flight.
                    return Err(AppError::Simulation(message));
                }
                failures.push((index, JobFailure { job, message }));
            }
        }
        progress.last = Some(job);
        emit_progress(
            progress_cb,
            mode,
            RunStage::AwaitingJobs,
            started,
            None,
            Some(progress.clone()),
        );
    }

    if settled.is_empty()
        && let Some((_, first)) = failures.iter().min_by_key(|(index, _)| *index)
    {
        return Err(AppError::Simulation(first.message.clone()));
    }

    emit_progress(progress_cb, mode, RunStage::Aggregating, started, None, None);
    settled.sort_by_key(|(index, _)| *index);
    failures.sort_by_key(|(index, _)| *index);
    let entries: Vec<BatchResultEntry> = settled.into_iter().map(|(_, entry)| entry).collect();
    let aggregate = aggregate_batch(&entries);

    Ok(RunOutput::Batch {
        entries,
        aggregate,
        failures: failures.into_iter().map(|(_, failure)| failure).collect(),
    })
}
