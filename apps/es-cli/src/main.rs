use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use es_app::{
    AppConfig, AppError, AppResult, BatchFailurePolicy, FeedbackDraft, HistoryBackend,
    RunOptions, RunOutcome, RunOutput, RunProgressEvent, RunStage, SessionContext,
    execute_run_with_progress, run_and_save, submit_feedback,
};
use es_client::{AuthClient, HttpSimulationClient, RowStoreClient, SimulationBackend};
use es_core::{
    BuildingType, ConstructionPeriod, CustomParameters, SWEDEN_COUNTIES, VentilationType,
    WindowType, design_parameters, round_half_up, summarize_allocation, to_fixed,
};
use es_results::export::{
    SingleRunKind, SingleRunReport, batch_csv, record_csv, record_file_name, single_run_csv,
};
use es_results::series::monthly_energy;
use es_results::{AnnualResult, HourlyPowerData};
use es_wizard::{RunPlan, RunTicket, StepTransition, WizardState, load_allocation};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

#[derive(Parser)]
#[command(name = "energysim")]
#[command(about = "Building energy simulation for Swedish climates", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List weather stations grouped by county
    Stations,
    /// List construction periods
    Periods,
    /// Show the locked design parameters of an archetype
    Params {
        building_type: BuildingType,
        period: ConstructionPeriod,
    },
    /// Check that the simulation service is up
    Health,
    /// Show what the simulation service has cached
    CacheStats,
    /// Run a simulation
    #[command(subcommand)]
    Run(RunCommands),
    /// Saved simulations
    #[command(subcommand)]
    History(HistoryCommands),
    /// Account management
    #[command(subcommand)]
    Auth(AuthCommands),
    /// Send feedback
    Feedback {
        /// 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long, default_value = "")]
        message: String,
        #[arg(long, default_value = "cli")]
        page: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Weather station id (see `stations`)
    #[arg(long, default_value = es_core::DEFAULT_STATION)]
    station: String,
    /// Write the CSV report to this path
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Do not save the result to history
    #[arg(long)]
    no_save: bool,
}

#[derive(Subcommand)]
enum RunCommands {
    /// Pre-configured archetype
    Preset {
        building_type: BuildingType,
        period: ConstructionPeriod,
        #[command(flatten)]
        common: RunArgs,
    },
    /// Custom envelope parameters; unset values take the typology defaults
    Custom {
        building_type: BuildingType,
        #[arg(long)]
        wall_u: Option<f64>,
        #[arg(long)]
        attic_u: Option<f64>,
        #[arg(long)]
        ground_u: Option<f64>,
        #[arg(long)]
        ach: Option<f64>,
        #[arg(long)]
        window: Option<WindowType>,
        /// Window-to-wall ratio in percent
        #[arg(long)]
        wwr: Option<u32>,
        #[arg(long)]
        ventilation: Option<VentilationType>,
        #[arg(long)]
        floor_area: Option<f64>,
        #[arg(long)]
        floors: Option<u32>,
        #[command(flatten)]
        common: RunArgs,
    },
    /// Mixed stock from an allocation file (YAML or JSON)
    Batch {
        allocation_path: PathBuf,
        /// Keep successful jobs when some fail
        #[arg(long)]
        partial: bool,
        #[command(flatten)]
        common: RunArgs,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List saved simulations
    List,
    /// Show one saved simulation
    Show { id: String },
    /// Delete a saved simulation
    Delete { id: String },
    /// Export a saved simulation as CSV
    Export {
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    Signup {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    Signin {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Confirm an account with the emailed code
    Verify { email: String, code: String },
    /// Send the confirmation code again
    Resend { email: String },
    Whoami,
    Signout,
}

/// Everything a command needs, built once from the config.
struct CliEnv {
    config: AppConfig,
    session: SessionContext,
}

impl CliEnv {
    fn load(config_path: Option<&Path>) -> AppResult<Self> {
        let config = match config_path {
            Some(path) => {
                AppConfig::load_from(path)?.with_overrides(|key| std::env::var(key).ok())
            }
            None => AppConfig::load()?,
        };
        let session = SessionContext::restore(&config.session_file());
        Ok(Self { config, session })
    }

    fn simulation_client(&self) -> AppResult<HttpSimulationClient> {
        Ok(HttpSimulationClient::new(
            &self.config.api_url,
            self.config.request_timeout(),
        )?)
    }

    fn hosted(&self) -> AppResult<&es_app::HostedBackendConfig> {
        self.config.backend.as_ref().ok_or_else(|| {
            AppError::InvalidInput(
                "no hosted backend configured (set ENERGYSIM_BACKEND_URL and ENERGYSIM_BACKEND_KEY)"
                    .to_string(),
            )
        })
    }

    fn auth_client(&self) -> AppResult<AuthClient> {
        let hosted = self.hosted()?;
        Ok(AuthClient::new(
            &hosted.url,
            &hosted.anon_key,
            self.config.request_timeout(),
        )?)
    }

    fn row_client(&self) -> AppResult<RowStoreClient> {
        let hosted = self.hosted()?;
        Ok(RowStoreClient::new(
            &hosted.url,
            &hosted.anon_key,
            self.config.request_timeout(),
        )?)
    }

    fn history(&self) -> AppResult<HistoryBackend> {
        HistoryBackend::from_config(&self.config)
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut env = CliEnv::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Stations => cmd_stations(),
        Commands::Periods => cmd_periods(),
        Commands::Params {
            building_type,
            period,
        } => cmd_params(building_type, period),
        Commands::Health => cmd_health(&env).await,
        Commands::CacheStats => cmd_cache_stats(&env).await,
        Commands::Run(run_cmd) => match run_cmd {
            RunCommands::Preset {
                building_type,
                period,
                common,
            } => {
                let mut state = WizardState::new();
                state.set_building_type(building_type);
                state.set_weather_station(common.station.clone());
                state.set_construction_period(period);
                cmd_run(&env, state, &common, RunOptions::default()).await
            }
            RunCommands::Custom {
                building_type,
                wall_u,
                attic_u,
                ground_u,
                ach,
                window,
                wwr,
                ventilation,
                floor_area,
                floors,
                common,
            } => {
                let mut params = CustomParameters::defaults_for(building_type);
                params.wall_u = wall_u.unwrap_or(params.wall_u);
                params.attic_u = attic_u.unwrap_or(params.attic_u);
                params.ground_u = ground_u.unwrap_or(params.ground_u);
                params.ach = ach.unwrap_or(params.ach);
                params.window_type = window.unwrap_or(params.window_type);
                params.wwr = wwr.unwrap_or(params.wwr);
                params.ventilation_type = ventilation.unwrap_or(params.ventilation_type);
                params.heated_floor_area = floor_area.unwrap_or(params.heated_floor_area);
                params.number_of_floors = floors.unwrap_or(params.number_of_floors);
                println!(
                    "Estimated window area: {:.1} m² at {}% WWR",
                    params.estimated_window_area(building_type, params.wwr),
                    params.wwr
                );

                let mut state = WizardState::new();
                state.set_mode(es_core::SimulationMode::RealTime);
                state.set_building_type(building_type);
                state.set_weather_station(common.station.clone());
                state.set_custom_parameters(params);
                cmd_run(&env, state, &common, RunOptions::default()).await
            }
            RunCommands::Batch {
                allocation_path,
                partial,
                common,
            } => {
                let allocation = load_allocation(&allocation_path)?;
                let mut state = WizardState::new();
                state.load_batch(allocation)?;
                state.set_weather_station(common.station.clone());
                let options = RunOptions {
                    failure_policy: if partial {
                        BatchFailurePolicy::CollectPartial
                    } else {
                        BatchFailurePolicy::AllOrNothing
                    },
                };
                cmd_run(&env, state, &common, options).await
            }
        },
        Commands::History(history_cmd) => match history_cmd {
            HistoryCommands::List => cmd_history_list(&env).await,
            HistoryCommands::Show { id } => cmd_history_show(&env, &id).await,
            HistoryCommands::Delete { id } => cmd_history_delete(&env, &id).await,
            HistoryCommands::Export { id, output } => {
                cmd_history_export(&env, &id, output.as_deref()).await
            }
        },
        Commands::Auth(auth_cmd) => cmd_auth(&mut env, auth_cmd).await,
        Commands::Feedback {
            rating,
            message,
            page,
        } => {
            let draft = FeedbackDraft {
                rating,
                message,
                page,
            };
            submit_feedback(&env.row_client()?, &env.session, &draft).await?;
            println!("✓ Thank you for your feedback");
            Ok(())
        }
    }
}

fn cmd_stations() -> AppResult<()> {
    for county in SWEDEN_COUNTIES {
        println!("{} ({})", county.name, county.code);
        for station in county.stations {
            println!("  {:<28} {}", station.id, station.name);
        }
    }
    Ok(())
}

fn cmd_periods() -> AppResult<()> {
    for period in ConstructionPeriod::ALL {
        println!("  {:<12} {}", period.id(), period.label());
    }
    Ok(())
}

fn cmd_params(building_type: BuildingType, period: ConstructionPeriod) -> AppResult<()> {
    building_type.ensure_available()?;
    let p = design_parameters(building_type, period);
    println!("{} ({})", building_type.label(), period.label());
    println!("  Wall U-value:        {:.2} W/m²K", p.wall_u);
    println!("  Attic U-value:       {:.2} W/m²K", p.attic_u);
    println!("  Ground slab U-value: {:.2} W/m²K", p.ground_slab_u);
    println!("  Window U-value:      {:.2} W/m²K", p.window_u);
    println!("  Infiltration:        {:.2} ACH", p.infiltration_ach);
    println!("  Floor area:          {} m²", p.floor_area_m2);
    println!("  Floors:              {}", p.number_of_floors);
    println!("  Window area:         {} m²", p.window_area_m2);
    Ok(())
}

async fn cmd_health(env: &CliEnv) -> AppResult<()> {
    let client = env.simulation_client()?;
    let health = client.health().await?;
    if health.is_ready() {
        println!("✓ Simulation service is running ({})", client.base_url());
    } else {
        println!(
            "Simulation service at {} is not ready: status={} energyplus={}",
            client.base_url(),
            health.status,
            health.energyplus
        );
    }
    Ok(())
}

async fn cmd_cache_stats(env: &CliEnv) -> AppResult<()> {
    let stats = env.simulation_client()?.cache_stats().await?;
    println!("Cached simulations: {}", stats.total_cached);
    for entry in &stats.entries {
        println!("  {} {} {}", entry.station, entry.building_type, entry.period);
    }
    Ok(())
}

/// Walks the wizard forward until it hands out a run ticket.
fn advance_to_run(state: &mut WizardState) -> AppResult<RunTicket> {
    loop {
        match state.next_step()? {
            StepTransition::Advanced(step) => debug!(step = %step, "wizard advanced"),
            StepTransition::Run(ticket) => return Ok(ticket),
            StepTransition::Stayed(step) => {
                return Err(AppError::InvalidInput(format!(
                    "wizard cannot advance past {step}"
                )));
            }
        }
    }
}

async fn cmd_run(
    env: &CliEnv,
    mut state: WizardState,
    args: &RunArgs,
    options: RunOptions,
) -> AppResult<()> {
    let ticket = advance_to_run(&mut state)?;
    let backend = env.simulation_client()?;
    let station = ticket.plan.weather_station();
    println!(
        "Running {} simulation at {} ({})",
        ticket.plan.mode(),
        es_core::station_name(station),
        es_core::county_of(station)
    );

    let mut last_emit = Instant::now();
    let mut last_stage: Option<RunStage> = None;
    let mut render = |event: RunProgressEvent| {
        let emit_now = last_stage != Some(event.stage)
            || event.jobs.is_some()
            || last_emit.elapsed().as_millis() >= 100;
        if emit_now {
            render_cli_progress(&event);
            last_stage = Some(event.stage);
            last_emit = Instant::now();
        }
    };

    let outcome = if args.no_save {
        execute_run_with_progress(&backend, &ticket, &options, Some(&mut render)).await?
    } else {
        let history = env.history()?;
        let (outcome, saved) = run_and_save(
            &backend,
            &history,
            &env.session,
            &ticket,
            &options,
            Some(&mut render),
        )
        .await?;
        clear_progress_line();
        match saved {
            Some(Ok(record)) => println!("✓ Saved to history: {}", record.id),
            Some(Err(err)) => println!("Result not saved: {err}"),
            None => {}
        }
        outcome
    };
    clear_progress_line();

    let stored = match &outcome.output {
        RunOutput::Single(response) => state.apply_single(&ticket, response.clone()),
        RunOutput::Batch { entries, .. } => state.apply_batch(&ticket, entries.clone()),
    };
    debug!(stored, step = %state.step(), "run result applied");

    println!(
        "✓ Simulation completed in {:.1}s",
        outcome.elapsed_wall_s
    );
    print_outcome(&outcome);

    if let Some(path) = &args.csv {
        std::fs::write(path, outcome_csv(&outcome))?;
        println!("✓ Exported report to {}", path.display());
    }
    Ok(())
}

fn outcome_csv(outcome: &RunOutcome) -> String {
    let generated = Utc::now();
    match (&outcome.ticket.plan, &outcome.output) {
        (RunPlan::Batch { weather_station, .. }, RunOutput::Batch { entries, .. }) => {
            batch_csv(weather_station, entries, generated)
        }
        (plan, RunOutput::Single(response)) => {
            let (building_type, kind) = match plan {
                RunPlan::PreConfigured {
                    building_type,
                    construction_period,
                    ..
                } => (
                    *building_type,
                    SingleRunKind::PreConfigured(*construction_period),
                ),
                RunPlan::RealTime { building_type, .. } => (*building_type, SingleRunKind::Custom),
                RunPlan::Batch { .. } => (BuildingType::SingleFamilyHouse, SingleRunKind::Custom),
            };
            single_run_csv(&SingleRunReport {
                building_type,
                station_id: plan.weather_station(),
                kind,
                annual: &response.annual,
                hourly: response.hourly.as_ref(),
                generated,
            })
        }
        (plan, RunOutput::Batch { entries, .. }) => {
            batch_csv(plan.weather_station(), entries, generated)
        }
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match &outcome.output {
        RunOutput::Single(response) => {
            if response.cached {
                println!("  (served from the simulation cache)");
            }
            print_annual(&response.annual);
            print_monthly(response.hourly.as_ref());
        }
        RunOutput::Batch {
            entries,
            aggregate,
            failures,
        } => {
            if let RunPlan::Batch { allocation, .. } = &outcome.ticket.plan {
                println!("\nBatch: {}", summarize_allocation(allocation));
            }
            for entry in entries {
                println!(
                    "  {:<22} {:<12} x{:<3} {:>10} kWh  EUI {} kWh/m²",
                    entry.building_type.label(),
                    entry.period_id.id(),
                    entry.count,
                    round_half_up(entry.annual.total * f64::from(entry.count)),
                    to_fixed(entry.annual.eui, 1)
                );
            }
            println!("\nTotals ({} buildings):", aggregate.building_count);
            println!("  Heating:      {} kWh/year", round_half_up(aggregate.heating));
            println!("  Cooling:      {} kWh/year", round_half_up(aggregate.cooling));
            println!("  Total:        {} kWh/year", round_half_up(aggregate.total));
            println!("  Floor area:   {} m²", round_half_up(aggregate.floor_area));
            println!(
                "  Weighted EUI: {} kWh/m²/year",
                to_fixed(aggregate.weighted_eui, 1)
            );
            if !failures.is_empty() {
                println!("\n{} simulation(s) failed:", failures.len());
                for failure in failures {
                    println!("  {}", failure.message);
                }
            }
        }
    }
}

fn print_annual(a: &AnnualResult) {
    println!("\nAnnual summary:");
    println!("  Heating:     {} kWh/year", round_half_up(a.heating));
    println!("  Cooling:     {} kWh/year", round_half_up(a.cooling));
    println!("  Hot water:   {} kWh/year", round_half_up(a.dhw));
    println!("  Lighting:    {} kWh/year", round_half_up(a.lighting));
    println!("  Equipment:   {} kWh/year", round_half_up(a.equipment));
    println!("  Total:       {} kWh/year", round_half_up(a.total));
    println!("  EUI:         {} kWh/m²/year", to_fixed(a.eui, 1));
    println!("  Peak heating {} kW", to_fixed(a.peak_heating_kw, 2));
    println!("  Peak cooling {} kW", to_fixed(a.peak_cooling_kw, 2));
}

fn print_monthly(hourly: Option<&HourlyPowerData>) {
    let months = monthly_energy(hourly);
    if months.is_empty() {
        return;
    }
    println!("\n  Month  Heating (kWh)  Cooling (kWh)");
    for m in months {
        println!("  {:<5} {:>14} {:>14}", m.month, m.heating, m.cooling);
    }
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn stage_label(stage: RunStage) -> &'static str {
    match stage {
        RunStage::Validating => "validating",
        RunStage::Submitting => "submitting",
        RunStage::AwaitingJobs => "simulating",
        RunStage::Aggregating => "aggregating",
        RunStage::SavingHistory => "saving",
        RunStage::Completed => "done",
    }
}

fn render_cli_progress(event: &RunProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.1}s",
        spinner[spin_idx],
        stage_label(event.stage),
        event.elapsed_wall_s
    );
    if let Some(jobs) = &event.jobs {
        line.push_str(&format!("  {}/{} done", jobs.completed, jobs.total));
        if jobs.failed > 0 {
            line.push_str(&format!("  {} failed", jobs.failed));
        }
    }
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

async fn cmd_history_list(env: &CliEnv) -> AppResult<()> {
    let records = env.history()?.list(&env.session).await?;
    if records.is_empty() {
        println!("No saved simulations");
        return Ok(());
    }
    println!("Saved simulations:");
    for r in records {
        println!(
            "  {}  {}  {:<14} {:<24} {:<12} {:>10} kWh  EUI {}",
            r.id,
            r.created_at.format("%Y-%m-%d %H:%M"),
            r.simulation_type,
            r.building_summary(),
            es_core::station_name(&r.weather_station),
            round_half_up(r.total_energy),
            to_fixed(r.eui, 1)
        );
    }
    Ok(())
}

async fn cmd_history_show(env: &CliEnv, id: &str) -> AppResult<()> {
    let r = env.history()?.get(&env.session, id).await?;
    println!("Simulation {}", r.id);
    println!("  Date:       {}", r.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Type:       {}", r.simulation_type);
    println!("  Buildings:  {} ({})", r.building_summary(), r.building_count);
    println!("  Station:    {}", es_core::station_name(&r.weather_station));
    if let Some(period) = r.construction_period {
        println!("  Period:     {}", period.label());
    }
    println!("  Heating:    {} kWh/year", round_half_up(r.total_heating));
    println!("  Cooling:    {} kWh/year", round_half_up(r.total_cooling));
    println!("  Total:      {} kWh/year", round_half_up(r.total_energy));
    println!("  Floor area: {} m²", round_half_up(r.floor_area));
    println!("  EUI:        {} kWh/m²/year", to_fixed(r.eui, 1));
    print_monthly(r.hourly_data.as_ref());
    Ok(())
}

async fn cmd_history_delete(env: &CliEnv, id: &str) -> AppResult<()> {
    env.history()?.delete(&env.session, id).await?;
    println!("✓ Deleted {}", id);
    Ok(())
}

async fn cmd_history_export(env: &CliEnv, id: &str, output: Option<&Path>) -> AppResult<()> {
    let record = env.history()?.get(&env.session, id).await?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(record_file_name(&record)));
    std::fs::write(&path, record_csv(&record))?;
    println!("✓ Exported {} to {}", record.id, path.display());
    Ok(())
}

async fn cmd_auth(env: &mut CliEnv, cmd: AuthCommands) -> AppResult<()> {
    let auth = env.auth_client()?;
    match cmd {
        AuthCommands::Signup {
            email,
            password,
            confirm,
        } => {
            if env.session.sign_up(&auth, &email, &password, &confirm).await? {
                println!("✓ Account created and signed in");
            } else {
                println!("✓ Account created. Check {} for a verification code", email);
            }
        }
        AuthCommands::Signin { email, password } => {
            let user = env.session.sign_in(&auth, &email, &password).await?;
            println!("✓ Signed in as {}", user.email.as_deref().unwrap_or(&user.id));
        }
        AuthCommands::Verify { email, code } => {
            let user = env.session.verify(&auth, &email, &code).await?;
            println!("✓ Verified {}", user.email.as_deref().unwrap_or(&user.id));
        }
        AuthCommands::Resend { email } => {
            env.session.resend_verification(&auth, &email).await?;
            println!("✓ Verification code sent to {}", email);
        }
        AuthCommands::Whoami => {
            let user = env.session.refresh_user(&auth).await?;
            println!("{}", user.email.as_deref().unwrap_or(&user.id));
            if !user.is_confirmed() {
                println!("  (email not confirmed)");
            }
        }
        AuthCommands::Signout => {
            env.session.sign_out(&auth).await?;
            println!("✓ Signed out");
        }
    }
    Ok(())
}
