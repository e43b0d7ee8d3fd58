//! Markov Cohort - health-economic cohort simulator
//!
//! The main entry point for markov-cohort, handling:
//! - Single-cohort simulation with survival and cost outputs
//! - Two-arm cost-effectiveness comparison
//! - Model validation and effective-config display

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mc_common::{CohortId, Error, OutputFormat, StructuredError, Therapy, SCHEMA_VERSION};
use mc_config::{load_model_config, validate_model, LoadedConfig, ModelConfig};
use mc_core::exit_codes::ExitCode;
use mc_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogFormat, LogLevel, Stage,
};
use mc_core::{Cohort, CohortOutputs, CostEffectiveness};
use tracing::{error, info, info_span};

/// Markov Cohort - discrete-time Markov cohort simulation
#[derive(Parser)]
#[command(name = "markov-cohort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to model.json (overrides environment and XDG lookup)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Log level (overrides MC_LOG / RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one cohort and report survival, stroke, cost and utility
    Simulate(SimulateArgs),

    /// Simulate both therapy arms and compare cost-effectiveness
    Compare(CompareArgs),

    /// Validate the model configuration
    Check,

    /// Configuration management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

/// Overrides applied on top of the loaded model.
#[derive(Args, Debug, Default)]
struct RunOverrides {
    /// Cohort id (replication index; shifts every patient id)
    #[arg(long, default_value_t = 0)]
    cohort_id: u64,

    /// Number of patients
    #[arg(long)]
    population: Option<usize>,

    /// Simulation horizon in years
    #[arg(long)]
    horizon: Option<f64>,

    /// Annual discount rate
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Sample one relative risk per patient (probabilistic sensitivity analysis)
    #[arg(long)]
    psa: bool,

    /// Mix background mortality into the live states
    #[arg(long)]
    background_mortality: bool,

    /// Simulate patients on the current thread only
    #[arg(long)]
    sequential: bool,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Therapy arm
    #[arg(long, short = 't', default_value = "none")]
    therapy: Therapy,

    #[command(flatten)]
    overrides: RunOverrides,
}

#[derive(Args, Debug)]
struct CompareArgs {
    #[command(flatten)]
    overrides: RunOverrides,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the effective model configuration
    Show,
    /// Print the built-in default model
    Default,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let cli_level = cli.global.log_level.or(if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    });
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let run_id = generate_run_id();
    let span = info_span!("run", run_id = %run_id);
    let _enter = span.enter();

    info!(event = event_names::RUN_STARTED, stage = %Stage::Init, "run started");

    let exit_code = match &cli.command {
        Commands::Simulate(args) => run_simulate(&cli.global, &run_id, args),
        Commands::Compare(args) => run_compare(&cli.global, &run_id, args),
        Commands::Check => run_check(&cli.global),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    info!(
        event = event_names::RUN_FINISHED,
        exit_code = exit_code.as_i32(),
        "run finished"
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_simulate(global: &GlobalOpts, run_id: &str, args: &SimulateArgs) -> ExitCode {
    if let Err(msg) = check_overrides(&args.overrides) {
        eprintln!("simulate: {}", msg);
        return ExitCode::ArgsError;
    }
    let model = match load_with_overrides(global, &args.overrides) {
        Ok(model) => model,
        Err(err) => return report_error(global, &err),
    };

    let outputs = match simulate_arm(&model, CohortId(args.overrides.cohort_id), args.therapy) {
        Ok(outputs) => outputs,
        Err(err) => return report_error(global, &err),
    };

    let report = outputs.report();
    match global.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id,
                "cohort": report,
            });
            if let Err(err) = print_json(&output) {
                return report_error(global, &err);
            }
        }
        OutputFormat::Md => println!("{}", report.to_markdown()),
        OutputFormat::Summary => println!("{}", report.summary_line()),
    }

    if report.metrics.iter().all(|m| m.has_data()) {
        ExitCode::Clean
    } else {
        ExitCode::NoData
    }
}

fn run_compare(global: &GlobalOpts, run_id: &str, args: &CompareArgs) -> ExitCode {
    if let Err(msg) = check_overrides(&args.overrides) {
        eprintln!("compare: {}", msg);
        return ExitCode::ArgsError;
    }
    let model = match load_with_overrides(global, &args.overrides) {
        Ok(model) => model,
        Err(err) => return report_error(global, &err),
    };
    let cohort_id = CohortId(args.overrides.cohort_id);

    let arms = simulate_arm(&model, cohort_id, Therapy::None).and_then(|base| {
        simulate_arm(&model, cohort_id, Therapy::Anticoagulation).map(|alt| (base, alt))
    });
    let (base, alternative) = match arms {
        Ok(arms) => arms,
        Err(err) => return report_error(global, &err),
    };

    let ce = CostEffectiveness::compare(
        &Therapy::None.to_string(),
        &base,
        &Therapy::Anticoagulation.to_string(),
        &alternative,
    );
    info!(
        event = event_names::COMPARE_FINISHED,
        stage = %Stage::Compare,
        icer = ?ce.icer,
        dominance = ?ce.dominance,
        "comparison finished"
    );

    match global.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id,
                "base": base.report(),
                "alternative": alternative.report(),
                "cost_effectiveness": ce,
            });
            if let Err(err) = print_json(&output) {
                return report_error(global, &err);
            }
        }
        OutputFormat::Md => {
            println!("{}", base.report().to_markdown());
            println!("{}", alternative.report().to_markdown());
            println!("## Cost-effectiveness\n");
            println!("| | value |\n|---|---|");
            println!("| incremental cost | {} |", fmt_opt(ce.incremental_cost));
            println!("| incremental utility | {} |", fmt_opt(ce.incremental_utility));
            println!("| ICER | {} |", fmt_opt(ce.icer));
            println!("| dominance | {:?} |", ce.dominance);
        }
        OutputFormat::Summary => {
            println!(
                "{} vs {}: dcost={} dutility={} icer={}",
                ce.alternative_label,
                ce.base_label,
                fmt_opt(ce.incremental_cost),
                fmt_opt(ce.incremental_utility),
                fmt_opt(ce.icer)
            );
        }
    }

    ExitCode::Clean
}

fn run_check(global: &GlobalOpts) -> ExitCode {
    match load_config(global) {
        Ok(loaded) => {
            match global.format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "schema_version": SCHEMA_VERSION,
                        "valid": true,
                        "source": loaded.source.to_string(),
                        "path": loaded.path.as_ref().map(|p| p.display().to_string()),
                    });
                    if let Err(err) = print_json(&output) {
                        return report_error(global, &err);
                    }
                }
                _ => println!(
                    "model OK ({}{})",
                    loaded.source,
                    loaded
                        .path
                        .as_ref()
                        .map(|p| format!(": {}", p.display()))
                        .unwrap_or_default()
                ),
            }
            ExitCode::Clean
        }
        Err(err) => report_error(global, &err),
    }
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    let model = match args.command {
        ConfigCommands::Show => match load_config(global) {
            Ok(loaded) => loaded.model,
            Err(err) => return report_error(global, &err),
        },
        ConfigCommands::Default => ModelConfig::default(),
    };

    match model.to_json_pretty() {
        Ok(json) => {
            println!("{}", json);
            ExitCode::Clean
        }
        Err(err) => report_error(global, &err.into()),
    }
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "name": "markov-cohort",
                "version": env!("CARGO_PKG_VERSION"),
                "schema_version": SCHEMA_VERSION,
                "config_schema_version": mc_config::CONFIG_SCHEMA_VERSION,
            });
            println!("{}", output);
        }
        _ => println!("markov-cohort {}", env!("CARGO_PKG_VERSION")),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn load_config(global: &GlobalOpts) -> Result<LoadedConfig, Error> {
    load_model_config(global.config.as_deref()).map_err(|e| {
        error!(event = event_names::CONFIG_ERROR, error = %e, "model configuration rejected");
        Error::from(e)
    })
}

/// Reject override values that can never form a valid model.
fn check_overrides(overrides: &RunOverrides) -> Result<(), String> {
    if overrides.population == Some(0) {
        return Err("invalid --population 0".to_string());
    }
    if let Some(h) = overrides.horizon.filter(|h| !h.is_finite() || *h <= 0.0) {
        return Err(format!("invalid --horizon {}", h));
    }
    if let Some(r) = overrides.discount_rate.filter(|r| !r.is_finite() || *r < 0.0) {
        return Err(format!("invalid --discount-rate {}", r));
    }
    Ok(())
}

fn load_with_overrides(global: &GlobalOpts, overrides: &RunOverrides) -> Result<ModelConfig, Error> {
    let loaded = load_config(global)?;
    info!(
        event = event_names::CONFIG_LOADED,
        stage = %Stage::Init,
        source = %loaded.source,
        "model loaded"
    );

    let mut model = loaded.model;
    if let Some(n) = overrides.population {
        model.simulation.population_size = n;
    }
    if let Some(h) = overrides.horizon {
        model.simulation.horizon = h;
    }
    if let Some(r) = overrides.discount_rate {
        model.simulation.discount_rate = r;
    }
    if overrides.psa {
        model.psa.enabled = true;
    }
    if overrides.background_mortality {
        model.background_mortality.enabled = true;
    }
    if overrides.sequential {
        model.simulation.parallel = false;
    }

    validate_model(&model)?;
    Ok(model)
}

fn simulate_arm(
    model: &ModelConfig,
    cohort_id: CohortId,
    therapy: Therapy,
) -> Result<CohortOutputs, Error> {
    let span = info_span!("cohort", stage = %Stage::Simulate, therapy = %therapy);
    let _enter = span.enter();
    Cohort::new(cohort_id, therapy, model)?.simulate()
}

fn print_json(value: &serde_json::Value) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an error to stderr and map it to an exit code.
fn report_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    let code = ExitCode::from_error(err);
    if code.is_internal_error() {
        error!(
            event = event_names::INTERNAL_ERROR,
            code = err.code(),
            exit_code = code.as_i32(),
            error = %err,
            "internal error"
        );
    }
    match global.format {
        OutputFormat::Json => {
            eprintln!("{}", StructuredError::from(err).to_json());
        }
        _ => {
            eprintln!("error: {}: {}", err.headline(), err);
            eprintln!("hint: {}", err.remediation());
        }
    }
    code
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.4}", x))
        .unwrap_or_else(|| "n/a".to_string())
}
