/*!
 * tracebridge CLI - Command Line Interface
 *
 * Offline tooling over captured bridge traces:
 *
 * - `tracebridge audit --log <path>` checks a trace log against the event
 *   contract and the expected protocol lifecycles.
 * - `tracebridge shapes --log <path>` catalogs the payload shapes a host
 *   actually produced. With `--flow <name>` it prints one feature area's
 *   timeline instead.
 */

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracebridge::{
    audit,
    cli_style::{self, render_audit_report, render_flow_timeline, render_shape_catalog},
    config::{LogLevel, TraceConfig},
    error::{Result, TraceError, EXIT_FAILURE, EXIT_SUCCESS},
    logging,
    shapes::{self, Flow},
};

#[derive(Parser, Debug)]
#[command(name = "tracebridge")]
#[command(version, about = "Audit and inspect captured bridge traces", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Diagnostic log level (error, warn, info, debug, trace)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    /// Write diagnostics to this file as JSON (default: stderr)
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Enable verbose diagnostics (equivalent to --log-level=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Audit a trace log for contract and lifecycle coverage
    Audit(LogArgs),

    /// Catalog the runtime payload shapes in a trace log
    Shapes(ShapesArgs),
}

#[derive(Args, Debug)]
struct LogArgs {
    /// Trace log file, or a directory whose newest log is used
    #[arg(long, value_name = "PATH", required = true)]
    log: PathBuf,

    /// Print machine-readable JSON instead of the human report
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ShapesArgs {
    #[command(flatten)]
    log: LogArgs,

    /// Print the timeline of one flow instead of the shape catalog
    #[arg(long, value_enum, value_name = "FLOW")]
    flow: Option<FlowArg>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FlowArg {
    /// getAuthStatus, mcpServerStatus/list, auth/*
    Login,
    /// thread/*, turn/*, agent message deltas
    ThreadTurn,
    Automations,
    /// git-*, git/*, branch and status queries
    Git,
}

impl From<FlowArg> for Flow {
    fn from(arg: FlowArg) -> Self {
        match arg {
            FlowArg::Login => Flow::Login,
            FlowArg::ThreadTurn => Flow::ThreadTurn,
            FlowArg::Automations => Flow::Automations,
            FlowArg::Git => Flow::Git,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_FAILURE,
            };
            std::process::exit(code);
        }
    };

    let code = match run(cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            // A failing audit already printed its report
            if !e.is_verdict() {
                cli_style::print_error(&e.to_string());
            }
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match cli.config {
        Some(ref path) => TraceConfig::from_file(path).unwrap_or_else(|e| {
            cli_style::print_warning(&format!("Failed to load config file: {}", e));
            TraceConfig::default()
        }),
        None => TraceConfig::default(),
    };

    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    config.verbose |= cli.verbose;

    if let Err(e) = logging::init_logging(&config) {
        cli_style::print_warning(&format!("Failed to initialize logging: {}", e));
    }

    match cli.command {
        Commands::Audit(args) => run_audit(&args, &config),
        Commands::Shapes(args) => run_shapes(&args, &config),
    }
}

fn run_audit(args: &LogArgs, config: &TraceConfig) -> Result<()> {
    let report = audit::analyze(&args.log, &config.audit)?;

    if args.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        print!("{}", render_audit_report(&report));
    }

    let summary = report.summary();
    tracing::info!(
        passed = summary.passed,
        failed = summary.failed,
        "audit finished"
    );

    if report.passed() {
        Ok(())
    } else {
        Err(TraceError::AuditFailed {
            failed: summary.failed,
            total: summary.total_checks,
        })
    }
}

fn run_shapes(args: &ShapesArgs, config: &TraceConfig) -> Result<()> {
    if let Some(flow) = args.flow {
        return run_flow(&args.log, flow.into(), config);
    }

    let catalog = shapes::catalog(&args.log.log, &config.audit)?;

    if args.log.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        print!("{}", render_shape_catalog(&catalog));
    }

    Ok(())
}

fn run_flow(args: &LogArgs, flow: Flow, config: &TraceConfig) -> Result<()> {
    let timeline = shapes::flow(&args.log, flow, &config.audit)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
    } else {
        print!("{}", render_flow_timeline(&timeline));
    }

    tracing::info!(
        flow = timeline.title.as_str(),
        matches = timeline.total_matches,
        "flow extracted"
    );
    Ok(())
}
