//! Command-line front end for the project evaluator
//!
//! Reads a project file and prints its variables, expands an expression in
//! its context, or evaluates a condition against it.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use proeval::diagnostics::Format;
use proeval::{
    CacheConfig, DiagnosticFormatter, EvalError, EvaluatorConfig, LoadFlags, Project, StderrSink,
};
#[cfg(feature = "terminal")]
use std::io::IsTerminal;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "proeval")]
#[command(about = "Evaluate qmake-style project files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Assignment evaluated before the project, e.g. `CONFIG+=debug`
    #[arg(long = "set", global = true, value_name = "ASSIGNMENT")]
    set: Vec<String>,

    /// Assignment evaluated after the project
    #[arg(long = "after", global = true, value_name = "ASSIGNMENT")]
    after: Vec<String>,

    /// Value added to CONFIG before the project is read
    #[arg(long = "config", global = true, value_name = "VALUE")]
    config: Vec<String>,

    /// Directory containing qmake.conf
    #[arg(long, global = true, value_name = "DIR")]
    spec: Option<String>,

    /// Directory searched for feature (.prf) files
    #[arg(long = "feature-path", global = true, value_name = "DIR")]
    feature_path: Vec<String>,

    /// Property returned by `$$[NAME]`
    #[arg(long = "property", global = true, value_name = "NAME=VALUE")]
    property: Vec<String>,

    /// Evaluate for the host rather than the target
    #[arg(long = "host-build", global = true)]
    host_build: bool,

    /// Skip pre-assignments and the spec
    #[arg(long = "no-pre", global = true)]
    no_pre: bool,

    /// Skip post-assignments and CONFIG features
    #[arg(long = "no-post", global = true)]
    no_post: bool,

    /// Disable the path and parsed-file caches
    #[arg(long = "no-cache", global = true)]
    no_cache: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every top-level variable of the project
    Dump {
        /// Project file, `-` for standard input
        project: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = DumpFormat::Text)]
        format: DumpFormat,
    },
    /// Expand a value expression in the context of the project
    Expand {
        /// Project file, `-` for standard input
        project: String,
        /// Expression such as `$$TARGET`
        expression: String,
    },
    /// Evaluate a condition in the context of the project
    Test {
        /// Project file, `-` for standard input
        project: String,
        /// Condition such as `contains(CONFIG, debug)`
        condition: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    Text,
    Json,
}

/// Location attributed to expressions and conditions given on the command line
const COMMAND_LINE: &str = "(command line)";

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn build_config(cli: &Cli) -> Result<EvaluatorConfig> {
    let mut config = EvaluatorConfig::new().with_host_build(cli.host_build);
    config.extra_vars = cli.set.clone();
    config.post_vars = cli.after.clone();
    config.extra_configs = cli.config.clone();
    config.feature_roots = cli.feature_path.clone();
    if let Some(spec) = &cli.spec {
        config = config.with_spec_dir(spec);
    }
    for property in &cli.property {
        let Some((name, value)) = property.split_once('=') else {
            bail!("invalid property '{property}', expected NAME=VALUE");
        };
        config = config.with_property(name, value);
    }
    if cli.no_cache {
        config = config.with_cache(CacheConfig::disabled());
    }
    Ok(config)
}

fn load_flags(cli: &Cli) -> LoadFlags {
    let mut flags = LoadFlags::ALL;
    if cli.no_pre {
        flags = flags.without(LoadFlags::PRE_FILES);
    }
    if cli.no_post {
        flags = flags.without(LoadFlags::POST_FILES);
    }
    flags
}

fn run(cli: Cli) -> Result<i32> {
    let config = build_config(&cli)?;
    let flags = load_flags(&cli);

    let formatter = DiagnosticFormatter::new(Format::Text);
    #[cfg(feature = "terminal")]
    let formatter = formatter.with_color(std::io::stderr().is_terminal());
    let mut project = Project::with_sink(config, Arc::new(StderrSink::new(formatter)));

    let project_file = match &cli.command {
        Commands::Dump { project, .. }
        | Commands::Expand { project, .. }
        | Commands::Test { project, .. } => project.clone(),
    };

    match project.read(&project_file, flags) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("Error: could not read project {project_file}");
            return Ok(1);
        }
        Err(err) => return Ok(fatal(&err)),
    }

    match &cli.command {
        Commands::Dump { format, .. } => {
            match format {
                DumpFormat::Text => project.dump().context("failed to write variables")?,
                DumpFormat::Json => {
                    let json = serde_json::to_string_pretty(&project.dump_json())
                        .context("failed to serialize variables")?;
                    println!("{json}");
                }
            }
            Ok(0)
        }
        Commands::Expand { expression, .. } => {
            println!("{}", project.expand(expression, COMMAND_LINE, 1));
            Ok(0)
        }
        Commands::Test { condition, .. } => match project.test_condition(condition, COMMAND_LINE, 1) {
            Ok(true) => {
                println!("true");
                Ok(0)
            }
            Ok(false) => {
                println!("false");
                Ok(1)
            }
            Err(err) => Ok(fatal(&err)),
        },
    }
}

/// Exit status for a fatal evaluation error; the sink has already printed
/// the diagnostic that caused it
fn fatal(err: &EvalError) -> i32 {
    log::debug!("evaluation aborted: {err}");
    err.exit_code()
}
