use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use scalasense::cli_output::{format_json, format_text, print_no_files_message, report_order};
use scalasense::defaults::reports::REPORTS_PATH_KEY;
use scalasense::{
    default_config_toml, BaseMetricsSensor, Config, Encoding, Language, MeasureStore,
    ProjectContext, Schedule, SurefireSensor,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// scalasense - base metrics and test-report ingestion for Scala projects
#[derive(Parser, Debug)]
#[command(
    name = "scalasense",
    version,
    about = "Base metrics and test-report ingestion for Scala projects"
)]
struct Cli {
    /// Use specified config file instead of ~/.scalasense and ./.scalasense
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for measures
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// More logging on stderr (-v info, -vv debug); SCALASENSE_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Project directory (for default analyze command)
    #[arg(default_value = ".")]
    path: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Measure sources and import test reports
    Analyze {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[command(flatten)]
        sources: SourceArgs,
        #[command(flatten)]
        reports: ReportArgs,
    },
    /// Measure sources only
    Metrics {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Import test reports only
    Tests {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[command(flatten)]
        reports: ReportArgs,
    },
    /// Print the default configuration
    Defaults,
}

#[derive(clap::Args, Debug, Default)]
struct SourceArgs {
    /// Source encoding (UTF-8, ISO-8859-1)
    #[arg(long)]
    encoding: Option<Encoding>,
}

#[derive(clap::Args, Debug, Default)]
struct ReportArgs {
    /// Test report directory, relative to the project directory
    #[arg(long)]
    reports_path: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy)]
struct Pipelines {
    metrics: bool,
    tests: bool,
}

fn main() {
    #[cfg(unix)]
    // SAFETY: restoring the default SIGPIPE disposition before any output is written
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (path, sources, reports, pipelines) = match cli.command {
        Some(Commands::Defaults) => {
            print!("{}", default_config_toml());
            return;
        }
        Some(Commands::Analyze { path, sources, reports }) => {
            (path, sources, reports, Pipelines { metrics: true, tests: true })
        }
        Some(Commands::Metrics { path, sources }) => {
            (path, sources, ReportArgs::default(), Pipelines { metrics: true, tests: false })
        }
        Some(Commands::Tests { path, reports }) => {
            (path, SourceArgs::default(), reports, Pipelines { metrics: false, tests: true })
        }
        None => (
            cli.path,
            SourceArgs::default(),
            ReportArgs::default(),
            Pipelines { metrics: true, tests: true },
        ),
    };

    if !path.is_dir() {
        eprintln!("Error: {} is not a directory", path.display());
        std::process::exit(1);
    }

    let mut config = match &cli.config {
        Some(config_path) => Config::load_from(config_path),
        None => Config::load(&path),
    };
    if let Some(encoding) = sources.encoding {
        config.encoding = encoding;
    }
    if let Some(reports_path) = reports.reports_path {
        config.settings.set(REPORTS_PATH_KEY, reports_path);
    }

    run(&path, config, pipelines, cli.format);
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env("SCALASENSE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(root: &Path, config: Config, pipelines: Pipelines, format: Format) {
    let ctx = ProjectContext::discover(root, config);
    if pipelines.metrics && !ctx.has_language(Language::Scala) {
        print_no_files_message(root);
    }

    let mut schedule = Schedule::new();
    if pipelines.metrics {
        schedule.register(Box::new(BaseMetricsSensor));
    }
    if pipelines.tests {
        schedule.register(Box::new(SurefireSensor));
    }

    let mut store = MeasureStore::new();
    if let Err(e) = schedule.run(&ctx, &mut store) {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }

    let measures = report_order(store.measures(), root);
    match format {
        Format::Text => print!("{}", format_text(&measures)),
        Format::Json => match format_json(&measures) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    }
}
