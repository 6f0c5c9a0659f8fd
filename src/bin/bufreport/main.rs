//! Binary entry point for the buffer-pool report tool.
#![forbid(unsafe_code)]

mod ui;

use std::error::Error;
use std::path::PathBuf;

use bufreport::{
    logging::init_logging, ConfigOverrides, LogicalIoCheck, ReportConfig, ReportGenerator,
    Strategy,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use ui::{elapsed, Theme, Ui};

#[derive(Parser, Debug)]
#[command(
    name = "bufreport",
    version,
    about = "Chart and summarise buffer-pool hit/miss measurements",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = Theme::Auto,
        help = "Console colour theme"
    )]
    theme: Theme,

    #[arg(long, global = true, help = "Print only the essential lines")]
    quiet: bool,

    #[arg(
        long,
        global = true,
        default_value = "warn",
        value_name = "FILTER",
        help = "tracing filter for stderr diagnostics (RUST_LOG takes precedence)"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    #[arg(
        long,
        global = true,
        env = "BUFREPORT_CONFIG",
        value_name = "FILE",
        help = "TOML file with report settings"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "FILE", help = "Measurement CSV to read")]
    input: Option<PathBuf>,

    #[arg(long, global = true, value_name = "FILE", help = "PNG file to write")]
    output: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PAGES", help = "Buffer size shown in the subtitle")]
    buffer_size: Option<u32>,

    #[arg(long, global = true, value_name = "PAGES", help = "File size shown in the subtitle")]
    total_pages: Option<u32>,

    #[arg(
        long,
        global = true,
        value_name = "N",
        help = "Requests per workload (subtitle and I/O-saved estimate)"
    )]
    request_count: Option<u64>,

    #[arg(long, global = true, value_enum, help = "Replacement strategy shown in the title")]
    strategy: Option<StrategyArg>,

    #[arg(long, global = true, value_name = "DPI", help = "Raster resolution")]
    dpi: Option<u32>,

    #[arg(
        long,
        global = true,
        value_enum,
        help = "Whether a varying TotalLogicalIO fails the run or only warns"
    )]
    logical_io: Option<LogicalIoArg>,
}

impl SettingsArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            buffer_size: self.buffer_size,
            total_pages: self.total_pages,
            request_count: self.request_count,
            strategy: self.strategy.map(Into::into),
            dpi: self.dpi,
            logical_io_check: self.logical_io.map(Into::into),
        }
    }
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    #[command(about = "Render the chart and print the summary (default)")]
    Render,

    #[command(about = "Print the summary without rendering a chart")]
    Summary,

    #[command(about = "Print the effective configuration as TOML")]
    Config,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum StrategyArg {
    Lru,
    Mru,
}

impl From<StrategyArg> for Strategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Lru => Strategy::Lru,
            StrategyArg::Mru => Strategy::Mru,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogicalIoArg {
    Strict,
    Warn,
}

impl From<LogicalIoArg> for LogicalIoCheck {
    fn from(check: LogicalIoArg) -> Self {
        match check {
            LogicalIoArg::Strict => LogicalIoCheck::Strict,
            LogicalIoArg::Warn => LogicalIoCheck::Warn,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let mut config = ReportConfig::load(cli.settings.config.clone())?;
    config.apply(cli.settings.overrides())?;
    let ui = Ui::new(cli.theme, cli.quiet);

    match cli.command.unwrap_or(Command::Render) {
        Command::Render => {
            let generator = ReportGenerator::new(config);
            let rendering = ui.rendering(&generator.config().output_path);
            let outcome = generator.run()?;
            debug!(elapsed = %elapsed(rendering.finish()), "render finished");

            ui.chart_saved(&outcome.image);
            ui.summary(&outcome.report.summary);
        }
        Command::Summary => {
            let summary = ReportGenerator::new(config).summarize()?;
            ui.summary(&summary);
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
