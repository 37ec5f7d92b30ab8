//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report::{self, TextReportAdapter};
use crate::domain::config_validation::{build_analysis_config, build_data_config, DataConfig};
use crate::domain::error::RecommenderError;
use crate::domain::universe::{run_universe, AnalysisConfig, UniverseAnalysis};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

/// Environment variable consulted when `--config` is omitted.
pub const CONFIG_ENV_VAR: &str = "TWSTOCK_CONFIG";

#[derive(Parser, Debug)]
#[command(name = "twstock", about = "Daily technical-analysis stock recommender")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze the configured universe and print ranked recommendations
    Recommend {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-separated codes, overriding `[data] codes`
        #[arg(long)]
        codes: Option<String>,
    },
    /// Validate a configuration file without fetching data
    Validate {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List codes available under the configured data path
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Recommend {
            config,
            output,
            codes,
        } => run_recommend(config.as_deref(), output.as_deref(), codes.as_deref()),
        Command::Validate { config } => run_validate(config.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(config.as_deref()),
    }
}

/// `--config` wins over `TWSTOCK_CONFIG`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, ExitCode> {
    let Some(path) = resolve_config_path(path) else {
        let err = RecommenderError::ConfigMissing {
            section: "cli".into(),
            key: format!("--config (or {})", CONFIG_ENV_VAR),
        };
        error!("{err}");
        return Err(ExitCode::from(&err));
    };

    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(&path).map_err(|e| {
        let err = RecommenderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        error!("{err}");
        ExitCode::from(&err)
    })
}

/// Builds and validates everything a run needs. Nothing is fetched.
pub fn build_run_config(
    config: &dyn ConfigPort,
    codes_override: Option<&str>,
) -> Result<(DataConfig, AnalysisConfig), RecommenderError> {
    let data = build_data_config(config, codes_override)?;
    let analysis = build_analysis_config(config)?;
    Ok((data, analysis))
}

/// `-o` wins over `[output] path`.
pub fn resolve_output_path(config: &dyn ConfigPort, output: Option<&Path>) -> Option<PathBuf> {
    output.map(Path::to_path_buf).or_else(|| {
        config
            .get_string("output", "path")
            .filter(|p| !p.trim().is_empty())
            .map(|p| PathBuf::from(p.trim()))
    })
}

/// Fetch, analyze, rank and render. Returns the analysis and the report text.
pub fn run_pipeline(
    data_port: &dyn DataPort,
    data: &DataConfig,
    analysis: &AnalysisConfig,
) -> Result<(UniverseAnalysis, String), RecommenderError> {
    let result = run_universe(
        data_port,
        &data.codes,
        data.start_date,
        data.end_date,
        analysis,
    )?;
    let report = text_report::render_full(&result.ranked, &result.skipped);
    Ok((result, report))
}

fn run_recommend(
    config_path: Option<&Path>,
    output: Option<&Path>,
    codes_override: Option<&str>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (data, analysis) = match build_run_config(&adapter, codes_override) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let data_port = CsvAdapter::new(&data.path);
    let (result, report) = match run_pipeline(&data_port, &data, &analysis) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    print!("{}", report);

    if let Some(path) = resolve_output_path(&adapter, output) {
        let path_str = path.to_string_lossy();
        if let Err(e) = TextReportAdapter::new().write(&result.ranked, &result.skipped, &path_str) {
            error!("failed to write report: {e}");
            return (&e).into();
        }
        info!(path = %path.display(), "report written");
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: Option<&Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (data, analysis) = match build_run_config(&adapter, None) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let ind = &analysis.indicators;
    println!("Configuration is valid");
    println!("  data path:  {}", data.path.display());
    println!("  period:     {} to {}", data.start_date, data.end_date);
    println!("  codes:      {}", data.codes.join(", "));
    println!(
        "  indicators: SMA({}), SMA({}), RSI({}), MACD({},{},{})",
        ind.short_window,
        ind.long_window,
        ind.rsi_period,
        ind.macd_fast,
        ind.macd_slow,
        ind.macd_signal
    );
    let weights: Vec<String> = analysis
        .scoring
        .weights
        .used()
        .map(|(c, w)| format!("{}={}", c, w))
        .collect();
    println!("  weights:    {}", weights.join(", "));
    println!(
        "  thresholds: buy >= {}, sell <= {}",
        analysis.scoring.buy_threshold, analysis.scoring.sell_threshold
    );
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: Option<&Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let Some(path) = adapter.get_string("data", "path") else {
        let err = RecommenderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        };
        error!("{err}");
        return (&err).into();
    };

    match CsvAdapter::new(path.trim()).list_symbols() {
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            info!(count = symbols.len(), "symbols found");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}
