//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_report_adapter::SvgReportAdapter;
use crate::adapters::tables;
use crate::domain::analysis::{Analysis, Inputs};
use crate::domain::config::{
    build_analysis_config, validate_analysis_config, AnalysisConfig, OutputFormat,
};
use crate::domain::error::AnalysisError;
use crate::domain::merge::DuplicatePolicy;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "sentitrade",
    about = "Correlate trader behaviour with market sentiment"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full analysis and write the report
    Analyze {
        /// Daily sentiment CSV (overrides [input] sentiment)
        #[arg(long)]
        sentiment: Option<PathBuf>,
        /// Trade history CSV (overrides [input] trades)
        #[arg(long)]
        trades: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory for chart and HTML output
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// How to treat several sentiment rows for one date: reject or fan-out
        #[arg(long)]
        duplicates: Option<DuplicatePolicy>,
    },
    /// Print the data-quality report for both inputs
    Inspect {
        #[arg(long)]
        sentiment: Option<PathBuf>,
        #[arg(long)]
        trades: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sentiment: Option<PathBuf>,
    pub trades: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub duplicates: Option<DuplicatePolicy>,
}

impl Overrides {
    pub fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(path) = &self.sentiment {
            config.sentiment_path = Some(path.clone());
        }
        if let Some(path) = &self.trades {
            config.trades_path = Some(path.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(policy) = self.duplicates {
            config.duplicate_policy = policy;
        }
        config
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            sentiment,
            trades,
            config,
            output,
            format,
            duplicates,
        } => {
            let overrides = Overrides {
                sentiment,
                trades,
                output_dir: output,
                format,
                duplicates,
            };
            run_analyze(config.as_ref(), &overrides)
        }
        Command::Inspect {
            sentiment,
            trades,
            config,
        } => {
            let overrides = Overrides {
                sentiment,
                trades,
                ..Overrides::default()
            };
            run_inspect(config.as_ref(), &overrides)
        }
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Build the effective configuration: file values (or defaults when no file
/// is given) with command-line overrides applied on top.
pub fn resolve_config(
    config_path: Option<&PathBuf>,
    overrides: &Overrides,
) -> Result<AnalysisConfig, AnalysisError> {
    let base = match config_path {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            build_analysis_config(&FileConfigAdapter::from_file(path)?)?
        }
        None => AnalysisConfig::default(),
    };
    Ok(overrides.apply(base))
}

fn csv_adapter_for(config: &AnalysisConfig) -> Result<CsvAdapter, AnalysisError> {
    Ok(CsvAdapter::new(
        config.sentiment_path()?.clone(),
        config.trades_path()?.clone(),
    ))
}

fn fail(err: AnalysisError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn run_analyze(config_path: Option<&PathBuf>, overrides: &Overrides) -> ExitCode {
    let config = match resolve_config(config_path, overrides) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let adapter = match csv_adapter_for(&config) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    run_analysis_pipeline(&adapter, &config)
}

/// Run the pipeline with console output on stdout and map the outcome to an
/// exit code.
pub fn run_analysis_pipeline(data_port: &dyn DataPort, config: &AnalysisConfig) -> ExitCode {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match execute_pipeline(data_port, config, &mut out) {
        Ok(written) => {
            for path in &written {
                log::info!("wrote {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Load, analyse and report. Console tables go to `out`; chart and HTML
/// files go to `config.output_dir` according to `config.format`. Returns the
/// paths of every file written.
pub fn execute_pipeline(
    data_port: &dyn DataPort,
    config: &AnalysisConfig,
    out: &mut dyn Write,
) -> Result<Vec<PathBuf>, AnalysisError> {
    let inputs = Inputs::load(data_port)?;
    write_quality(&inputs, config, out)?;

    let analysis = Analysis::from_inputs(inputs, config)?;
    out.write_all(tables::render_analysis(&analysis, config.preview_rows).as_bytes())?;
    out.flush()?;

    write_reports(&analysis, config)
}

fn write_quality(
    inputs: &Inputs,
    config: &AnalysisConfig,
    out: &mut dyn Write,
) -> Result<(), AnalysisError> {
    let (sentiment, trades) = inputs.quality();
    out.write_all(tables::heading("Data Quality").as_bytes())?;
    for (report, table) in [(&sentiment, &inputs.sentiment), (&trades, &inputs.trades)] {
        out.write_all(tables::render_quality(report).as_bytes())?;
        if config.show_previews {
            writeln!(out, "{} first {} rows:", table.source, config.preview_rows)?;
            out.write_all(tables::render_preview(table, config.preview_rows).as_bytes())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_reports(
    analysis: &Analysis,
    config: &AnalysisConfig,
) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut written = Vec::new();
    if config.format.writes_svg() {
        written.extend(SvgReportAdapter::new().write(analysis, &config.output_dir)?);
    }
    if config.format.writes_html() {
        #[cfg(feature = "html")]
        written.extend(
            crate::adapters::html_report_adapter::HtmlReportAdapter::new()
                .write(analysis, &config.output_dir)?,
        );
        #[cfg(not(feature = "html"))]
        log::warn!("built without the html feature; skipping HTML report");
    }
    Ok(written)
}

fn run_inspect(config_path: Option<&PathBuf>, overrides: &Overrides) -> ExitCode {
    let mut config = match resolve_config(config_path, overrides) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    config.show_previews = true;

    let adapter = match csv_adapter_for(&config) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    let inputs = match Inputs::load(&adapter) {
        Ok(i) => i,
        Err(e) => return fail(e),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match write_quality(&inputs, &config, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    log::info!("validating config {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    for section in adapter.unknown_sections() {
        log::warn!("{}: ignoring unknown section [{}]", adapter.source(), section);
    }
    if let Err(e) = validate_analysis_config(&adapter) {
        return fail(e);
    }
    let config = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let show = |path: &Option<PathBuf>| {
        path.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    };
    println!("Sentiment file:        {}", show(&config.sentiment_path));
    println!("Trades file:           {}", show(&config.trades_path));
    println!("Duplicate dates:       {}", config.duplicate_policy);
    println!("Consistency threshold: {}", config.consistency_threshold);
    println!("Output directory:      {}", config.output_dir.display());
    println!("Format:                {}", config.format);
    println!("Preview rows:          {}", config.preview_rows);
    println!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "sentitrade",
            "analyze",
            "--sentiment",
            "fg.csv",
            "--trades",
            "trades.csv",
            "--format",
            "svg",
            "--duplicates",
            "fan-out",
            "-o",
            "out",
        ])
        .unwrap();

        match cli.command {
            Command::Analyze {
                sentiment,
                trades,
                config,
                output,
                format,
                duplicates,
            } => {
                assert_eq!(sentiment, Some(PathBuf::from("fg.csv")));
                assert_eq!(trades, Some(PathBuf::from("trades.csv")));
                assert_eq!(config, None);
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(format, Some(OutputFormat::Svg));
                assert_eq!(duplicates, Some(DuplicatePolicy::FanOut));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        let result = Cli::try_parse_from(["sentitrade", "analyze", "--format", "pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn validate_requires_config() {
        assert!(Cli::try_parse_from(["sentitrade", "validate"]).is_err());
        assert!(Cli::try_parse_from(["sentitrade", "validate", "-c", "a.ini"]).is_ok());
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let base = AnalysisConfig {
            sentiment_path: Some(PathBuf::from("from_file.csv")),
            output_dir: PathBuf::from("file_out"),
            ..AnalysisConfig::default()
        };
        let overrides = Overrides {
            trades: Some(PathBuf::from("cli_trades.csv")),
            format: Some(OutputFormat::Console),
            ..Overrides::default()
        };

        let config = overrides.apply(base);
        assert_eq!(config.sentiment_path, Some(PathBuf::from("from_file.csv")));
        assert_eq!(config.trades_path, Some(PathBuf::from("cli_trades.csv")));
        assert_eq!(config.output_dir, PathBuf::from("file_out"));
        assert_eq!(config.format, OutputFormat::Console);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn missing_input_paths_are_config_errors() {
        let err = csv_adapter_for(&AnalysisConfig::default()).err().unwrap();
        assert_eq!(err.exit_status(), 2);
    }
}
