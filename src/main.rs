// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use translatable_field::app_config::{self, Config};
use translatable_field::{LocaleCode, RecordId, SubmittedValues, TranslatableFieldManager};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration if missing and create the database schema
    Init,

    /// Print every configured locale value of a field
    Show {
        /// Registered record type
        record_type: String,
        /// Record identifier
        id: String,
        /// Field name
        field: String,
    },

    /// Edit the locale values of a field
    Set {
        /// Registered record type
        record_type: String,
        /// Record identifier
        id: String,
        /// Field name
        field: String,

        /// New value for a locale (repeatable)
        #[arg(long = "value", value_name = "LOCALE=TEXT", value_parser = parse_locale_value)]
        values: Vec<(String, String)>,

        /// Locale whose value is removed (repeatable)
        #[arg(long = "delete", value_name = "LOCALE")]
        deletes: Vec<String>,
    },

    /// Generate shell completions for translatable-field
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// translatable-field - per-locale values of translatable record fields
#[derive(Parser, Debug)]
#[command(name = "translatable-field")]
#[command(version)]
#[command(about = "Read and edit translated record fields")]
#[command(long_about = "Reads and edits the per-locale values of translatable record fields.
The default locale lives on the record's own row, other locales in a personal
or shared translation table.

EXAMPLES:
    translatable-field init                                   # Create conf.json and the schema
    translatable-field show article 42 title                  # Print every locale of a field
    translatable-field set article 42 title --value en=Hi --value de=Hallo --delete fr
    translatable-field completions bash > translatable-field.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. Record types, translation
    entities, locales and the database location are declared there.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// SQLite database file, overrides the configuration
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

fn parse_locale_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((locale, value)) if !locale.trim().is_empty() => {
            Ok((locale.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected LOCALE=TEXT, got '{}'", raw)),
    }
}

// Colored, timestamped logger writing to stderr
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through
    // log::set_max_level once the configuration is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "translatable-field", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let config = load_config(&cli)?;
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }
    config.validate().context("Configuration validation failed")?;

    let manager = TranslatableFieldManager::from_config(&config)?;

    match cli.command {
        Commands::Init => {
            info!("Database ready at {:?}", manager.backend().connection().path());
        }
        Commands::Show {
            record_type,
            id,
            field,
        } => {
            let record = load_record(&manager, &record_type, &id)?;
            for (locale, value) in manager.locale_inputs(&record, &field)? {
                println!("{}: {}", locale, value.as_deref().unwrap_or("(null)"));
            }
        }
        Commands::Set {
            record_type,
            id,
            field,
            values,
            deletes,
        } => {
            let submitted = submitted_values(values, deletes);
            if submitted.is_empty() {
                warn!("Nothing to change, pass --value or --delete");
                return Ok(());
            }

            for locale in submitted.keys() {
                if !manager.locales().contains(locale) {
                    warn!("Locale {} is not configured and will be ignored", locale);
                }
            }

            let mut record = load_record(&manager, &record_type, &id)?;
            manager.persist_submitted(&mut record, &field, &submitted)?;
            info!(
                "Updated {} locale(s) of {} {} field {}",
                submitted.len(),
                record_type,
                id,
                field
            );
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

// Load or create configuration, then apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let config_path = &cli.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(database) = &cli.database {
        config.database_path = Some(database.clone());
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }

    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

fn load_record(
    manager: &TranslatableFieldManager<translatable_field::database::Repository>,
    record_type: &str,
    id: &str,
) -> Result<translatable_field::DynamicRecord> {
    let id: RecordId = id
        .parse()
        .map_err(|_| anyhow!("Invalid record identifier: {}", id))?;
    Ok(manager.backend().load_dynamic_record(record_type, id)?)
}

// --delete wins when a locale is also given a --value
fn submitted_values(values: Vec<(String, String)>, deletes: Vec<String>) -> SubmittedValues {
    let mut submitted = SubmittedValues::new();
    for (locale, value) in values {
        submitted.insert(LocaleCode::new(locale), Some(value));
    }
    for locale in deletes {
        submitted.insert(LocaleCode::new(locale), None);
    }
    submitted
}
