pub mod cli;
pub mod toml_config;

use crate::core::crossref::DEFAULT_API_ENDPOINT;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_path: String,
    pub output_path: String,
    pub api_endpoint: String,
    pub mailto: Option<String>,
    pub delimiter: u8,
    pub verbose: bool,
    pub log_format: LogFormat,
}

impl RunConfig {
    pub fn new(input_path: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            mailto: None,
            delimiter: b',',
            verbose: false,
            log_format: LogFormat::Compact,
        }
    }
}

impl ConfigProvider for RunConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn mailto(&self) -> Option<&str> {
        self.mailto.as_deref()
    }

    fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input_path)?;
        validation::validate_path("output", &self.output_path)?;
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        if let Some(mailto) = &self.mailto {
            validation::validate_non_empty_string("mailto", mailto)?;
        }
        Ok(())
    }
}

#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "ref-matcher"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Match reference strings against Crossref metadata")
)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Input table; the first column is the row index
    #[cfg_attr(feature = "cli", arg(long))]
    pub input: String,

    /// Output table, written without the index column
    #[cfg_attr(feature = "cli", arg(long))]
    pub output: String,

    /// Crossref works endpoint [default: https://api.crossref.org/works]
    #[cfg_attr(feature = "cli", arg(long))]
    pub api_endpoint: Option<String>,

    /// Contact address sent in the User-Agent (Crossref polite pool)
    #[cfg_attr(feature = "cli", arg(long))]
    pub mailto: Option<String>,

    /// Field delimiter for input and output; use "\t" for TSV [default: ,]
    #[cfg_attr(feature = "cli", arg(long))]
    pub delimiter: Option<String>,

    /// TOML configuration file; command line flags take precedence
    #[cfg_attr(feature = "cli", arg(long))]
    pub config: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(&self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                file
            }
            None => TomlConfig::default(),
        };

        let mut config = RunConfig::new(self.input.clone(), self.output.clone());

        if let Some(endpoint) = self.api_endpoint.clone().or(file.api.endpoint) {
            config.api_endpoint = endpoint;
        }
        config.mailto = self.mailto.clone().or(file.api.mailto);
        if let Some(delimiter) = self.delimiter.as_deref().or(file.io.delimiter.as_deref()) {
            config.delimiter = validation::parse_delimiter("delimiter", delimiter)?;
        }
        config.verbose = self.verbose || file.logging.verbose.unwrap_or(false);
        config.log_format = file
            .logging
            .format
            .as_deref()
            .and_then(LogFormat::parse)
            .unwrap_or_default();

        config.validate()?;
        Ok(config)
    }
}
