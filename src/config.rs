//! Sampler configuration
//!
//! Loaded from a TOML document with three optional tables:
//!
//! ```toml
//! [sampler]
//! edge_clamp = true
//! neighbour_fallback = false
//! aggregate = "mean"
//!
//! [output]
//! compression = "deflate"
//! rows_per_strip = 64
//!
//! [logging]
//! file = "meshraster.log"
//! level = "info"
//! ```
//!
//! Missing keys keep their defaults.

use std::fs;
use log::{debug, Level};

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::errors::{RasterError, RasterResult};
use crate::utils::logger::parse_level;

/// Statistic computed over the valid cells of a pixel window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowAggregate {
    #[default]
    Mean,
    /// Most frequent value, smallest on ties
    Mode,
}

impl WindowAggregate {
    pub fn from_name(name: &str) -> RasterResult<Self> {
        match name.to_lowercase().as_str() {
            "mean" => Ok(WindowAggregate::Mean),
            "mode" => Ok(WindowAggregate::Mode),
            _ => Err(RasterError::ConfigError(format!("Unknown window aggregate: {}", name))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WindowAggregate::Mean => "mean",
            WindowAggregate::Mode => "mode",
        }
    }
}

/// Lookup behaviour of the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerOptions {
    /// Pull indices one past the edge back onto the raster
    pub edge_clamp: bool,
    /// Average valid neighbours when a cell holds no-data
    pub neighbour_fallback: bool,
    pub aggregate: WindowAggregate,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        SamplerOptions { edge_clamp: true, neighbour_fallback: false, aggregate: WindowAggregate::Mean }
    }
}

/// How rasters are written back to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Compression name understood by `CompressionFactory::handler_by_name`
    pub compression: String,
    pub rows_per_strip: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig { compression: "deflate".to_string(), rows_per_strip: 64 }
    }
}

impl OutputConfig {
    pub fn compression_handler(&self) -> RasterResult<Box<dyn CompressionHandler>> {
        CompressionFactory::handler_by_name(&self.compression)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub file: String,
    pub level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { file: "meshraster.log".to_string(), level: Level::Info }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplerConfig {
    pub sampler: SamplerOptions,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl SamplerConfig {
    /// Parses a configuration document
    pub fn from_str(content: &str) -> RasterResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| RasterError::ConfigError(format!("Failed to parse TOML: {}", e)))?;

        let mut config = SamplerConfig::default();

        if let Some(table) = toml_value.get("sampler") {
            if let Some(v) = get_bool(table, "sampler", "edge_clamp")? {
                config.sampler.edge_clamp = v;
            }
            if let Some(v) = get_bool(table, "sampler", "neighbour_fallback")? {
                config.sampler.neighbour_fallback = v;
            }
            if let Some(name) = get_str(table, "sampler", "aggregate")? {
                config.sampler.aggregate = WindowAggregate::from_name(name)?;
            }
        }

        if let Some(table) = toml_value.get("output") {
            if let Some(name) = get_str(table, "output", "compression")? {
                // reject unknown codecs at load time rather than at write time
                CompressionFactory::handler_by_name(name)?;
                config.output.compression = name.to_lowercase();
            }
            if let Some(rows) = table.get("rows_per_strip") {
                config.output.rows_per_strip = rows.as_integer()
                    .filter(|r| *r > 0 && *r <= u32::MAX as i64)
                    .ok_or_else(|| RasterError::ConfigError(
                        "output.rows_per_strip must be a positive integer".to_string()))? as u32;
            }
        }

        if let Some(table) = toml_value.get("logging") {
            if let Some(file) = get_str(table, "logging", "file")? {
                config.logging.file = file.to_string();
            }
            if let Some(level) = get_str(table, "logging", "level")? {
                config.logging.level = parse_level(level)
                    .ok_or_else(|| RasterError::ConfigError(format!("Unknown log level: {}", level)))?;
            }
        }

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Reads and parses a configuration file
    pub fn from_file(path: &str) -> RasterResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| RasterError::ConfigError(format!("Cannot read {}: {}", path, e)))?;
        Self::from_str(&content)
    }
}

fn get_bool(table: &toml::Value, section: &str, key: &str) -> RasterResult<Option<bool>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value.as_bool()
            .map(Some)
            .ok_or_else(|| RasterError::ConfigError(format!("{}.{} must be a boolean", section, key))),
    }
}

fn get_str<'a>(table: &'a toml::Value, section: &str, key: &str) -> RasterResult<Option<&'a str>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value.as_str()
            .map(Some)
            .ok_or_else(|| RasterError::ConfigError(format!("{}.{} must be a string", section, key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = SamplerConfig::from_str("").unwrap();
        assert_eq!(config, SamplerConfig::default());
        assert!(config.sampler.edge_clamp);
        assert_eq!(config.sampler.aggregate, WindowAggregate::Mean);
        assert_eq!(config.output.compression, "deflate");
    }

    #[test]
    fn test_full_document() {
        let config = SamplerConfig::from_str(r#"
            [sampler]
            edge_clamp = false
            neighbour_fallback = true
            aggregate = "Mode"

            [output]
            compression = "ZSTD"
            rows_per_strip = 16

            [logging]
            file = "run.log"
            level = "debug"
        "#).unwrap();

        assert!(!config.sampler.edge_clamp);
        assert!(config.sampler.neighbour_fallback);
        assert_eq!(config.sampler.aggregate, WindowAggregate::Mode);
        assert_eq!(config.output.compression, "zstd");
        assert_eq!(config.output.rows_per_strip, 16);
        assert_eq!(config.output.compression_handler().unwrap().code(), 14);
        assert_eq!(config.logging.file, "run.log");
        assert_eq!(config.logging.level, Level::Debug);
    }

    #[test]
    fn test_unknown_compression_is_rejected() {
        let result = SamplerConfig::from_str("[output]\ncompression = \"lzw\"\n");
        assert!(matches!(result, Err(RasterError::ConfigError(_))));
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        assert!(SamplerConfig::from_str("[sampler]\nedge_clamp = \"yes\"\n").is_err());
        assert!(SamplerConfig::from_str("[output]\nrows_per_strip = 0\n").is_err());
        assert!(SamplerConfig::from_str("[sampler]\naggregate = \"median\"\n").is_err());
        assert!(SamplerConfig::from_str("[sampler]\naggregate = 1\n").is_err());
        assert!(SamplerConfig::from_str("[logging]\nlevel = \"chatty\"\n").is_err());
        assert!(SamplerConfig::from_str("not toml [").is_err());
    }
}
