//! CLI command implementations

pub mod command_traits;
pub mod info_command;
pub mod sample_command;
pub mod burn_command;

pub use command_traits::{Command, CommandFactory};
pub use info_command::InfoCommand;
pub use sample_command::SampleCommand;
pub use burn_command::BurnCommand;

use clap::ArgMatches;

use crate::config::SamplerConfig;
use crate::errors::{RasterError, RasterResult};

/// Chooses the command from the mode flags: `--burn`, then `--coordinate`
/// or `--bbox`, otherwise `info`
pub struct MeshrasterCommandFactory;

impl MeshrasterCommandFactory {
    pub fn new() -> Self {
        MeshrasterCommandFactory
    }
}

impl Default for MeshrasterCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for MeshrasterCommandFactory {
    fn create_command(&self, args: &ArgMatches, config: &SamplerConfig) -> RasterResult<Box<dyn Command>> {
        if args.contains_id("burn") {
            Ok(Box::new(BurnCommand::new(args, config)?))
        } else if args.contains_id("coordinate") || args.contains_id("bbox") {
            Ok(Box::new(SampleCommand::new(args, config)?))
        } else {
            Ok(Box::new(InfoCommand::new(args, config)?))
        }
    }
}

/// The required positional input path
pub(crate) fn input_path(args: &ArgMatches) -> RasterResult<String> {
    args.get_one::<String>("input")
        .cloned()
        .ok_or_else(|| RasterError::GenericError("Missing input file".to_string()))
}

/// Parses "x,y" into a world coordinate pair
pub fn parse_coordinate(text: &str) -> RasterResult<(f64, f64)> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 2 {
        return Err(RasterError::GenericError(format!("Coordinate must be 'x,y', got '{}'", text)));
    }

    let parse = |s: &str| s.trim().parse::<f64>()
        .map_err(|_| RasterError::GenericError(format!("Invalid coordinate value '{}'", s.trim())));
    Ok((parse(parts[0])?, parse(parts[1])?))
}

/// Formats a sampled value, printing NaN as "nodata"
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "nodata".to_string()
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("4.5, -2").unwrap(), (4.5, -2.0));
        assert!(parse_coordinate("4.5").is_err());
        assert!(parse_coordinate("x,1").is_err());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(f64::NAN), "nodata");
        assert_eq!(format_value(12.5), "12.5");
    }
}
