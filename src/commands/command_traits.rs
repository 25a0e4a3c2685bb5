//! Command pattern interfaces
//!
//! Each CLI mode is a `Command`; a `CommandFactory` picks and builds the
//! command matching the parsed arguments.

use crate::config::SamplerConfig;
use crate::errors::RasterResult;

/// An executable CLI operation
pub trait Command {
    fn execute(&self) -> RasterResult<()>;
}

/// Builds commands from CLI arguments
pub trait CommandFactory {
    /// Create the command selected by `args`, with `config` supplying
    /// defaults for options not given on the command line
    fn create_command(&self, args: &clap::ArgMatches, config: &SamplerConfig) -> RasterResult<Box<dyn Command>>;
}
