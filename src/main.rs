use clap::{Arg, Command as ClapCommand, ArgAction};
use std::process;
use log::{error, Level};

use meshraster::config::SamplerConfig;
use meshraster::utils::logger::Logger;
use meshraster::commands::{CommandFactory, MeshrasterCommandFactory};

fn main() {
    let matches = ClapCommand::new("meshraster")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Sample GeoTIFF rasters by world coordinate")
        .arg(
            Arg::new("input")
                .help("Input GeoTIFF file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML configuration file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("coordinate")
                .long("coordinate")
                .help("World coordinate to sample in 'x,y' format")
                .value_name("COORDINATE")
                .allow_hyphen_values(true)
                .required(false),
        )
        .arg(
            Arg::new("bbox")
                .long("bbox")
                .help("Aggregate value over a bounding box (minx,miny,maxx,maxy)")
                .value_name("BBOX")
                .allow_hyphen_values(true)
                .required(false),
        )
        .arg(
            Arg::new("aggregate")
                .long("aggregate")
                .help("Window statistic for --bbox (mean, mode)")
                .value_name("METHOD")
                .required(false),
        )
        .arg(
            Arg::new("fallback")
                .long("fallback")
                .help("Average valid neighbours when the sampled cell has no value")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mask")
                .long("mask")
                .help("Raster of the same size; cells without data there read as no value")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("burn")
                .long("burn")
                .help("Set every cell that has data to this value")
                .value_name("VALUE")
                .allow_hyphen_values(true)
                .requires("output")
                .required(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output GeoTIFF file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .help("Output compression (none, deflate, zstd)")
                .value_name("NAME")
                .required(false),
        )
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => match SamplerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => SamplerConfig::default(),
    };

    let level = if matches.get_flag("verbose") { Level::Debug } else { config.logging.level };
    if let Err(e) = Logger::init_global_logger(&config.logging.file, level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = MeshrasterCommandFactory::new();

    match factory.create_command(&matches, &config) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
