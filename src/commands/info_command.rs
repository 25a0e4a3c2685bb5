//! Raster summary command

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::config::SamplerConfig;
use crate::errors::RasterResult;
use crate::sampler::RasterSampler;
use crate::tiff::reader::TiffReader;

/// Prints size, geotransform, no-data value and extent of a raster
pub struct InfoCommand {
    input_file: String,
    verbose: bool,
}

impl InfoCommand {
    pub fn new(args: &ArgMatches, _config: &SamplerConfig) -> RasterResult<Self> {
        Ok(InfoCommand {
            input_file: super::input_path(args)?,
            verbose: args.get_flag("verbose"),
        })
    }
}

impl Command for InfoCommand {
    fn execute(&self) -> RasterResult<()> {
        info!("Describing {}", self.input_file);
        let sampler = RasterSampler::open(&self.input_file)?;
        let (width, height) = sampler.raster_size();
        let extent = sampler.geotransform().extent(width, height);

        println!("File: {}", self.input_file);
        println!("Size: {}x{}", width, height);
        println!("Geotransform: {}", sampler.geotransform());
        match sampler.no_data_value() {
            Some(no_data) => println!("No-data: {}", no_data),
            None => println!("No-data: none"),
        }
        println!("Extent: {}, {} - {}, {}", extent.min_x, extent.min_y, extent.max_x, extent.max_y);

        if self.verbose {
            let tiff = TiffReader::new().load(&self.input_file)?;
            print!("{}", tiff);
        }

        Ok(())
    }
}
