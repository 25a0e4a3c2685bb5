//! Band overwrite command

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::compression::CompressionFactory;
use crate::config::{OutputConfig, SamplerConfig};
use crate::dataset::{GeoTiffDataset, RasterDataset};
use crate::errors::{RasterError, RasterResult};
use crate::sampler::{sanitize, RasterSampler};

/// Sets every cell that has data to a constant and saves the result
pub struct BurnCommand {
    input_file: String,
    output_file: String,
    value: f32,
    output: OutputConfig,
}

impl BurnCommand {
    pub fn new(args: &ArgMatches, config: &SamplerConfig) -> RasterResult<Self> {
        let value = args.get_one::<String>("burn")
            .ok_or_else(|| RasterError::GenericError("Missing burn value".to_string()))?;
        let value = value.trim().parse::<f32>()
            .map_err(|_| RasterError::GenericError(format!("Invalid burn value '{}'", value)))?;

        let output_file = args.get_one::<String>("output")
            .cloned()
            .ok_or_else(|| RasterError::GenericError("--burn requires --output".to_string()))?;

        let mut output = config.output.clone();
        if let Some(name) = args.get_one::<String>("compression") {
            CompressionFactory::handler_by_name(name)?;
            output.compression = name.to_lowercase();
        }

        Ok(BurnCommand {
            input_file: super::input_path(args)?,
            output_file,
            value,
            output,
        })
    }
}

/// `data` with every cell holding a value replaced by `value`
pub fn burn_values(data: &[f32], value: f32, no_data: Option<f64>) -> Vec<f32> {
    data.iter()
        .map(|cell| if sanitize(*cell, no_data).is_nan() { *cell } else { value })
        .collect()
}

impl Command for BurnCommand {
    fn execute(&self) -> RasterResult<()> {
        let dataset = GeoTiffDataset::open(&self.input_file)?.with_progress(true);
        let mut sampler = RasterSampler::new(dataset)?;
        let (width, height) = sampler.raster_size();

        let current = sampler.dataset_mut().rasterband(1)?.read_band()?;
        let burned = burn_values(&current, self.value, sampler.no_data_value());
        sampler.set_band(burned, width, height)?;

        sampler.dataset_mut().save_as(&self.output_file, &self.output)?;
        info!("Burned {} into {} and wrote {}", self.value, self.input_file, self.output_file);
        println!("Wrote {}", self.output_file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burn_keeps_no_data_cells() {
        let burned = burn_values(&[1.0, -9999.0, 3.0, f32::NAN], 7.0, Some(-9999.0));
        assert_eq!(&burned[..3], &[7.0, -9999.0, 7.0]);
        assert!(burned[3].is_nan());
    }
}
