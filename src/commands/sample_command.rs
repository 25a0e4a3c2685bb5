//! Point and window sampling command

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::Command;
use crate::commands::{format_value, parse_coordinate};
use crate::config::{SamplerConfig, SamplerOptions, WindowAggregate};
use crate::coordinate::BoundingBox;
use crate::dataset::GeoTiffDataset;
use crate::errors::{RasterError, RasterResult};
use crate::mask;
use crate::sampler::RasterSampler;

/// Looks up the value at a coordinate, or aggregates a bounding box
pub struct SampleCommand {
    input_file: String,
    coordinate: Option<(f64, f64)>,
    bbox: Option<BoundingBox>,
    mask_file: Option<String>,
    options: SamplerOptions,
}

impl SampleCommand {
    pub fn new(args: &ArgMatches, config: &SamplerConfig) -> RasterResult<Self> {
        let coordinate = args.get_one::<String>("coordinate")
            .map(|text| parse_coordinate(text))
            .transpose()?;
        let bbox = args.get_one::<String>("bbox")
            .map(|text| BoundingBox::from_string(text).map_err(RasterError::GenericError))
            .transpose()?;

        let mut options = config.sampler;
        if args.get_flag("fallback") {
            options.neighbour_fallback = true;
        }
        if let Some(name) = args.get_one::<String>("aggregate") {
            options.aggregate = WindowAggregate::from_name(name)?;
        }

        Ok(SampleCommand {
            input_file: super::input_path(args)?,
            coordinate,
            bbox,
            mask_file: args.get_one::<String>("mask").cloned(),
            options,
        })
    }
}

impl Command for SampleCommand {
    fn execute(&self) -> RasterResult<()> {
        let dataset = GeoTiffDataset::open(&self.input_file)?;
        let mut sampler = RasterSampler::with_options(dataset, self.options)?;

        if let Some(mask_file) = &self.mask_file {
            let (width, height) = sampler.raster_size();
            sampler.set_mask(mask::load_mask(mask_file, width, height)?)?;
        }

        if let Some((x, y)) = self.coordinate {
            let (px, py) = sampler.world_to_pixel(x, y);
            debug!("({}, {}) -> pixel ({}, {})", x, y, px, py);

            let value = if self.options.neighbour_fallback {
                sampler.lookup_with_fallback(x, y)?
            } else {
                sampler.lookup(x, y)?
            };
            info!("Value at ({}, {}): {}", x, y, value);
            println!("{}", format_value(value));
        }

        if let Some(bbox) = &self.bbox {
            let (width, height) = sampler.raster_size();
            let window = sampler.geotransform().bbox_to_pixel_window(bbox, width, height);
            debug!("Bounding box {:?} -> window {:?}", bbox, window);

            let value = sampler.window_aggregate(&window)?;
            info!("Window {} over {:?}: {}", self.options.aggregate.name(), window, value);
            println!("{}", format_value(value));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command as ClapCommand};

    fn parse(args: &[&str]) -> ArgMatches {
        ClapCommand::new("meshraster")
            .arg(Arg::new("input").index(1))
            .arg(Arg::new("coordinate").long("coordinate").allow_hyphen_values(true))
            .arg(Arg::new("bbox").long("bbox").allow_hyphen_values(true))
            .arg(Arg::new("fallback").long("fallback").action(ArgAction::SetTrue))
            .arg(Arg::new("mask").long("mask"))
            .arg(Arg::new("aggregate").long("aggregate"))
            .try_get_matches_from(args)
            .unwrap()
    }

    #[test]
    fn test_aggregate_flag_overrides_config() {
        let config = SamplerConfig::default();
        let command = SampleCommand::new(&parse(&["meshraster", "in.tif", "--bbox", "0,0,1,1", "--aggregate", "mode"]), &config).unwrap();
        assert_eq!(command.options.aggregate, WindowAggregate::Mode);
        assert_eq!(command.bbox, Some(BoundingBox::new(0.0, 0.0, 1.0, 1.0)));

        let mut config = SamplerConfig::default();
        config.sampler.aggregate = WindowAggregate::Mode;
        let command = SampleCommand::new(&parse(&["meshraster", "in.tif", "--bbox", "0,0,1,1"]), &config).unwrap();
        assert_eq!(command.options.aggregate, WindowAggregate::Mode);
    }

    #[test]
    fn test_unknown_aggregate_is_rejected() {
        let args = parse(&["meshraster", "in.tif", "--bbox", "0,0,1,1", "--aggregate", "median"]);
        assert!(SampleCommand::new(&args, &SamplerConfig::default()).is_err());
    }
}
