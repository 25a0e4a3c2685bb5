pub mod errors;
pub mod io;
pub mod tiff;
pub mod compression;
pub mod band;
pub mod dataset;
pub mod coordinate;
pub mod sampler;
pub mod mask;
pub mod config;
pub mod commands;
pub mod utils;

pub use errors::{RasterError, RasterResult};
pub use sampler::RasterSampler;
pub use config::{SamplerConfig, SamplerOptions, OutputConfig, WindowAggregate};
pub use dataset::{GeoTiffDataset, MemDataset, RasterBand, RasterDataset};
pub use coordinate::{BoundingBox, GeoTransform, PixelWindow};
pub use tiff::TiffReader;
