// fitcrop/src/processors/mod.rs
pub mod codec;
mod compositor;
mod compressor;
mod loader;
mod resizer;
mod batch;

pub use codec::{filter_type, ImageCodec, ImageCrateCodec, SourceImage};
pub use compositor::{centre_offset, compose};
pub use compressor::Compressor;
pub use loader::{Fetcher, Loader, MemoryFetcher};
pub use resizer::{fill_dimensions, fit_dimensions, plan, Geometry, Resizer};
pub use batch::BatchProcessor;

pub mod prelude {
    pub use super::{BatchProcessor, Compressor, ImageCodec, ImageCrateCodec, Loader, Resizer};
}
