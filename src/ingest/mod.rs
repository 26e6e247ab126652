//! Image ingestion: reading a selected file and encoding it as a data URI

#![allow(dead_code)]

mod file;
mod pipeline;
mod reader;
mod traits;

pub use file::{ImageValue, ParsedImage, RawFile};
pub use pipeline::IngestionPipeline;

#[cfg(test)]
pub use traits::{FileReader, MockFileReader};
