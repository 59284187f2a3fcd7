pub mod args;
pub mod audio;
pub mod config;
pub mod dataset;
pub mod driver;
pub mod error;
pub mod slicer;
pub mod storage;

pub use config::PrepConfig;
pub use dataset::{FileRange, SliceJob, SlicedData};
pub use driver::{run_all, Channel, Split, SplitSummary};
pub use error::PrepError;
pub use slicer::{WindowConfig, WindowTable};
