pub mod descriptor;
pub mod error;
pub mod identity;
pub mod io;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod segment;
pub mod sources;

pub use error::{IngestError, Result};
