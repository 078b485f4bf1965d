#![doc(hidden)]
//! Library of readers and common functions for the `.mili` sidecar

// internal modules
use crate::error::Result;

// standard library
use std::path::Path;

// files under the readers module
mod json_file;
pub mod parsers;

// inline important reader types for a nice API
#[doc(inline)]
pub use crate::readers::json_file::{MiliInfo, MiliJsonReader};

/// Read the metadata of a family from its `.mili` sidecar
///
/// Returns the [MiliInfo] extracted from the JSON file at `path` without
/// opening any of the family databases.
///
/// - `path` - Path to the sidecar, can be [&str], [String], [Path], etc...
///
/// Example
/// ```ignore
/// let info = mili::read_mili_info("path/to/d3samp6.mili")?;
/// println!("{} domains", info.n_domains);
/// ```
pub fn read_mili_info<P: AsRef<Path>>(path: P) -> Result<MiliInfo> {
    MiliJsonReader::new().parse(path.as_ref())
}
