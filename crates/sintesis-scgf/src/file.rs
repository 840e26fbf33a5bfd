//! Reading and writing `.scsyndef` files.
//!
//! Thin wrappers over the byte codec for the on-disk form the engine loads
//! from its synthdef directories.

use std::path::Path;

use sintesis_catalog::Catalog;
use sintesis_graph::SynthDef;

use crate::decode::decode;
use crate::encode::encode;
use crate::error::FileError;

/// Conventional file extension for synthdef containers.
pub const SYNTHDEF_EXTENSION: &str = "scsyndef";

/// Encodes synthdefs and writes them to a container file.
pub fn write_synthdef_file<P: AsRef<Path>>(path: P, defs: &[SynthDef]) -> Result<(), FileError> {
    let bytes = encode(defs)?;
    std::fs::write(path.as_ref(), &bytes)
        .map_err(|source| FileError::write(path.as_ref(), source))?;
    #[cfg(feature = "tracing")]
    tracing::debug!(
        "scgf_write: {} synthdef(s) to {}",
        defs.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Reads a container file and decodes every synthdef in it.
pub fn read_synthdef_file<P: AsRef<Path>>(
    path: P,
    catalog: &Catalog,
) -> Result<Vec<SynthDef>, FileError> {
    let bytes = std::fs::read(path.as_ref())
        .map_err(|source| FileError::read(path.as_ref(), source))?;
    Ok(decode(&bytes, catalog)?)
}
