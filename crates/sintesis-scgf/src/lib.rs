//! Binary synthdef container codec.
//!
//! Encodes compiled [`SynthDef`](sintesis_graph::SynthDef) graphs into the
//! versioned container the synthesis engine loads, and decodes such
//! containers back into structurally equal graphs. The layout is bit-exact:
//! field order, integer widths, and constant deduplication all match the
//! engine's reader, so nothing here may be rearranged without breaking both
//! the engine and round-trip decoding.
//!
//! # Container layout
//!
//! All integers big-endian; `pstring` is a one-byte length prefix followed
//! by UTF-8 bytes.
//!
//! ```text
//! "SCgf"                magic
//! i32  version (2)
//! i16  synthdef count
//! per synthdef:
//!   pstring name
//!   i32  constant count,        f32 per constant
//!   i32  parameter value count, f32 per value
//!   i32  parameter name count,  (pstring, i32 value index) per name
//!   i32  ugen count, per ugen:
//!     pstring name
//!     i8   calculation rate
//!     i32  input count
//!     i32  output count
//!     i16  special index
//!     per input:  i32 source ugen (-1 for constant), i32 output slot or
//!                 constant index
//!     per output: i8 calculation rate
//!   i16  variant count (always 0)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sintesis_catalog::Catalog;
//! use sintesis_graph::GraphBuilder;
//! use sintesis_scgf::{decode_one, encode_one};
//!
//! let catalog = Catalog::with_builtins();
//! let mut builder = GraphBuilder::new("beep", &catalog);
//! let osc = builder.ugen("SinOsc").add()?;
//! builder.ugen("Out").input("source", osc).add()?;
//! let def = builder.compile()?;
//!
//! let bytes = encode_one(&def)?;
//! assert_eq!(&bytes[..4], b"SCgf");
//! assert_eq!(decode_one(&bytes, &catalog)?, def);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cursor;
mod decode;
mod encode;
mod error;
mod file;

pub use decode::{decode, decode_one};
pub use encode::{encode, encode_one};
pub use error::{DecodeError, EncodeError, FileError};
pub use file::{SYNTHDEF_EXTENSION, read_synthdef_file, write_synthdef_file};

/// Magic bytes opening every container.
pub const MAGIC: &[u8; 4] = b"SCgf";

/// Container version this codec reads and writes.
pub const VERSION: i32 = 2;
