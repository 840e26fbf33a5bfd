//! Decoding containers back into compiled synthdefs.

use sintesis_catalog::{Catalog, Rate};
use sintesis_graph::{Input, ParameterName, SynthDef, Ugen};

use crate::cursor::Reader;
use crate::error::DecodeError;
use crate::{MAGIC, VERSION};

fn read_count(reader: &mut Reader<'_>, table: &'static str) -> Result<usize, DecodeError> {
    let count = reader.read_i32()?;
    usize::try_from(count).map_err(|_| DecodeError::NegativeCount { table })
}

fn read_rate(reader: &mut Reader<'_>) -> Result<Rate, DecodeError> {
    let tag = reader.read_i8()?;
    u8::try_from(tag)
        .ok()
        .and_then(Rate::from_tag)
        .ok_or(DecodeError::InvalidRate(tag))
}

/// Decodes every synthdef in a container.
///
/// The catalog is consulted only to reject unit-generator names the engine
/// would not recognize; arities come from the records themselves. The whole
/// buffer must be consumed, and every decoded graph must satisfy the
/// structural invariants the builder guarantees.
pub fn decode(bytes: &[u8], catalog: &Catalog) -> Result<Vec<SynthDef>, DecodeError> {
    let mut reader = Reader::new(bytes);

    let magic: [u8; 4] = reader.read_array().map_err(|_| DecodeError::Truncated)?;
    if &magic != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let version = reader.read_i32()?;
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    let count = reader.read_i16()?;
    let count = usize::try_from(count).map_err(|_| DecodeError::NegativeCount { table: "synthdef" })?;

    let mut defs = Vec::with_capacity(count);
    for _ in 0..count {
        defs.push(decode_def(&mut reader, catalog)?);
    }

    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes(reader.remaining()));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("scgf_decode: {} synthdef(s) from {} bytes", defs.len(), bytes.len());
    Ok(defs)
}

/// Decodes a container that must hold exactly one synthdef.
pub fn decode_one(bytes: &[u8], catalog: &Catalog) -> Result<SynthDef, DecodeError> {
    let mut defs = decode(bytes, catalog)?;
    if defs.len() != 1 {
        return Err(DecodeError::MultipleSynthDefs(defs.len()));
    }
    Ok(defs.remove(0))
}

fn decode_def(reader: &mut Reader<'_>, catalog: &Catalog) -> Result<SynthDef, DecodeError> {
    let name = reader.read_pstring()?;

    let constant_count = read_count(reader, "constant")?;
    let mut constants = Vec::with_capacity(constant_count.min(4096));
    for _ in 0..constant_count {
        constants.push(reader.read_f32()?);
    }

    let value_count = read_count(reader, "parameter value")?;
    let mut parameter_values = Vec::with_capacity(value_count.min(4096));
    for _ in 0..value_count {
        parameter_values.push(reader.read_f32()?);
    }

    let name_count = read_count(reader, "parameter name")?;
    let mut parameter_names = Vec::with_capacity(name_count.min(4096));
    for _ in 0..name_count {
        let parameter = reader.read_pstring()?;
        let index = reader.read_i32()?;
        let index = usize::try_from(index)
            .map_err(|_| DecodeError::InvalidInputReference(index))?;
        parameter_names.push(ParameterName {
            name: parameter,
            index,
        });
    }

    let ugen_count = read_count(reader, "ugen")?;
    let mut ugens = Vec::with_capacity(ugen_count.min(4096));
    for _ in 0..ugen_count {
        ugens.push(decode_ugen(reader, catalog)?);
    }

    let variants = reader.read_i16()?;
    if variants != 0 {
        return Err(DecodeError::UnsupportedVariants(variants));
    }

    let def = SynthDef {
        name,
        constants,
        parameter_values,
        parameter_names,
        ugens,
    };
    def.validate().map_err(|err| DecodeError::Structure {
        synthdef: def.name.clone(),
        detail: err.to_string(),
    })?;
    Ok(def)
}

fn decode_ugen(reader: &mut Reader<'_>, catalog: &Catalog) -> Result<Ugen, DecodeError> {
    let name = reader.read_pstring()?;
    if !catalog.contains(&name) {
        return Err(DecodeError::UnknownUgen(name));
    }

    let rate = read_rate(reader)?;
    let input_count = read_count(reader, "input")?;
    let output_count = read_count(reader, "output")?;
    let special_index = reader.read_i16()?;

    let mut inputs = Vec::with_capacity(input_count.min(4096));
    for _ in 0..input_count {
        let source = reader.read_i32()?;
        let slot = reader.read_i32()?;
        let slot_index =
            usize::try_from(slot).map_err(|_| DecodeError::InvalidInputReference(slot))?;
        let input = match source {
            -1 => Input::Constant(slot_index),
            node if node >= 0 => Input::Ugen {
                ugen: node as usize,
                output: slot_index,
            },
            bad => return Err(DecodeError::InvalidInputReference(bad)),
        };
        inputs.push(input);
    }

    let mut output_rates = Vec::with_capacity(output_count.min(4096));
    for _ in 0..output_count {
        output_rates.push(read_rate(reader)?);
    }

    Ok(Ugen {
        name,
        rate,
        special_index,
        inputs,
        output_rates,
    })
}
