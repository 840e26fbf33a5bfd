//! Encoding compiled synthdefs into the container format.

use sintesis_graph::{Input, SynthDef};

use crate::cursor::Writer;
use crate::error::EncodeError;
use crate::{MAGIC, VERSION};

fn table_len(table: &'static str, len: usize, limit: usize) -> Result<i32, EncodeError> {
    if len > limit {
        return Err(EncodeError::TableTooLarge { table, len });
    }
    Ok(len as i32)
}

/// Encodes one or more synthdefs into a single container.
///
/// Encoding is a pure function of its input: the same synthdefs always
/// produce identical bytes.
pub fn encode(defs: &[SynthDef]) -> Result<Vec<u8>, EncodeError> {
    let count = table_len("synthdef", defs.len(), i16::MAX as usize)?;

    let mut writer = Writer::with_capacity(64 * defs.len().max(1));
    writer.write_bytes(MAGIC);
    writer.write_i32(VERSION);
    writer.write_i16(count as i16);
    for def in defs {
        encode_def(&mut writer, def)?;
    }

    let bytes = writer.into_vec();
    #[cfg(feature = "tracing")]
    tracing::debug!("scgf_encode: {} synthdef(s), {} bytes", defs.len(), bytes.len());
    Ok(bytes)
}

/// Encodes a single synthdef into its own container.
pub fn encode_one(def: &SynthDef) -> Result<Vec<u8>, EncodeError> {
    encode(std::slice::from_ref(def))
}

fn encode_def(writer: &mut Writer, def: &SynthDef) -> Result<(), EncodeError> {
    writer.write_pstring(&def.name)?;

    writer.write_i32(table_len(
        "constant",
        def.constants.len(),
        i32::MAX as usize,
    )?);
    for &constant in &def.constants {
        writer.write_f32(constant);
    }

    writer.write_i32(table_len(
        "parameter value",
        def.parameter_values.len(),
        i32::MAX as usize,
    )?);
    for &value in &def.parameter_values {
        writer.write_f32(value);
    }

    writer.write_i32(table_len(
        "parameter name",
        def.parameter_names.len(),
        i32::MAX as usize,
    )?);
    for parameter in &def.parameter_names {
        writer.write_pstring(&parameter.name)?;
        writer.write_i32(parameter.index as i32);
    }

    writer.write_i32(table_len("ugen", def.ugens.len(), i32::MAX as usize)?);
    for ugen in &def.ugens {
        writer.write_pstring(&ugen.name)?;
        writer.write_i8(ugen.rate.tag() as i8);
        writer.write_i32(table_len("input", ugen.inputs.len(), i32::MAX as usize)?);
        writer.write_i32(table_len(
            "output",
            ugen.output_rates.len(),
            i32::MAX as usize,
        )?);
        writer.write_i16(ugen.special_index);
        for input in &ugen.inputs {
            match *input {
                Input::Constant(index) => {
                    writer.write_i32(-1);
                    writer.write_i32(index as i32);
                }
                Input::Ugen { ugen, output } => {
                    writer.write_i32(ugen as i32);
                    writer.write_i32(output as i32);
                }
            }
        }
        for &rate in &ugen.output_rates {
            writer.write_i8(rate.tag() as i8);
        }
    }

    // Variant records are not modeled; the engine still expects the count.
    writer.write_i16(0);
    Ok(())
}
