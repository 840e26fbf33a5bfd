//! Compiles a small synthdef, writes it as a `.scsyndef` file, and shows
//! the container bytes.
//!
//! Run with: cargo run -p sintesis-scgf --example write_scsyndef

use sintesis_catalog::Catalog;
use sintesis_graph::{GraphBuilder, Parameter, Signal};
use sintesis_scgf::{SYNTHDEF_EXTENSION, decode_one, encode_one, write_synthdef_file};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::with_builtins();
    let mut builder = GraphBuilder::new("demo_pulse", &catalog);

    let frequency = builder.parameter(Parameter::new("frequency", 220.0).lag(0.02))?;
    let amplitude = builder.parameter(Parameter::new("amplitude", 0.3))?;

    let saw = builder.ugen("VarSaw").input("frequency", frequency).add()?;
    let filtered = builder
        .ugen("RLPF")
        .input("source", saw)
        .input("frequency", 1200.0)
        .input("reciprocal_q", 0.3)
        .add()?;
    let scaled = builder.mul(filtered, amplitude)?;
    builder
        .ugen("Out")
        .input("source", Signal::Vector(vec![scaled.clone(), scaled]))
        .add()?;

    let def = builder.compile()?;
    let bytes = encode_one(&def)?;

    println!(
        "synthdef '{}': {} nodes, {} bytes encoded",
        def.name,
        def.ugens.len(),
        bytes.len()
    );

    print!("header:");
    for byte in bytes.iter().take(16) {
        print!(" {byte:02x}");
    }
    println!();

    let path = std::env::temp_dir().join(format!("{}.{}", def.name, SYNTHDEF_EXTENSION));
    write_synthdef_file(&path, std::slice::from_ref(&def))?;
    println!("wrote {}", path.display());

    let reloaded = decode_one(&bytes, &catalog)?;
    assert_eq!(reloaded, def);
    println!("round trip ok");

    Ok(())
}
