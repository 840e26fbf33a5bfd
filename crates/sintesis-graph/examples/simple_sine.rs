//! Builds a percussive sine synthdef and prints its compiled layout.
//!
//! Run with: cargo run -p sintesis-graph --example simple_sine

use sintesis_catalog::Catalog;
use sintesis_graph::{GraphBuilder, Input, Parameter, Signal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::with_builtins();
    let mut builder = GraphBuilder::new("simple_sine", &catalog);

    let frequency = builder.parameter(Parameter::new("frequency", 440.0))?;
    let amplitude = builder.parameter(Parameter::new("amplitude", 0.2))?;

    let sine = builder.ugen("SinOsc").input("frequency", frequency).add()?;
    let scaled = builder.mul(sine, amplitude)?;

    // Percussive envelope segments with a free-self done action.
    let envelope: Vec<f32> = vec![
        0.0, 2.0, -99.0, -99.0, 1.0, 0.01, 5.0, -4.0, 0.0, 0.3, 5.0, -4.0,
    ];
    let env = builder
        .ugen("EnvGen")
        .input("envelope", envelope)
        .input("done_action", 2.0)
        .add()?;
    let shaped = builder.mul(scaled, env)?;

    builder
        .ugen("Out")
        .input("bus", 0.0)
        .input("source", Signal::Vector(vec![shaped.clone(), shaped]))
        .add()?;

    let def = builder.compile()?;

    println!("synthdef '{}'", def.name);
    println!(
        "  {} nodes, {} constants, {} parameter(s)\n",
        def.ugens.len(),
        def.constants.len(),
        def.parameter_names.len()
    );

    println!("{:<4} {:<14} {:>8} {:>8} {:>8}", "#", "ugen", "rate", "ins", "outs");
    for (index, ugen) in def.ugens.iter().enumerate() {
        println!(
            "{:<4} {:<14} {:>8} {:>8} {:>8}",
            index,
            ugen.name,
            ugen.rate.to_string(),
            ugen.inputs.len(),
            ugen.output_rates.len()
        );
    }

    println!("\nconstants: {:?}", def.constants);
    for parameter in &def.parameter_names {
        println!(
            "parameter '{}' -> value[{}] = {}",
            parameter.name, parameter.index, def.parameter_values[parameter.index]
        );
    }

    // Every input must point backwards; show the wiring of the last node.
    let last = def.ugens.len() - 1;
    for input in &def.ugens[last].inputs {
        match input {
            Input::Constant(index) => println!("out <- constant {}", def.constants[*index]),
            Input::Ugen { ugen, output } => {
                println!("out <- node {} ({}) output {}", ugen, def.ugens[*ugen].name, output);
            }
        }
    }

    Ok(())
}
