//! Generates the codecs under test into `OUT_DIR`.

#[path = "schema.rs"]
mod schema;

use std::path::PathBuf;
use std::{env, fs};

use binidl_codegen::{generate, init_tracing, GeneratorConfig, LOG_ENV};
use binidl_ir::Endian;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=schema.rs");
    println!("cargo:rerun-if-env-changed={LOG_ENV}");
    init_tracing();

    let graph = schema::schema()?;
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let variants = [
        ("le.rs", GeneratorConfig::default()),
        ("be.rs", GeneratorConfig::default().with_endian(Endian::Big)),
        (
            "stream.rs",
            GeneratorConfig::default()
                .with_static_threshold(0)
                .with_pools(false),
        ),
    ];
    for (file, config) in variants {
        let generated = generate(&graph, &config)?;
        fs::write(out_dir.join(file), generated.source)?;
    }
    Ok(())
}
