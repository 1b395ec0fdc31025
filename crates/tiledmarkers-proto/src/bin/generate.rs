//! Regenerates `src/generated/mod.rs` from `proto/vector_tile.proto`.
//!
//! Run with: `cargo run -p tiledmarkers-proto --bin generate`

use std::{env, fs, io, path::Path};

const HEADER: &str = "// Generated protobuf types. Do not edit manually.
// Regenerate with: cargo run -p tiledmarkers-proto --bin generate

#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]

";

fn main() -> io::Result<()> {
    let crate_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let proto_dir = crate_dir.join("proto");
    let scratch = env::temp_dir().join("tiledmarkers-proto");
    fs::create_dir_all(&scratch)?;

    prost_build::Config::new()
        .out_dir(&scratch)
        .compile_protos(&[proto_dir.join("vector_tile.proto")], &[&proto_dir])?;

    // Package `vector_tile` is written to `vector_tile.rs`.
    let types = fs::read_to_string(scratch.join("vector_tile.rs"))?;
    let target = crate_dir.join("src/generated/mod.rs");
    fs::write(&target, format!("{HEADER}{types}"))?;

    println!("wrote {}", target.display());
    Ok(())
}
