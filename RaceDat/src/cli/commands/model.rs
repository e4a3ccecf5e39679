//! Model CLI commands
//!
//! Commands for inspecting a single `.dat` file and dumping it as JSON.

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{CUBE, DISK, LOOKING_GLASS, print_done, print_step};
use crate::formats::dat::{
    DecodeOptions, TransformLocator, extract_dat_info_json, inspect_dat, parse_dat_bytes,
};
use crate::scene::assemble;

/// Inspect a model and display its structure.
pub fn inspect(path: &Path, options: &DecodeOptions) -> anyhow::Result<()> {
    println!("Inspecting model: {}", path.display());
    println!();

    let info = inspect_dat(path, options)?;

    println!("Model Information");
    println!("=================");
    println!("Variant:     {}", info.variant);
    println!("File size:   {} bytes", info.file_size);
    if !info.signatures.is_empty() {
        println!("Signatures:  {}", info.signatures.join(", "));
    }
    println!("Stride:      {} bytes", info.stride);
    println!("Vertices:    {}", info.vertex_count);
    println!(
        "Indices:     {} ({}-byte)",
        info.index_count, info.index_width
    );
    println!("Triangles:   {}", info.triangle_count());
    println!("Trailing at: {}", info.trailing_offset);
    println!();

    match &info.skeleton {
        Some(skel) => {
            println!("Skeleton: {} bones, {} trailing floats", skel.bone_count, skel.trailer_len);
            for (i, bone) in skel.bones.iter().enumerate() {
                println!("  [{i:3}] {:32} parent {:3}", bone.name, bone.parent_index);
            }
        }
        None => println!("Skeleton: None"),
    }
    println!();

    println!("Meshes ({}):", info.meshes.len());
    for mesh in &info.meshes {
        let frame = mesh
            .translation
            .map_or_else(|| "no frame".to_string(), |t| format!("at ({:.3}, {:.3}, {:.3})", t[0], t[1], t[2]));
        println!("  - {} ({} vertices, {frame})", mesh.name, mesh.vert_count);
        for part in &mesh.parts {
            println!(
                "      {} [{}..={}] {} triangles",
                part.label, part.first_vert_index, part.last_vert_index, part.triangle_count
            );
        }
    }

    if !info.diagnostics.is_empty() {
        println!();
        println!("Diagnostics ({}):", info.diagnostics.len());
        for diagnostic in &info.diagnostics {
            println!("  ! {diagnostic}");
        }
    }

    Ok(())
}

/// Write the model summary to JSON.
pub fn extract_json(path: &Path, output: &Path, options: &DecodeOptions) -> anyhow::Result<()> {
    println!("Extracting model info to JSON: {}", path.display());

    extract_dat_info_json(path, output, options)?;

    println!("Written to: {}", output.display());
    Ok(())
}

/// Decode, assemble and write the scene as JSON.
pub fn write_scene(path: &Path, output: &Path, options: &DecodeOptions) -> anyhow::Result<()> {
    let start = Instant::now();

    print_step(1, 3, LOOKING_GLASS, "Decoding model...");
    let data = std::fs::read(path)?;
    let model = parse_dat_bytes(&data, options)?;

    print_step(2, 3, CUBE, "Assembling scene...");
    let scene = assemble(&model)?;

    print_step(3, 3, DISK, "Writing JSON...");
    let json = serde_json::to_string_pretty(&scene)?;
    std::fs::write(output, json)?;

    println!(
        "  {} mesh(es), {} without frame",
        scene.meshes.len(),
        scene.meshes_without_frame.len()
    );
    println!("  Written to: {}", output.display());
    print_done(start.elapsed());
    Ok(())
}

/// Search the trailing region for one name and print the record found.
pub fn locate(path: &Path, name: &str, options: &DecodeOptions) -> anyhow::Result<()> {
    let data = std::fs::read(path)?;
    // Diagnostics for other meshes are irrelevant here
    let model = parse_dat_bytes(&data, &options.clone().with_strict(false))?;

    let locator = TransformLocator::new(&data, model.trailing_offset)
        .with_back_offset(options.transform_back_offset);

    println!(
        "Scan region: {} bytes from offset {}",
        locator.scan_region().len(),
        locator.scan_start()
    );
    let matches = locator.find_matches(name);
    println!("Matches for '{name}': {}", matches.len());
    for offset in &matches {
        println!("  at {}", locator.scan_start() + offset);
    }

    let frame = locator.locate(name)?;
    println!();
    println!("Record at offset {}", frame.offset);
    for row in frame.matrix.chunks_exact(4) {
        println!(
            "  [{:>10.4} {:>10.4} {:>10.4} {:>10.4}]",
            row[0], row[1], row[2], row[3]
        );
    }
    println!("Bounds min {:?} max {:?}", frame.bounds.min, frame.bounds.max);

    Ok(())
}
