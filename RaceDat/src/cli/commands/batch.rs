//! Batch decode command

use std::path::Path;
use std::time::Instant;

use crate::batch::{batch_inspect, find_dat_files};
use crate::cli::progress::{TRUCK, print_done, print_step, simple_bar};
use crate::formats::dat::DecodeOptions;

/// Decode every `.dat` file under `dir`.
pub fn execute(dir: &Path, quiet: bool, options: &DecodeOptions) -> anyhow::Result<()> {
    let start = Instant::now();
    let files = find_dat_files(dir);

    if files.is_empty() {
        println!("No .dat files found in: {}", dir.display());
        return Ok(());
    }

    print_step(1, 1, TRUCK, &format!("Decoding {} files...", files.len()));

    let pb = simple_bar(files.len() as u64, quiet);
    let result = batch_inspect(&files, dir, options, |progress| {
        pb.set_position(progress.current as u64);
        pb.set_message(progress.current_file.clone());
    });
    pb.finish_and_clear();

    if !quiet {
        for line in &result.results {
            println!("  {line}");
        }
    }

    println!();
    println!(
        "Decoded {} of {} files ({} failed, {} diagnostics)",
        result.success_count,
        files.len(),
        result.fail_count,
        result.diagnostic_count
    );
    print_done(start.elapsed());

    if result.fail_count > 0 {
        anyhow::bail!("{} file(s) failed to decode", result.fail_count);
    }
    Ok(())
}
