//! synthimg: generate synthetic images that land inside a file-size range.
//!
//! Writes one image to `--output`, or `--count` images into the output
//! directory named by content id.

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use synthimg::cli::Cli;
use synthimg::config::GeneratorConfig;
use synthimg::encode::{write_artifact, write_artifact_to_dir, ImageCodec};
use synthimg::generation::{expand_request, generate, generate_batch};
use synthimg::EncodedArtifact;

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Installs the stderr fmt subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.output.is_some() && cli.count > 1 {
        bail!("--output writes a single image; use --output-dir with --count {}", cli.count);
    }

    let mut config = GeneratorConfig::from_env();
    cli.apply_to(&mut config);
    if let Some(reason) = config.validate() {
        bail!("invalid configuration: {}", reason);
    }

    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .build_global()
            .context("failed to configure worker threads")?;
    }

    let codec = ImageCodec::new(config.format)?;
    let params = config.synth_params();
    let request = cli.request();
    let start_time = Instant::now();

    if cli.writes_single_file() {
        let artifact = generate(&request, &codec, &params)?;
        let path = cli.output.as_deref().context("output path missing")?;
        write_artifact(&artifact, path)?;
        report(&artifact, path, cli.json)?;
    } else {
        let dir = config.effective_output_dir();
        let requests = expand_request(&request, cli.count as usize);
        let mut failures = 0;

        for (index, result) in generate_batch(&requests, &codec, &params).into_iter().enumerate() {
            match result {
                Ok(artifact) => {
                    let path = write_artifact_to_dir(&artifact, &dir)?;
                    report(&artifact, &path, cli.json)?;
                }
                Err(e) => {
                    error!(index, error = %e, "generation failed");
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            bail!("{} of {} images failed", failures, requests.len());
        }
    }

    info!(elapsed_sec = start_time.elapsed().as_secs_f32(), "done");
    Ok(())
}

fn report(artifact: &EncodedArtifact, path: &Path, json: bool) -> anyhow::Result<()> {
    if json {
        let summary = serde_json::to_string(&artifact.summary())
            .context("failed to serialize artifact summary")?;
        println!("{}", summary);
    }

    info!(
        path = %path.display(),
        size_kb = artifact.size_kb(),
        target_kb = artifact.target_kb,
        width = artifact.width,
        height = artifact.height,
        tier = %artifact.tier,
        "saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn run_writes_single_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let cli = Cli::parse_from([
            "synthimg",
            "--width",
            "120",
            "--height",
            "100",
            "--min-kb",
            "1",
            "--max-kb",
            "1",
            "--seed",
            "3",
            "-o",
            path.to_str().unwrap(),
        ]);

        run(&cli).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());
    }

    #[test]
    fn run_rejects_invalid_request() {
        let dir = tempdir().unwrap();
        let cli = Cli::parse_from([
            "synthimg",
            "--min-kb",
            "10",
            "--max-kb",
            "5",
            "-d",
            dir.path().to_str().unwrap(),
        ]);

        assert!(run(&cli).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn run_rejects_output_file_with_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let cli = Cli::parse_from([
            "synthimg",
            "--width",
            "120",
            "--height",
            "100",
            "--min-kb",
            "1",
            "--max-kb",
            "1",
            "-n",
            "3",
            "-o",
            path.to_str().unwrap(),
        ]);

        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("--output"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
