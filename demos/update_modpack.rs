//! Modpack update example
//!
//! This example demonstrates the core functionality of modpack-dl:
//! - Loading a catalog (built-in or from a JSON file)
//! - Asking for confirmation before the managed directories are wiped
//! - Rendering progress events while the update runs in the background
//! - Cancelling the run on Ctrl+C
//!
//! Usage:
//!
//! ```text
//! cargo run --example update_modpack -- <game-dir> [--source NAME] [--version VERSION]
//!                                       [--catalog catalog.json] [--yes]
//! ```

use modpack_dl::{
    Catalog, Config, Event, ManagedSubdirectory, ModpackUpdater, PipelineOutcome, UpdateRequest,
    run_until_signal,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

struct Args {
    game_dir: PathBuf,
    source: Option<String>,
    version: Option<String>,
    catalog: Option<PathBuf>,
    assume_yes: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let mut game_dir = None;
    let mut source = None;
    let mut version = None;
    let mut catalog = None;
    let mut assume_yes = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--source" => source = Some(args.next().ok_or("--source needs a value")?),
            "--version" => version = Some(args.next().ok_or("--version needs a value")?),
            "--catalog" => {
                catalog = Some(PathBuf::from(args.next().ok_or("--catalog needs a path")?))
            }
            "--yes" | "-y" => assume_yes = true,
            other if game_dir.is_none() => game_dir = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    Ok(Args {
        game_dir: game_dir.ok_or("missing <game-dir>")?,
        source,
        version,
        catalog,
        assume_yes,
    })
}

fn confirm(game_dir: &std::path::Path) -> std::io::Result<bool> {
    let names: Vec<&str> = ManagedSubdirectory::ALL
        .iter()
        .map(|d| d.dir_name())
        .collect();
    print!(
        "This deletes {} in {} before installing. Continue? [y/N] ",
        names.join(", "),
        game_dir.display()
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = parse_args().map_err(|e| {
        eprintln!("usage: update_modpack <game-dir> [--source NAME] [--version VERSION] [--catalog FILE] [--yes]");
        e
    })?;

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_json_file(path).await?,
        None => Catalog::builtin(),
    };
    let (default_source, default_version) = catalog
        .default_selection()
        .map(|(s, v)| (s.to_string(), v.to_string()))
        .ok_or("catalog is empty")?;
    let source = args.source.unwrap_or(default_source);
    let version = args.version.unwrap_or(default_version);

    let game_dir = std::path::absolute(&args.game_dir)?;
    if !args.assume_yes && !confirm(&game_dir)? {
        println!("Aborted, nothing was changed.");
        return Ok(());
    }

    let updater = ModpackUpdater::new(Config {
        catalog,
        ..Default::default()
    })?;

    // Render events on the foreground while the worker runs
    let mut events = updater.subscribe();
    let renderer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Started { request, entries } => {
                    println!(
                        "▶ Updating {} {} ({} archives)",
                        request.source, request.version, entries
                    );
                }
                Event::Removed { path } => println!("🗑 Removed {}", path.display()),
                Event::Downloading { label, .. } => println!("⬇ Downloading {label}"),
                Event::Progress(progress) => match progress.percent() {
                    Some(percent) => print!("\r  {}: {:5.1}%", progress.label, percent),
                    None => print!(
                        "\r  {}: {:.2} MB",
                        progress.label,
                        progress.bytes_done as f64 / 1_048_576.0
                    ),
                },
                Event::DownloadComplete { bytes, .. } => println!(" ({bytes} bytes)"),
                Event::Extracting { label, .. } => println!("📦 Extracting {label}"),
                Event::ExtractComplete { label, files, .. } => {
                    println!("✓ {label}: {files} files installed")
                }
                Event::Finished { .. } => break,
                Event::Resetting { .. } => {}
            }
            std::io::stdout().flush().ok();
        }
    });

    let outcome =
        run_until_signal(&updater, UpdateRequest::new(&source, &version, &game_dir)).await?;
    renderer.await.ok();

    match outcome {
        PipelineOutcome::Success { installed } => {
            println!("✓ Update complete: {installed} archives installed");
        }
        PipelineOutcome::Failed {
            stage,
            index,
            reason,
            ..
        } => {
            let at = index.map(|i| format!(" (archive {})", i + 1)).unwrap_or_default();
            eprintln!("✗ Update failed during {stage}{at}: {reason}");
            std::process::exit(1);
        }
        PipelineOutcome::Cancelled { stage, .. } => {
            eprintln!("⚠ Update cancelled during {stage}; run again to finish");
            std::process::exit(130);
        }
    }

    Ok(())
}
