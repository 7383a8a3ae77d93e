//! Media Index CLI
//!
//! Scans designated library directories for images and videos, keeps the
//! persistent cache current, and maintains video preview thumbnails.

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use media_index::{CacheSnapshot, FileInfo, IndexConfig, MediaIndex};

/// Incremental media library indexer
#[derive(Parser)]
#[command(name = "media_index")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the cache document (defaults to the per-user data dir)
    #[arg(long, global = true)]
    cache_file: Option<PathBuf>,

    /// Directory for generated video thumbnails
    #[arg(long, global = true)]
    thumb_dir: Option<PathBuf>,

    /// Frame-extraction program
    #[arg(long, global = true)]
    extractor: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add library roots and scan them
    Scan {
        /// Library root directories to add (can be given multiple times)
        #[arg(short = 'r', long = "root", required = true)]
        roots: Vec<PathBuf>,

        /// Output the resulting snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rescan the already-configured library roots
    Rescan {
        /// Output the resulting snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the current cache without scanning
    Cache {
        /// Output the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show display metadata for a single file
    Info {
        /// File path to query
        path: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut builder = IndexConfig::builder();
    if let Some(path) = cli.cache_file {
        builder = builder.cache_file(path);
    }
    if let Some(dir) = cli.thumb_dir {
        builder = builder.thumb_dir(dir);
    }
    if let Some(program) = cli.extractor {
        builder = builder.extractor(program);
    }
    let index = MediaIndex::new(builder.build());

    match cli.command {
        Commands::Scan { roots, json } => {
            info!("Adding {} library root(s)", roots.len());
            let snapshot = index.add_libraries(roots);
            print_snapshot(&snapshot, json);
        }
        Commands::Rescan { json } => {
            index.on_sync(Box::new(|event| {
                info!(
                    "sync: +{} images, +{} videos, -{} images, -{} videos",
                    event.added.images.len(),
                    event.added.videos.len(),
                    event.removed.images.len(),
                    event.removed.videos.len()
                );
            }));
            let snapshot = index.rescan();
            print_snapshot(&snapshot, json);
        }
        Commands::Cache { json } => {
            let snapshot = index.cache();
            print_snapshot(&snapshot, json);
        }
        Commands::Info { path } => match index.file_info(&path) {
            FileInfo::Available { name, size } => {
                println!("{}  {} bytes", name, size);
            }
            FileInfo::Unavailable => {
                println!("unavailable");
            }
        },
    }
}

fn print_snapshot(snapshot: &CacheSnapshot, json: bool) {
    if json {
        match serde_json::to_string_pretty(snapshot) {
            Ok(out) => println!("{}", out),
            Err(e) => eprintln!("failed to serialize snapshot: {}", e),
        }
    } else {
        println!("Libraries: {}", snapshot.libraries.len());
        println!("Images:    {}", snapshot.images.len());
        println!("Videos:    {}", snapshot.videos.len());
        println!("Thumbs:    {}", snapshot.thumbnails.len());
        println!("Updated:   {}", snapshot.updated_at);
    }
}
