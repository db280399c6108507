//! # chatnorm CLI
//!
//! Reads raw event rows, normalizes them, and writes the records.

use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chatnorm::ChatnormError;
use chatnorm::cli::Args;
use chatnorm::config::PipelineConfig;
use chatnorm::core::Pipeline;
use chatnorm::format::write_to_format;
use chatnorm::ingest::{channel_directory, group_by_user, load_channels, load_flow_rules, read_rows};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ChatnormError> {
    let total_start = Instant::now();
    let args = Args::parse();
    let format = args.output_format()?;
    let output_path = args.output_path(format);

    println!("📦 chatnorm v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.input);
    println!("💾 Output:  {}", output_path);
    println!("📄 Format:  {}", format);
    println!("🛑 Errors:  {}", args.on_error);
    println!();

    // Step 1: Read rows
    let table = read_rows(Path::new(&args.input))?;
    println!(
        "📖 Read {} rows ({} corrupt dropped)",
        table.rows.len(),
        table.corrupt
    );

    // Step 2: Channel directory, flow rules, per-user events
    let directory = match &args.channels {
        Some(path) => load_channels(Path::new(path))?,
        None => channel_directory(&table.rows),
    };
    let rules = match &args.rules {
        Some(path) => load_flow_rules(Path::new(path))?,
        None => Vec::new(),
    };
    println!(
        "🔎 {} channels, {} flow rules",
        directory.len(),
        rules.len()
    );
    let users = group_by_user(table.rows)?;

    // Step 3: Normalize
    let config = PipelineConfig::new()
        .with_error_policy(args.on_error)
        .with_parallel(args.parallel);
    let pipeline = Pipeline::new(directory, &rules, config)?;

    println!("⏳ Normalizing {} users...", users.len());
    let start = Instant::now();
    let out = pipeline.run(&users)?;
    println!(
        "   {} records ({:.2}s)",
        out.records.len(),
        start.elapsed().as_secs_f64()
    );

    // Step 4: Write
    println!("💾 Writing {}...", format);
    write_to_format(&out.records, &output_path, format)?;

    println!();
    println!("✅ Done! Output saved to {}", output_path);

    println!();
    println!("📊 Summary:");
    println!("   Users:     {}", out.stats.users);
    println!("   Events:    {}", out.stats.events);
    println!("   Records:   {}", out.stats.records);
    println!("   Skipped:   {}", out.stats.skipped);
    println!("   Fallbacks: {}", out.stats.warnings);
    println!(
        "   Total time: {:.2}s",
        total_start.elapsed().as_secs_f64()
    );

    Ok(())
}
