//! esm360 - convert console ESM plugin files to PC layout
//!
//! Usage:
//!   esm360 convert <input> [-o output]       - Convert one plugin
//!   esm360 convert <dir> -o <dir> [--filter] - Convert a directory
//!   esm360 info <input>                      - Show plugin structure

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use esm360::{
    build_catalog, collect_plugins, convert_plugin_into, create_glob_matcher, format_size,
    matches_filter, scan_groups, ConversionStats, ConvertOptions, Endian, GroupType,
    SchemaCatalog,
};

#[derive(Parser)]
#[command(name = "esm360")]
#[command(version = "0.1.0")]
#[command(about = "Convert console ESM plugin files to PC layout", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a plugin (or every plugin under a directory)
    Convert {
        /// Input plugin file or directory
        input: PathBuf,
        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Filter pattern for directory mode (e.g. *.esm, Anchorage)
        #[arg(short, long)]
        filter: Option<String>,
        /// Print conversion statistics
        #[arg(short, long)]
        stats: bool,
        /// Record schema fallback usage and print it afterwards
        #[arg(long)]
        log_fallbacks: bool,
    },
    /// Show plugin header and group structure
    Info {
        /// Input plugin file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            filter,
            stats,
            log_fallbacks,
        } => {
            if input.is_dir() {
                convert_directory(&input, output.as_deref(), filter.as_deref(), log_fallbacks)
            } else {
                let catalog = build_catalog();
                convert_one(&input, output.as_deref(), &catalog, stats, log_fallbacks)
            }
        }
        Commands::Info { input } => show_info(&input),
    }
}

fn output_path_for(input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted".to_string());
    name.push_str("_pc");
    let mut out = input.with_file_name(name);
    if let Some(ext) = input.extension() {
        out.set_extension(ext);
    }
    out
}

fn convert_one(
    input: &Path,
    output: Option<&Path>,
    catalog: &SchemaCatalog,
    print_stats: bool,
    log_fallbacks: bool,
) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    println!(
        "Converting {} ({})",
        input.display(),
        format_size(data.len() as u64)
    );

    let options = ConvertOptions {
        log_fallbacks,
        ..ConvertOptions::default()
    };
    let mut stats = ConversionStats::new(log_fallbacks);
    let result = convert_plugin_into(&data, catalog, &options, &mut stats);

    if print_stats {
        print_conversion_stats(&stats);
    }

    // The partial counters above stay useful for diagnosing the failure.
    let converted = result.with_context(|| format!("Failed to convert {}", input.display()))?;

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| output_path_for(input));
    fs::write(&out_path, &converted)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    println!(
        "Wrote {} ({})",
        out_path.display(),
        format_size(converted.len() as u64)
    );

    if log_fallbacks && !stats.fallback_log().is_empty() {
        let mut tally: BTreeMap<String, u64> = BTreeMap::new();
        for hit in stats.fallback_log() {
            *tally
                .entry(format!(
                    "{} under {} ({} bytes, {})",
                    hit.signature, hit.owner, hit.length, hit.tier
                ))
                .or_insert(0) += 1;
        }
        println!("\nSchema fallback usage:");
        for (what, count) in tally {
            println!("  {count}x {what}");
        }
    }

    Ok(())
}

fn print_conversion_stats(s: &ConversionStats) {
    println!("\nConversion stats:");
    println!("  Records: {}", s.records_converted);
    println!("  Subrecords: {}", s.subrecords_converted);
    println!("  Groups: {}", s.groups_converted);
    println!("  Decompressed: {}", s.records_decompressed);
    println!("  Cache records dropped: {}", s.cache_records_dropped);
    println!(
        "  Responses merged/dropped: {}/{}",
        s.infos_merged, s.infos_dropped
    );
    println!("  Verbatim anomalies: {}", s.verbatim_anomalies);

    let mut by_signature: Vec<_> = s.per_signature.iter().collect();
    by_signature.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    println!("\nTop record types:");
    for (sig, count) in by_signature.iter().take(15) {
        println!("  {sig}: {count}");
    }
}

fn convert_directory(
    input: &Path,
    output: Option<&Path>,
    filter: Option<&str>,
    log_fallbacks: bool,
) -> Result<()> {
    let matcher = filter.map(create_glob_matcher).transpose()?;
    let plugins: Vec<_> = collect_plugins(input)?
        .into_iter()
        .filter(|p| {
            matches_filter(
                &p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
                matcher.as_ref(),
            )
        })
        .collect();
    if plugins.is_empty() {
        bail!("No plugins found under {}", input.display());
    }

    let out_dir = output.unwrap_or(input);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let catalog = build_catalog();
    let pb = ProgressBar::new(plugins.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut failed = 0u64;
    for plugin in &plugins {
        pb.set_message(
            plugin
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        let out_path = if output.is_some() {
            out_dir.join(plugin.file_name().unwrap_or_default())
        } else {
            output_path_for(plugin)
        };
        if let Err(e) = convert_one(plugin, Some(&out_path), &catalog, false, log_fallbacks) {
            eprintln!("Warning: {e:#}");
            failed += 1;
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    if failed > 0 {
        bail!("{failed} of {} plugins failed to convert", plugins.len());
    }
    println!("Converted {} plugins", plugins.len());
    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let groups = scan_groups(&data, Endian::Big)
        .with_context(|| format!("Failed to scan {}", input.display()))?;

    println!("Plugin: {}", input.display());
    println!("  Size: {}", format_size(data.len() as u64));
    println!("  Groups: {}", groups.len());

    let mut per_type: BTreeMap<u32, u64> = BTreeMap::new();
    for g in &groups {
        *per_type.entry(g.group_type.raw()).or_insert(0) += 1;
    }
    println!("\nGroups by type:");
    for (ty, count) in &per_type {
        println!("  type {ty}: {count}");
    }

    println!("\nTop-level groups:");
    for g in groups
        .iter()
        .filter(|g| g.group_type == GroupType::TopLevel)
    {
        println!(
            "  {} at {} ({})",
            g.label_as_tag(),
            g.offset,
            format_size(g.group_size as u64)
        );
    }
    Ok(())
}
