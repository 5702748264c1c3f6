//! Main entry point for the razip CLI application.
//!
//! Provides a command-line interface for listing and extracting ZIP files
//! from both the local filesystem and remote HTTP URLs.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use razip::{Cli, FileSource, HttpSource, ZipArchive, ZipEntry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_http_url() {
        // Remote ZIP file via HTTP Range requests.
        let source = HttpSource::open(cli.file.clone())?;
        let transfer = source.transfer_counter();
        let archive = ZipArchive::open(source)?;

        process_archive(&archive, &cli)?;

        // Network transfer statistics for HTTP sources.
        if !cli.is_quiet() {
            eprintln!("\nTotal bytes transferred: {}", format_size(transfer.bytes()));
        }
    } else {
        let source = FileSource::open(Path::new(&cli.file))
            .with_context(|| format!("cannot open {}", cli.file))?;
        let archive = ZipArchive::open(source)?;
        process_archive(&archive, &cli)?;
    }

    Ok(())
}

/// Process an opened archive based on CLI options: list mode (`-l`/`-v`)
/// displays the contents, otherwise matching entries are extracted.
fn process_archive(archive: &ZipArchive, cli: &Cli) -> Result<()> {
    if cli.list || cli.verbose {
        return list_entries(archive, cli.verbose);
    }

    // Filters: skip directories (created implicitly during extraction),
    // honor positional name/glob arguments, then the -x exclusions.
    let entries = archive.entries()?;
    let to_extract: Vec<&ZipEntry> = entries
        .filter(|e| {
            if e.is_directory() {
                return false;
            }

            if !cli.files.is_empty() {
                let matches = cli.files.iter().any(|f| {
                    if has_glob_chars(f) {
                        glob_match(f, &e.name)
                    } else {
                        let basename = Path::new(&e.name)
                            .file_name()
                            .map(|s| s.to_string_lossy())
                            .unwrap_or_default();
                        e.name == *f || basename == *f
                    }
                });
                if !matches {
                    return false;
                }
            }

            if cli
                .exclude
                .iter()
                .any(|x| e.name.contains(x) || glob_match(x, &e.name))
            {
                return false;
            }

            true
        })
        .collect();

    let multiple = cli.pipe && to_extract.len() > 1;
    for entry in to_extract {
        extract_entry(archive, entry, cli, multiple)?;
    }

    Ok(())
}

/// List entries, either one name per line or as a verbose table with sizes
/// and compression ratios.
fn list_entries(archive: &ZipArchive, verbose: bool) -> Result<()> {
    if verbose {
        println!("{:>10}  {:>10}  {:>5}  Name", "Length", "Size", "Cmpr");
        println!("{}", "-".repeat(50));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in archive.entries()? {
        if verbose {
            let ratio = compression_ratio(entry.uncompressed_size, entry.compressed_size);

            println!(
                "{:>10}  {:>10}  {}  {}",
                entry.uncompressed_size, entry.compressed_size, ratio, entry.name
            );

            if !entry.is_directory() {
                total_uncompressed += entry.uncompressed_size;
                total_compressed += entry.compressed_size;
                file_count += 1;
            }
        } else {
            println!("{}", entry.name);
        }
    }

    if verbose {
        println!("{}", "-".repeat(50));
        let total_ratio = compression_ratio(total_uncompressed, total_compressed);
        println!(
            "{:>10}  {:>10}  {}  {} files",
            total_uncompressed, total_compressed, total_ratio, file_count
        );
    }

    Ok(())
}

/// Extract one entry, streaming its decompressed bytes to stdout (pipe mode)
/// or to a file under the chosen output directory.
fn extract_entry(
    archive: &ZipArchive,
    entry: &ZipEntry,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    let Some(mut reader) = archive.reader(entry)? else {
        // Entry vanished between listing and extraction; nothing to do.
        return Ok(());
    };

    if cli.pipe {
        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        if show_filename {
            writeln!(stdout, "--- {} ---", entry.name)?;
        }
        io::copy(&mut reader, &mut stdout)
            .with_context(|| format!("while extracting {}", entry.name))?;
        return Ok(());
    }

    let file_name = if cli.junk_paths {
        Path::new(&entry.name)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| entry.name.clone())
    } else {
        entry.name.clone()
    };

    let output_path = match cli.extract_dir {
        Some(ref dir) => PathBuf::from(dir).join(&file_name),
        None => PathBuf::from(&file_name),
    };

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.name);
            }
            return Ok(());
        }
        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.name);
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.name);
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = fs::File::create(&output_path)
        .with_context(|| format!("cannot create {}", output_path.display()))?;
    io::copy(&mut reader, &mut file)
        .with_context(|| format!("while extracting {}", entry.name))?;

    Ok(())
}

/// Percent saved by compression. Deflate can expand incompressible data,
/// making the compressed side the larger one; that clamps to 0% rather than
/// underflowing.
fn compression_ratio(uncompressed: u64, compressed: u64) -> String {
    if uncompressed > 0 {
        format!(
            "{:>4}%",
            100u64.saturating_sub(compressed * 100 / uncompressed)
        )
    } else {
        "  0%".to_string()
    }
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching: `*` matches zero or more characters, `?`
/// matches exactly one.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
