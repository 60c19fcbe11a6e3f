// CLI command implementations
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use flvio::{ByteStream, ContainerConfig, FlvReader, FlvWriter};
use log::{debug, warn};
use serde_json::{json, Value};

use crate::cli::output::OutputFormatter;

/// Show header, size and tag statistics for each file
pub fn command_info(files: &[String], config: &ContainerConfig, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let paths = expand_patterns(files, formatter)?;
    if paths.is_empty() {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }

    let mut stdout = io::stdout();
    let mut failures = 0;
    for path in &paths {
        match file_info(path, config) {
            Ok(report) => formatter.output(&report, &mut stdout)?,
            Err(e) => {
                formatter.print_error(&format!("{}: {:#}", path.display(), e));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files could not be read", failures, paths.len());
    }
    Ok(())
}

fn file_info(path: &Path, config: &ContainerConfig) -> anyhow::Result<Value> {
    let metadata = std::fs::metadata(path).with_context(|| format!("reading metadata of {}", path.display()))?;
    let modified = metadata
        .modified()
        .ok()
        .map(|mtime| DateTime::<Utc>::from(mtime).format("%Y-%m-%d %H:%M:%S UTC").to_string());

    let mut reader = FlvReader::open_with_config(path, config.clone())
        .with_context(|| format!("opening {}", path.display()))?;
    let stats = scan(&mut reader)?;
    let header = *reader.header();

    Ok(json!({
        "path": path.display().to_string(),
        "size": reader.size(),
        "modified": modified,
        "version": header.version,
        "has_audio": header.has_audio(),
        "has_video": header.has_video(),
        "tags": stats.counts,
        "last_timestamp_ms": stats.last_timestamp,
        "truncated": stats.truncated,
    }))
}

#[derive(Debug, Default)]
struct TagStats {
    counts: BTreeMap<String, u64>,
    last_timestamp: Option<u32>,
    truncated: bool,
}

/// Walk every tag, treating a trailing partial tag as truncation rather than failure
fn scan<S: Read + ByteStream>(reader: &mut FlvReader<S>) -> anyhow::Result<TagStats> {
    let mut stats = TagStats::default();
    for tag in reader.tags() {
        match tag {
            Ok(tag) => {
                *stats.counts.entry(tag.header.tag_type.to_string()).or_insert(0) += 1;
                stats.last_timestamp = Some(tag.header.timestamp);
            }
            Err(e) if e.is_truncated() => {
                warn!("stream ends inside a tag: {}", e);
                stats.truncated = true;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(stats)
}

/// List tags of one file
pub fn command_tags(
    file: &Path,
    limit: Option<usize>,
    config: &ContainerConfig,
    formatter: &OutputFormatter,
) -> anyhow::Result<()> {
    let mut reader = FlvReader::open_with_config(file, config.clone())
        .with_context(|| format!("opening {}", file.display()))?;

    let mut rows = Vec::new();
    let mut offset = reader.header().first_tag_offset();
    for (index, tag) in reader.tags().take(limit.unwrap_or(usize::MAX)).enumerate() {
        let tag = tag.with_context(|| format!("reading tag {} at offset {}", index, offset))?;
        rows.push(json!({
            "index": index,
            "offset": offset,
            "type": tag.header.tag_type,
            "size": tag.header.data_size,
            "timestamp_ms": tag.header.timestamp,
        }));
        offset += tag.header.tag_size() as u64 + 4;
    }

    formatter.output(&Value::Array(rows), &mut io::stdout())
}

/// Re-emit every tag of `input` through a fresh writer
pub fn command_rebase(
    input: &Path,
    output: &Path,
    sync: bool,
    config: &ContainerConfig,
    formatter: &OutputFormatter,
) -> anyhow::Result<()> {
    let mut reader = FlvReader::open_with_config(input, config.clone())
        .with_context(|| format!("opening {}", input.display()))?;

    // Carry the source flags over unless a config file overrides them
    let mut out_config = config.clone();
    if out_config.header == ContainerConfig::default().header {
        out_config.header.flags = reader.header().flags;
    }
    let mut writer = FlvWriter::create_with_config(output, out_config)
        .with_context(|| format!("creating {}", output.display()))?;

    let mut copied = 0u64;
    let mut skipped_tail = false;
    for tag in reader.tags() {
        match tag {
            Ok(tag) => {
                writer
                    .write_tag(&tag.data, tag.header.tag_type, tag.header.timestamp)
                    .with_context(|| format!("writing tag {} to {}", copied, output.display()))?;
                copied += 1;
            }
            Err(e) if e.is_truncated() => {
                warn!("{}: dropping partial trailing tag ({})", input.display(), e);
                skipped_tail = true;
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", input.display())),
        }
    }

    let duration = writer.duration();
    if sync {
        writer
            .sync()
            .with_context(|| format!("patching duration into {}", output.display()))?;
        debug!("patched duration {:.3}s", duration);
    }
    writer.close()?;

    formatter.print_success(&format!(
        "{} -> {}: {} tags, {:.3}s{}",
        input.display(),
        output.display(),
        copied,
        duration,
        if skipped_tail { " (partial tail dropped)" } else { "" }
    ));
    Ok(())
}

/// Report which files carry the FLV signature
pub fn command_detect(files: &[PathBuf], formatter: &OutputFormatter) -> anyhow::Result<()> {
    let mut rows = Vec::new();
    for file in files {
        match flvio::is_flv_file(file) {
            Ok(is_flv) => rows.push(json!({
                "path": file.display().to_string(),
                "flv": is_flv,
            })),
            Err(e) => formatter.print_error(&format!("{}: {}", file.display(), e)),
        }
    }
    formatter.output(&Value::Array(rows), &mut io::stdout())
}

/// Expand glob patterns, passing plain paths through untouched
fn expand_patterns(patterns: &[String], formatter: &OutputFormatter) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains('*') && !pattern.contains('?') && !pattern.contains('[') {
            paths.push(PathBuf::from(pattern));
            continue;
        }
        for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern {}", pattern))? {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
            }
        }
    }
    Ok(paths)
}
