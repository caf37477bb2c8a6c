//! Base file generation from schema defaults.
//!
//! Output is deterministic and uses LF line endings, so a generated file can
//! be compared byte for byte with a fresh rendering of the same schema.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::convert::TypeDescriptor;
use crate::error::{Error, Result};
use crate::properties::escape_value;
use crate::event::{ConfigEvent, EventSink};
use crate::schema::{ConfigFile, GroupMarker, SchemaEntry};

const FILE_BANNER_WIDTH: usize = 80;
const GROUP_BANNER_WIDTH: usize = 40;

/// Renders the text of a base file holding every default of `file`.
///
/// # Examples
///
/// ```
/// use layercfg::generator::render;
/// use layercfg::schema::{ConfigFile, ConfigSlot, SchemaEntry};
///
/// let rate: ConfigSlot<f64> = ConfigSlot::new();
/// let file = ConfigFile::builder("drop_rates")
///     .entry(SchemaEntry::bind("Rate", "1.5", &rate).with_comment(["Item drop multiplier"]))
///     .build()
///     .unwrap();
///
/// let text = render(&file);
/// assert!(text.contains("## drop rates Settings\n"));
/// assert!(text.contains("# Item drop multiplier\n# Default: 1.5\nRate = 1.5\n"));
/// ```
#[must_use]
pub fn render(file: &ConfigFile) -> String {
    let mut out = String::new();

    banner(&mut out, FILE_BANNER_WIDTH);
    line(
        &mut out,
        &format!("## {} Settings", file.file_name().replace('_', " ")),
    );
    banner(&mut out, FILE_BANNER_WIDTH);
    out.push('\n');

    if !file.comment().is_empty() {
        comments(&mut out, file.comment());
        out.push('\n');
    }

    for entry in file.entries() {
        if let Some(group) = entry.group_start() {
            group_begin(&mut out, group);
        }
        render_entry(&mut out, entry);
        if let Some(group) = entry.group_end() {
            group_finish(&mut out, group);
        }
    }

    out
}

fn render_entry(out: &mut String, entry: &SchemaEntry) {
    comments(out, entry.comment());
    if entry.is_comment_only() {
        if !entry.comment().is_empty() {
            out.push('\n');
        }
        return;
    }

    comment(out, &format!("Default: {}", entry.default_literal()));
    if let Some(available) = available_constants(entry.declared_type()) {
        line(out, &format!("# Available: {available}"));
    }
    line(
        out,
        &format!("{} = {}", entry.key(), escape_value(entry.default_literal())),
    );
    out.push('\n');
}

fn available_constants(ty: &TypeDescriptor) -> Option<String> {
    let constants = ty.enum_type()?.constants();
    let separator = if ty.is_collection() { "," } else { "|" };
    Some(constants.join(separator))
}

fn group_begin(out: &mut String, group: &GroupMarker) {
    banner(out, GROUP_BANNER_WIDTH);
    line(out, &format!("## Section BEGIN: {}", group.name));
    comments(out, &group.comment);
    out.push('\n');
}

fn group_finish(out: &mut String, group: &GroupMarker) {
    comments(out, &group.comment);
    line(out, &format!("## Section END: {}", group.name));
    banner(out, GROUP_BANNER_WIDTH);
    out.push('\n');
}

fn banner(out: &mut String, width: usize) {
    line(out, &"#".repeat(width));
}

fn comments(out: &mut String, lines: &[String]) {
    for text in lines {
        comment(out, text);
    }
}

/// Every physical line of `text` becomes a `#` line.
fn comment(out: &mut String, text: &str) {
    for part in text.split('\n') {
        let _ = writeln!(out, "# {}", part.trim_end_matches('\r'));
    }
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

/// Writes `text` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::Generation`] on any I/O failure.
pub fn write(path: &Path, text: &str) -> Result<()> {
    let generation = |source: std::io::Error| Error::Generation {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(generation)?;
    }
    fs::write(path, text).map_err(generation)
}

/// Renders `file` and writes it below `root`, returning the path written.
///
/// # Errors
///
/// Returns [`Error::Generation`] on any I/O failure.
pub fn generate_file(root: &Path, file: &ConfigFile, sink: &dyn EventSink) -> Result<PathBuf> {
    let path = file.path_in(root);
    write(&path, &render(file))?;
    sink.emit(&ConfigEvent::FileGenerated { path: path.clone() });
    Ok(path)
}
