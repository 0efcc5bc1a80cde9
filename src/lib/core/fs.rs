use crate::core::error::Result;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Create parent directories for a path when missing.
pub fn make_parent_dirs<P: AsRef<Path>>(path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Whether a table path is compressed, judged by its extension.
pub fn is_bgzipped<P: AsRef<Path>>(path: P) -> bool {
    matches!(
        path.as_ref().extension().unwrap_or_else(|| OsStr::new("")),
        ext if ext == "gz" || ext == "gzip" || ext == "bgzf"
    )
}

/// File name for a per-contig output, with path separators replaced.
pub fn contig_file_name(contig: &str, kind: &str, compress: bool) -> String {
    let safe: String = contig
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_whitespace() { '_' } else { c })
        .collect();
    if compress {
        format!("{}.{}.tsv.gz", safe, kind)
    } else {
        format!("{}.{}.tsv", safe, kind)
    }
}
