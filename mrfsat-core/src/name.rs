//! Instance name normalization
//!
//! Analyzer exports and reference tables spell the same instance with and
//! without its file-type suffix (`foo.opb`, `foo`, `dir/foo.opb.gz`). Every
//! name-keyed comparison goes through [`normalize_instance_name`].

/// File-type suffixes stripped from instance names
pub const INSTANCE_SUFFIXES: &[&str] = &["opb", "cnf", "wcnf", "pbo"];

/// Compression suffixes that may follow an instance suffix
const COMPRESSION_SUFFIXES: &[&str] = &["gz", "bz2", "xz", "zst"];

/// Strip directories, compression and instance suffixes from a name
#[must_use]
pub fn normalize_instance_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);

    let mut name = base;
    if let Some(stem) = strip_suffix(name, COMPRESSION_SUFFIXES) {
        name = stem;
    }
    if let Some(stem) = strip_suffix(name, INSTANCE_SUFFIXES) {
        name = stem;
    }
    name.to_string()
}

fn strip_suffix<'a>(name: &'a str, suffixes: &[&str]) -> Option<&'a str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    suffixes
        .iter()
        .any(|s| ext.eq_ignore_ascii_case(s))
        .then_some(stem)
}
