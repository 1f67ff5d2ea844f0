pub mod schema;
pub mod generators;
pub mod harness;

use std::path::Path;

pub fn path_str(path: &Path) -> &str {
    path.to_str().unwrap_or("<unknown path>")
}

pub fn fmt_open_err(e: std::io::Error, path: &Path) -> String {
    format!("unable to open {}: {}", path_str(path), e)
}
