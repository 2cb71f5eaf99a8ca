// src/file.rs

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

/// Create parent directories as needed, then write `contents` (truncating).
pub fn write_text(path: &Path, contents: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let file = File::create(path)?; // truncate/overwrite
    let mut out = BufWriter::new(file);
    out.write_all(contents.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Contents of `path`, or `None` when there is no such file.
pub fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read(path) {
        // Forum-era files are not always clean UTF-8.
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn ensure_directory(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if dir.exists() && !dir.is_dir() {
        return Err(format!("Path exists but is not a directory: {}", dir.display()).into());
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents_and_read_sees_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/events.csv");
        assert_eq!(read_optional(&path).unwrap(), None);

        write_text(&path, "\"1\",\"x\"").unwrap();
        assert_eq!(read_optional(&path).unwrap().as_deref(), Some("\"1\",\"x\""));
    }

    #[test]
    fn ensure_directory_refuses_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain");
        fs::write(&path, "").unwrap();
        assert!(ensure_directory(&path).is_err());
    }
}
