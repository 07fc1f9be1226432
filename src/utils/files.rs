use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::errors::IoError;

pub fn file_exists(file_name: &str) -> bool {
    File::open(file_name).is_ok()
}

pub fn read_file(file_name: impl AsRef<Path>) -> Result<String, IoError> {
    let path = file_name.as_ref();
    let mut file =
        File::open(path).map_err(|e| IoError::new(format!("{}: {e}", path.display())))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/* Creates the parent directories of a file path */
pub fn create_directories_if_needed(file_path: &str) {
    if let Some(parent) = Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = fs::create_dir_all(parent);
        }
    }
}

/* Statement exports of a directory, sorted by filename */
pub fn csv_files_in(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let entries =
        fs::read_dir(dir).map_err(|e| IoError::new(format!("{}: {e}", dir.display())))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/* The most recent export, used to compare against the broker's own positions */
pub fn latest_file(dir: &Path) -> Result<PathBuf, IoError> {
    csv_files_in(dir)?
        .pop()
        .ok_or_else(|| IoError::new(format!("Not any matching files found: {}", dir.display())))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_csv_files_sorted() {
        let dir = Path::new(".data_test/files");
        let _ = fs::remove_dir_all(dir);
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("2021.csv"), "b").unwrap();
        fs::write(dir.join("2020.csv"), "a").unwrap();
        fs::write(dir.join("notes.txt"), "c").unwrap();

        let files = csv_files_in(dir).unwrap();
        assert_eq!(files, vec![dir.join("2020.csv"), dir.join("2021.csv")]);
        assert_eq!(latest_file(dir).unwrap(), dir.join("2021.csv"));
        assert_eq!(read_file(dir.join("2020.csv")).unwrap(), "a");

        fs::remove_dir_all(dir).unwrap();
    }
}
