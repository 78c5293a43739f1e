// File access for chunk readers

use std::fs::{self, File};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileError {
    NotFound,
    PermissionDenied,
    IsADirectory,
    IoError,
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileError::NotFound => write!(f, "File not found"),
            FileError::PermissionDenied => write!(f, "Permission denied"),
            FileError::IsADirectory => write!(f, "Is a directory"),
            FileError::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for FileError {}

impl From<&io::Error> for FileError {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FileError::NotFound,
            io::ErrorKind::PermissionDenied => FileError::PermissionDenied,
            _ => FileError::IoError,
        }
    }
}

impl From<io::Error> for FileError {
    fn from(err: io::Error) -> Self {
        FileError::from(&err)
    }
}

/// Open an existing regular file for binary reading.
///
/// Directories are rejected up front; on most platforms they open fine and
/// only fail at the first read.
pub fn open_for_read(path: &Path) -> io::Result<File> {
    let file = File::open(path)?;
    if file.metadata()?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is a directory", path.display()),
        ));
    }
    Ok(file)
}

pub fn get_file_size(path: &Path) -> Result<u64, FileError> {
    let metadata = fs::metadata(path)?;
    if metadata.is_dir() {
        return Err(FileError::IsADirectory);
    }
    Ok(metadata.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_open_for_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("data.bin");
        fs::write(&path, [1u8, 2, 3]).unwrap();

        let mut file = open_for_read(&path).unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, vec![1, 2, 3]);
    }

    #[test]
    fn test_open_for_read_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = open_for_read(&temp_dir.path().join("missing.bin")).unwrap_err();
        assert_eq!(FileError::from(&err), FileError::NotFound);
    }

    #[test]
    fn test_open_for_read_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = open_for_read(temp_dir.path()).unwrap_err();
        assert_eq!(FileError::from(&err), FileError::IoError);
    }

    #[test]
    fn test_get_file_size() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("size_test.bin");
        fs::write(&path, "This is some test content").unwrap();

        assert_eq!(get_file_size(&path).unwrap(), 25);
        assert_eq!(
            get_file_size(&temp_dir.path().join("nope")),
            Err(FileError::NotFound)
        );
        assert_eq!(get_file_size(temp_dir.path()), Err(FileError::IsADirectory));
    }

    #[test]
    fn test_file_error_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let file_err: FileError = io_err.into();
        assert_eq!(file_err, FileError::NotFound);

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "test");
        let file_err: FileError = io_err.into();
        assert_eq!(file_err, FileError::PermissionDenied);

        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "test");
        let file_err: FileError = io_err.into();
        assert_eq!(file_err, FileError::IoError);
    }

    #[test]
    fn test_file_error_display() {
        assert!(FileError::NotFound.to_string().contains("not found"));
        assert!(FileError::PermissionDenied
            .to_string()
            .to_lowercase()
            .contains("permission"));
    }
}
