use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot prepare output directory {}: {source}", dir.display())]
    OutputDir { dir: PathBuf, source: io::Error },
    #[error("{} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("invalid output filename: {0:?}")]
    Filename(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` (and parents) unless it already exists as a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::NotADirectory(dir.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|source| PersistError::OutputDir {
                dir: dir.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(PersistError::OutputDir {
            dir: dir.to_path_buf(),
            source,
        }),
    }
}

/// Writes files into one directory so that readers only ever see the previous
/// content or the complete new content, never a partial write.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        self.write_with(filename, |out| Ok(out.write_all(content)?))
    }

    /// Streams `fill` into a temp file beside the target, then renames it into place.
    /// If `fill` fails the target is left untouched.
    pub fn write_with<F>(&self, filename: &str, fill: F) -> Result<PathBuf, PersistError>
    where
        F: FnOnce(&mut dyn Write) -> Result<(), PersistError>,
    {
        let target = self.target(filename)?;
        ensure_output_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut out = BufWriter::new(tmp.as_file_mut());
            fill(&mut out)?;
            out.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }

    fn target(&self, filename: &str) -> Result<PathBuf, PersistError> {
        let bare = Path::new(filename)
            .file_name()
            .is_some_and(|name| name == filename);
        if !bare {
            return Err(PersistError::Filename(filename.to_string()));
        }
        Ok(self.dir.join(filename))
    }
}
