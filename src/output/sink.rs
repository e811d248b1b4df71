use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for the prerequisite list.
///
/// A file destination is created (truncated) on open, so an unwritable path
/// fails before any work is done. On [`finish`](Self::finish) an empty file is
/// removed rather than left behind.
pub enum OutputSink {
    /// Standard output.
    Stdout(BufWriter<io::Stdout>),
    /// A named file.
    File {
        /// Where the list is written.
        path: PathBuf,
        /// Buffered handle.
        writer: BufWriter<File>,
    },
}

impl OutputSink {
    /// Opens the sink: `path` if given, stdout otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error naming `path` if the file cannot be created.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let file = File::create(path).with_context(|| path.display().to_string())?;
                Ok(Self::File {
                    path: path.to_path_buf(),
                    writer: BufWriter::new(file),
                })
            }
            None => Ok(Self::Stdout(BufWriter::new(io::stdout()))),
        }
    }

    /// Flushes the sink and removes a file destination that ended up empty.
    ///
    /// Returns the file path if one was kept.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing, inspecting or removing the file fails.
    pub fn finish(self) -> Result<Option<PathBuf>> {
        match self {
            Self::Stdout(mut writer) => {
                writer.flush().context("Failed to flush stdout")?;
                Ok(None)
            }
            Self::File { path, writer } => {
                let file = writer
                    .into_inner()
                    .map_err(io::IntoInnerError::into_error)
                    .with_context(|| path.display().to_string())?;
                drop(file);

                let len = fs::metadata(&path)
                    .with_context(|| path.display().to_string())?
                    .len();
                if len == 0 {
                    fs::remove_file(&path).with_context(|| path.display().to_string())?;
                    tracing::debug!(path = %path.display(), "Removed empty output file");
                    return Ok(None);
                }
                Ok(Some(path))
            }
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File { writer, .. } => writer.flush(),
        }
    }
}
