//! Atomic Parquet, CSV and JSON writers

use crate::config::{CompressionAlgorithm, ExportFormat};
use crate::{Error, Result};
use polars::prelude::{
    CsvWriter, DataFrame, ParquetWriter as PolarsParquetWriter, SerWriter, StatisticsOptions,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Write a frame in the given format; returns the file size in bytes
///
/// # Errors
///
/// Returns a configuration error for [`ExportFormat::None`], or an I/O or
/// export error when the file cannot be written
pub fn write_frame(
    df: &mut DataFrame,
    path: &Path,
    format: ExportFormat,
    compression: CompressionAlgorithm,
) -> Result<u64> {
    stage_frame(df, path, format, compression)?.commit()
}

/// Write a value as pretty JSON; returns the file size in bytes
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<u64> {
    stage_json(value, path)?.commit()
}

/// Stage a frame beside `path` without replacing it yet
pub fn stage_frame(
    df: &mut DataFrame,
    path: &Path,
    format: ExportFormat,
    compression: CompressionAlgorithm,
) -> Result<StagedFile> {
    match format {
        ExportFormat::Parquet => StagedFile::write(path, |file| {
            PolarsParquetWriter::new(file)
                .with_compression(compression.to_polars_compression())
                .with_statistics(StatisticsOptions::full())
                .finish(df)
                .map(|_| ())
                .map_err(|e| {
                    Error::export(format!("Failed to write parquet '{}'", path.display()), e)
                })
        }),
        ExportFormat::Csv => StagedFile::write(path, |file| {
            CsvWriter::new(file)
                .include_header(true)
                .finish(df)
                .map_err(|e| Error::export(format!("Failed to write CSV '{}'", path.display()), e))
        }),
        ExportFormat::None => Err(Error::configuration(
            "Export format 'none' does not write a file",
        )),
    }
}

/// Stage a value as pretty JSON beside `path` without replacing it yet
pub fn stage_json<T: Serialize>(value: &T, path: &Path) -> Result<StagedFile> {
    StagedFile::write(path, |file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)
            .map_err(|e| Error::json(format!("Failed to encode '{}'", path.display()), e))?;
        writer
            .flush()
            .map_err(|e| Error::io(format!("Failed to write '{}'", path.display()), e))
    })
}

/// A fully written temporary file in its destination directory
///
/// [`StagedFile::commit`] moves it into place. Dropping it uncommitted
/// removes the temporary file and leaves the destination untouched.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    fn write<F>(path: &Path, write: F) -> Result<Self>
    where
        F: FnOnce(&mut File) -> Result<()>,
    {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
            Error::io(
                format!("Failed to create temporary file in '{}'", dir.display()),
                e,
            )
        })?;
        write(temp.as_file_mut())?;
        temp.as_file_mut()
            .sync_all()
            .map_err(|e| Error::io(format!("Failed to flush '{}'", path.display()), e))?;

        Ok(Self {
            temp,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the file into place; returns its size in bytes
    pub fn commit(self) -> Result<u64> {
        let Self { temp, path } = self;
        temp.persist(&path).map_err(|e| {
            Error::io(
                format!("Failed to move output into '{}'", path.display()),
                e.error,
            )
        })?;

        let size = std::fs::metadata(&path)
            .map_err(|e| Error::io(format!("Failed to stat '{}'", path.display()), e))?
            .len();
        debug!("Wrote {} ({} bytes)", path.display(), size);
        Ok(size)
    }
}
