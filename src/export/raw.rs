//! RAW format export for game engine compatibility.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::HeightField;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// RAW export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian (high precision).
    R32Float,
}

impl RawFormat {
    pub fn bytes_per_sample(self) -> u64 {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => 2,
            RawFormat::R32Float => 4,
        }
    }
}

/// Exports a height field as a headerless RAW heightmap, row-major.
///
/// # Arguments
/// * `field` - The height field to export
/// * `path` - Output file path
/// * `format` - RAW format (R16 or R32)
/// * `min_height` - Height mapped to 0 (R16 only)
/// * `max_height` - Height mapped to 65535 (R16 only)
///
/// # Returns
/// `Ok(())` on success, or an error if export fails
pub fn export_height_field_raw(
    field: &HeightField,
    path: &Path,
    format: RawFormat,
    min_height: f32,
    max_height: f32,
) -> Result<(), RawExportError> {
    if format != RawFormat::R32Float && min_height >= max_height {
        return Err(RawExportError::InvalidHeightRange(min_height, max_height));
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let range = max_height - min_height;
    let quantize = |height: f32| {
        let normalized = ((height - min_height) / range).clamp(0.0, 1.0);
        (normalized * 65535.0) as u16
    };

    match format {
        RawFormat::R16LittleEndian => {
            for &height in field.heights() {
                writer.write_all(&quantize(height).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &height in field.heights() {
                writer.write_all(&quantize(height).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for &height in field.heights() {
                writer.write_all(&height.to_le_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Returns the expected file size for a RAW export.
pub fn expected_file_size(width: u32, height: u32, format: RawFormat) -> u64 {
    (width as u64) * (height as u64) * format.bytes_per_sample()
}
