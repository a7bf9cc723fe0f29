//! Export module for saving terrain data to various file formats.
//!
//! Supports 16-bit PNG for universal compatibility, RAW formats for game
//! engine imports, and Wavefront OBJ for the strip mesh.

mod obj;
mod png;
mod raw;

pub use obj::{export_mesh_obj, ObjExportError};
pub use png::{export_height_field_png, PngExportError, PngExportOptions};
pub use raw::{expected_file_size, export_height_field_raw, RawExportError, RawFormat};
