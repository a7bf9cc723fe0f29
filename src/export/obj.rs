//! Wavefront OBJ export of terrain meshes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::terrain::TerrainMesh;

/// Errors that can occur during OBJ export.
#[derive(Error, Debug)]
pub enum ObjExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the mesh as vertices plus triangle faces.
///
/// Strips are expanded with [`TerrainMesh::triangles`]; OBJ indices are
/// 1-based.
pub fn export_mesh_obj(mesh: &TerrainMesh, path: &Path) -> Result<(), ObjExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "# {}x{} terrain, {} vertices",
        mesh.layout().width(),
        mesh.layout().height(),
        mesh.vertex_count()
    )?;

    for [x, y, z] in mesh.positions() {
        writeln!(writer, "v {} {} {}", x, y, z)?;
    }

    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }

    writer.flush()?;
    Ok(())
}
