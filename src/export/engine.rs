//! Binding the PDFium library.
//!
//! `PDFIUM_LIB_PATH` may point at a specific library file (or the directory
//! holding it). Without it the system library search path is used.

use crate::error::ExportError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind PDFium, preferring `PDFIUM_LIB_PATH`.
pub fn bind_pdfium() -> Result<Pdfium, ExportError> {
    match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => bind_pdfium_from_path(Path::new(&path)),
        _ => {
            let bindings = Pdfium::bind_to_system_library().map_err(|e| {
                ExportError::EngineUnavailable(format!(
                    "PDFium not found on the system library path ({e:?}); set {PDFIUM_LIB_PATH_ENV}"
                ))
            })?;
            debug!("Bound PDFium from the system library path");
            Ok(Pdfium::new(bindings))
        }
    }
}

/// Bind PDFium from an explicit library file or directory.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, ExportError> {
    let library = library_file(path);
    let bindings = Pdfium::bind_to_library(&library).map_err(|e| {
        ExportError::EngineUnavailable(format!(
            "Failed to load PDFium from '{}': {e:?}",
            library.display()
        ))
    })?;
    debug!("Bound PDFium from {}", library.display());
    Ok(Pdfium::new(bindings))
}

fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

/// True when a PDFium library is configured explicitly.
pub fn is_configured() -> bool {
    std::env::var(PDFIUM_LIB_PATH_ENV)
        .map(|p| Path::new(&p).exists())
        .unwrap_or(false)
}
