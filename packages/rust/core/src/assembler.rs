//! Output directory assembler.
//!
//! Writes generated artifacts under the output root. Every file is written
//! atomically (temp file, then rename) and its checksum recorded, so the
//! link manifest can describe exactly what landed on disk.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use aidata_shared::{AiDataError, Result};

/// Generated folders removed by a clean run.
const GENERATED_DIRS: [&str; 2] = ["schemas", "docs"];

/// Metadata for a single written file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArtifactMeta {
    /// Path relative to the output root, `/`-separated.
    pub path: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Create the output root. With `clean`, remove previously generated folders first.
#[instrument(skip_all, fields(root = %root.display(), clean))]
pub fn prepare_output(root: &Path, clean: bool) -> Result<()> {
    if clean {
        for dir in GENERATED_DIRS {
            let path = root.join(dir);
            if path.exists() {
                std::fs::remove_dir_all(&path).map_err(|e| AiDataError::io(&path, e))?;
                info!(path = %path.display(), "removed generated folder");
            }
        }
    }

    std::fs::create_dir_all(root).map_err(|e| AiDataError::io(root, e))?;
    Ok(())
}

/// Write `content` to `root/<rel_path>` atomically.
pub fn write_artifact(root: &Path, rel_path: &str, content: &str) -> Result<ArtifactMeta> {
    let target = resolve(root, rel_path)?;
    let parent = target
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    std::fs::create_dir_all(&parent).map_err(|e| AiDataError::io(&parent, e))?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| AiDataError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| AiDataError::io(&target, e))?;

    debug!(path = %rel_path, size = content.len(), "wrote artifact");

    Ok(ArtifactMeta {
        path: rel_path.to_string(),
        sha256: sha256_hex(content.as_bytes()),
        size_bytes: content.len(),
    })
}

/// Write a pretty-printed JSON file with a trailing newline.
pub fn write_json<T: serde::Serialize>(root: &Path, rel_path: &str, data: &T) -> Result<ArtifactMeta> {
    let mut json = serde_json::to_string_pretty(data)
        .map_err(|e| AiDataError::Serialization(format!("{rel_path}: {e}")))?;
    json.push('\n');
    write_artifact(root, rel_path, &json)
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Join a relative artifact path onto the root, refusing anything that escapes it.
fn resolve(root: &Path, rel_path: &str) -> Result<PathBuf> {
    let escapes = rel_path.is_empty()
        || rel_path.starts_with('/')
        || rel_path.split('/').any(|part| part == ".." || part.is_empty());
    if escapes {
        return Err(AiDataError::validation(format!(
            "artifact path '{rel_path}' is not a relative path inside the output root"
        )));
    }
    Ok(rel_path.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
