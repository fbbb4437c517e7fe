//! # Artifact Delivery
//!
//! Writes a successful export artifact to disk under its delivery filename,
//! `<entity>_export.<ext>`. Delivery is a collaborator action: the export
//! controller returns the artifact to the caller, and the caller decides
//! whether and where to deliver it.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::export::Artifact;

/// Writes `artifact` into `dir`, creating the directory if needed.
///
/// Returns the full path of the delivered file.
pub async fn deliver(artifact: &Artifact, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(&artifact.filename);
    tokio::fs::write(&path, &artifact.bytes).await?;

    info!(
        path = %path.display(),
        size_bytes = artifact.bytes.len(),
        "Export artifact delivered"
    );
    Ok(path)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("atlas-delivery-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_deliver_writes_artifact_under_its_filename() {
        let dir = scratch_dir("write");
        let artifact = Artifact {
            bytes: vec![b'x'; 2048],
            content_type: Some("text/csv".to_string()),
            filename: "invoices_export.csv".to_string(),
        };

        let path = deliver(&artifact, &dir).await.unwrap();

        assert_eq!(path, dir.join("invoices_export.csv"));
        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written.len(), 2048);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_deliver_creates_missing_directories() {
        let dir = scratch_dir("nested").join("a").join("b");
        let artifact = Artifact {
            bytes: b"{}".to_vec(),
            content_type: None,
            filename: "products_export.json".to_string(),
        };

        let path = deliver(&artifact, &dir).await.unwrap();
        assert!(tokio::fs::try_exists(&path).await.unwrap());

        tokio::fs::remove_dir_all(dir.parent().unwrap().parent().unwrap())
            .await
            .unwrap();
    }
}
