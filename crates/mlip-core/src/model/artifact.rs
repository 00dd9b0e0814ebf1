//! Artifact: un modelo MLIP entrenado como blob binario inmutable.
//!
//! La identidad lógica es el par `(content_hash, architecture)`: dos
//! artifacts con el mismo par son el *mismo* artifact, y tras un pase de
//! dedup sólo una ruta de almacenamiento sobrevive. El hash de un archivo
//! local se calcula de forma perezosa, recién en la primera comparación.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hashing::hash_file;

/// De dónde vino el blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactOrigin {
    /// Archivo ya presente en disco al crearlo.
    LocalPath,
    /// Descargado desde esta URI.
    RemoteUri(String),
}

/// Modelo entrenado + metadata. Inmutable una vez hasheado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Familia de modelo ("mace", "chgnet", ...). Particiona la caché.
    pub architecture: String,
    /// Digest SHA-256 de los bytes. `None` mientras nadie lo necesitó.
    pub content_hash: Option<String>,
    pub origin: ArtifactOrigin,
    /// Dónde viven los bytes ahora mismo.
    pub storage_path: PathBuf,
    /// Referencia opaca si quedó registrado en un store de procedencia.
    pub provenance_id: Option<Uuid>,
}

impl Artifact {
    /// Envuelve un archivo local existente. Sin red, sin dedup, sin hash.
    pub fn local(path: &Path, architecture: &str) -> Result<Self, io::Error> {
        let abs = path.canonicalize()?;
        Ok(Self {
            architecture: architecture.to_string(),
            content_hash: None,
            origin: ArtifactOrigin::LocalPath,
            storage_path: abs,
            provenance_id: None,
        })
    }

    /// Devuelve el hash, calculándolo del disco la primera vez.
    pub fn ensure_hash(&mut self) -> io::Result<&str> {
        let hash = match self.content_hash.take() {
            Some(h) => h,
            None => hash_file(&self.storage_path)?,
        };
        Ok(self.content_hash.insert(hash).as_str())
    }

    /// Nombre de archivo bajo el cual está almacenado.
    pub fn filename(&self) -> Option<&str> {
        self.storage_path.file_name().and_then(|n| n.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_resolves_to_absolute_path_and_leaves_hash_unset() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("m.model");
        std::fs::write(&p, b"pesos").unwrap();

        let art = Artifact::local(&p, "mace").unwrap();
        assert!(art.storage_path.is_absolute());
        assert_eq!(art.architecture, "mace");
        assert!(art.content_hash.is_none());
        assert_eq!(art.origin, ArtifactOrigin::LocalPath);
    }

    #[test]
    fn ensure_hash_computes_once_and_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("m.model");
        std::fs::write(&p, b"pesos").unwrap();

        let mut art = Artifact::local(&p, "mace").unwrap();
        let h1 = art.ensure_hash().unwrap().to_string();
        let h2 = art.ensure_hash().unwrap().to_string();
        assert_eq!(h1, h2);
    }

    #[test]
    fn local_missing_file_is_io_error() {
        assert!(Artifact::local(Path::new("/no/existe.model"), "mace").is_err());
    }
}
