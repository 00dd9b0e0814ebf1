//! Store de procedencia: índice durable de artifacts ya registrados.
//!
//! Abstraído como capacidad mínima `{find_by_hash_and_tag, register}` para
//! que la caché sea testeable con un fake in-memory sin depender de ningún
//! motor de almacenamiento concreto. El dedup compara por hash de contenido
//! en el momento de la lectura, no de la escritura.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Artifact;

/// Registro durable de un artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: Uuid,
    pub architecture: String,
    pub content_hash: String,
    pub storage_path: std::path::PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Capacidad de búsqueda/registro que necesita la caché.
pub trait ProvenanceStore {
    /// Busca un registro previo con el mismo par `(hash, arquitectura)`.
    fn find_by_hash_and_tag(&self, content_hash: &str, architecture: &str) -> Option<ModelRecord>;

    /// Registra el artifact y devuelve su referencia opaca.
    fn register(&mut self, artifact: &Artifact) -> ModelRecord;
}

/// Implementación in-memory, usada en tests y en ejecuciones sin backend.
#[derive(Debug, Default)]
pub struct InMemoryProvenanceStore {
    records: Vec<ModelRecord>,
}

impl InMemoryProvenanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProvenanceStore for InMemoryProvenanceStore {
    fn find_by_hash_and_tag(&self, content_hash: &str, architecture: &str) -> Option<ModelRecord> {
        self.records
            .iter()
            .find(|r| r.content_hash == content_hash && r.architecture == architecture)
            .cloned()
    }

    fn register(&mut self, artifact: &Artifact) -> ModelRecord {
        let record = ModelRecord {
            id: Uuid::new_v4(),
            architecture: artifact.architecture.clone(),
            content_hash: artifact.content_hash.clone().unwrap_or_default(),
            storage_path: artifact.storage_path.clone(),
            created_at: Utc::now(),
        };
        self.records.push(record.clone());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArtifactOrigin;

    fn art(hash: &str, arch: &str) -> Artifact {
        Artifact {
            architecture: arch.into(),
            content_hash: Some(hash.into()),
            origin: ArtifactOrigin::LocalPath,
            storage_path: "/tmp/x.model".into(),
            provenance_id: None,
        }
    }

    #[test]
    fn find_matches_on_hash_and_tag_pair() {
        let mut store = InMemoryProvenanceStore::new();
        store.register(&art("abc", "mace"));

        assert!(store.find_by_hash_and_tag("abc", "mace").is_some());
        // Mismo hash, otro tag: no es el mismo artifact.
        assert!(store.find_by_hash_and_tag("abc", "chgnet").is_none());
        assert!(store.find_by_hash_and_tag("zzz", "mace").is_none());
    }

    #[test]
    fn register_assigns_fresh_ids() {
        let mut store = InMemoryProvenanceStore::new();
        let a = store.register(&art("abc", "mace"));
        let b = store.register(&art("def", "mace"));
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }
}
