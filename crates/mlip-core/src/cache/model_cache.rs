//! Resolución de modelos contra la caché en disco.
//!
//! Regla de dedup elegida (y fijada por tests): el escaneo busca duplicados
//! SOLO dentro de la partición exacta `{cache_root}/{architecture}`. Un
//! modelo byte-idéntico cacheado bajo otro tag es una coincidencia con
//! significado y no debe renombrar la arquitectura en silencio; ambos
//! archivos persisten.
//!
//! Carrera conocida: dos resoluciones concurrentes del mismo modelo aún no
//! cacheado pueden descargar ambas antes de que ninguna complete su chequeo.
//! El esquema de sufijos garantiza que nunca hay sobreescritura; el duplicado
//! benigno queda hasta que un pase posterior o el dedup del store de
//! procedencia consolide referencias. No se requiere locking.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::errors::CacheError;
use crate::hashing::hash_file;
use crate::model::{Artifact, ArtifactOrigin};

use super::fetch::Fetcher;
use super::store::ProvenanceStore;

/// Resultado de una resolución remota: el caller ramifica por variante en
/// vez de atrapar excepciones.
#[derive(Debug)]
pub enum CacheOutcome {
    /// Bytes nuevos: el archivo descargado se queda.
    Fresh(Artifact),
    /// Ya existía un artifact con el mismo `(hash, arquitectura)`; el
    /// download se borró y se devuelve la referencia previa.
    Deduplicated(Artifact),
}

impl CacheOutcome {
    pub fn into_artifact(self) -> Artifact {
        match self {
            CacheOutcome::Fresh(a) | CacheOutcome::Deduplicated(a) => a,
        }
    }
}

/// Caché de modelos particionada por arquitectura.
pub struct ModelCache<F: Fetcher> {
    cache_root: PathBuf,
    fetcher: F,
}

impl<F: Fetcher> ModelCache<F> {
    pub fn new(cache_root: impl Into<PathBuf>, fetcher: F) -> Self {
        Self { cache_root: cache_root.into(), fetcher }
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Envuelve un archivo local existente. Sin red ni dedup; el hash queda
    /// sin calcular hasta la primera comparación.
    pub fn resolve_local(&self, path: &Path, architecture: &str) -> Result<Artifact, CacheError> {
        if !path.is_file() {
            return Err(CacheError::LocalNotFound(path.to_path_buf()));
        }
        Ok(Artifact::local(path, architecture)?)
    }

    /// Descarga `uri` dentro de la partición de `architecture` y deduplica
    /// por hash de contenido.
    ///
    /// `keep_duplicate` es la válvula de escape: devuelve el archivo fresco
    /// sin ningún chequeo, para callers que necesitan una copia garantizada
    /// en disco.
    pub fn resolve_remote(
        &self,
        uri: &str,
        architecture: &str,
        filename: Option<&str>,
        keep_duplicate: bool,
        mut store: Option<&mut (dyn ProvenanceStore + '_)>,
    ) -> Result<CacheOutcome, CacheError> {
        let partition = self.cache_root.join(architecture);
        fs::create_dir_all(&partition)?;

        let name = filename.map(str::to_string).unwrap_or_else(|| filename_from_uri(uri));
        let dest = disambiguate(&partition, &name);
        debug!("fetching {} -> {}", uri, dest.display());
        self.fetcher.fetch(uri, &dest)?;

        // Hash del archivo recién bajado. Si falla se presume corrupto y se
        // deja en disco para inspección.
        let hash = hash_file(&dest).map_err(|e| CacheError::HashFailed { path: dest.clone(), source: e })?;

        let mut artifact = Artifact {
            architecture: architecture.to_string(),
            content_hash: Some(hash.clone()),
            origin: ArtifactOrigin::RemoteUri(uri.to_string()),
            storage_path: dest.canonicalize()?,
            provenance_id: None,
        };

        if keep_duplicate {
            info!("keep_duplicate=true, skipping dedup for {}", dest.display());
            return Ok(CacheOutcome::Fresh(artifact));
        }

        // 1) Hermanos en disco dentro de la misma partición. Si el store ya
        // conoce este `(hash, arquitectura)`, la referencia conserva su id.
        if let Some(existing) = self.find_sibling(&partition, &artifact.storage_path, &hash)? {
            fs::remove_file(&artifact.storage_path)?;
            debug!("dedup hit on disk: {} reused for {}", existing.display(), uri);
            let provenance_id = store
                .as_deref_mut()
                .and_then(|s| s.find_by_hash_and_tag(&hash, architecture))
                .map(|record| record.id);
            return Ok(CacheOutcome::Deduplicated(Artifact {
                architecture: architecture.to_string(),
                content_hash: Some(hash),
                origin: ArtifactOrigin::RemoteUri(uri.to_string()),
                storage_path: existing,
                provenance_id,
            }));
        }

        // 2) Registro previo en el store de procedencia, si hay uno. Sólo se
        // reutiliza si su ruta sigue existiendo; un registro huérfano no debe
        // dejarnos sin bytes en disco.
        if let Some(store) = store.as_deref_mut() {
            if let Some(record) = store.find_by_hash_and_tag(&hash, architecture) {
                if record.storage_path.is_file() {
                    // El registro puede apuntar a esta misma ruta (archivo
                    // repuesto tras un borrado): no borrar la única copia.
                    if record.storage_path != artifact.storage_path {
                        fs::remove_file(&artifact.storage_path)?;
                    }
                    debug!("dedup hit in provenance store: record {}", record.id);
                    return Ok(CacheOutcome::Deduplicated(Artifact {
                        architecture: record.architecture,
                        content_hash: Some(record.content_hash),
                        origin: ArtifactOrigin::RemoteUri(uri.to_string()),
                        storage_path: record.storage_path,
                        provenance_id: Some(record.id),
                    }));
                }
            }
            let record = store.register(&artifact);
            artifact.provenance_id = Some(record.id);
        }

        info!("cached new model {} under {}", uri, artifact.storage_path.display());
        Ok(CacheOutcome::Fresh(artifact))
    }

    /// Busca en la partición otro archivo con el mismo digest.
    fn find_sibling(&self, partition: &Path, just_fetched: &Path, hash: &str) -> Result<Option<PathBuf>, CacheError> {
        for entry in fs::read_dir(partition)? {
            let path = entry?.path();
            if !path.is_file() || path == *just_fetched {
                continue;
            }
            if hash_file(&path)? == hash {
                return Ok(Some(path.canonicalize()?));
            }
        }
        Ok(None)
    }
}

/// Último segmento de la ruta de la URI, sin query string.
fn filename_from_uri(uri: &str) -> String {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let name = path.rsplit('/').next().unwrap_or("");
    if name.is_empty() {
        "model".to_string()
    } else {
        name.to_string()
    }
}

/// Nombre libre dentro de `dir`: si `name` existe, prueba `name_2.ext`,
/// `name_3.ext`, ... La descarga nunca pisa un archivo preexistente.
fn disambiguate(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = Path::new(name).file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let ext = Path::new(name).extension().and_then(|e| e.to_str());
    let mut i = 2usize;
    loop {
        let next = match ext {
            Some(e) => format!("{stem}_{i}.{e}"),
            None => format!("{stem}_{i}"),
        };
        let candidate = dir.join(next);
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}
