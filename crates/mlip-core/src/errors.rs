//! Errores del núcleo, separados por preocupación.
//!
//! `CacheError` cubre I/O y red durante la resolución de artifacts (fatales,
//! sin reintento). `ResolveError` cubre validación de inputs: siempre se
//! reporta antes de construir ninguna línea de comandos.

use std::path::PathBuf;

use thiserror::Error;

/// Errores de I/O y red de la caché de modelos. Ninguno se reintenta.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("i/o error in model cache: {0}")]
    Io(#[from] std::io::Error),

    #[error("fetch failed for {uri}: {reason}")]
    Fetch { uri: String, reason: String },

    /// El archivo recién descargado no se pudo hashear. Se presume corrupto
    /// pero NO se borra, para que un humano pueda inspeccionarlo.
    #[error("cannot hash downloaded file {path}: {source}")]
    HashFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("local model file not found: {0}")]
    LocalNotFound(PathBuf),
}

/// Errores de validación de la resolución de parámetros.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Dos fuentes igual de explícitas declaran arquitecturas distintas.
    /// Nunca se resuelve en silencio.
    #[error("conflicting architectures: explicit '{explicit}' vs attached model '{artifact}'")]
    ArchConflict { explicit: String, artifact: String },

    #[error("no structure given: provide an explicit structure or a 'struct' entry in the config overlay")]
    MissingStructure,

    #[error("no thermodynamic ensemble given: provide 'ensemble' explicitly or in the config overlay")]
    MissingEnsemble,

    #[error("no config overlay given and this calculation kind requires one")]
    MissingOverlay,

    #[error("mandatory key '{0}' missing from config overlay")]
    MissingConfigKey(String),

    #[error("path given for '{key}' does not exist: {path}")]
    OverlayPathMissing { key: String, path: PathBuf },

    #[error("fine-tuning requested but no foundation model given in inputs or config overlay")]
    MissingFineTuneModel,

    #[error("cannot read config overlay {path}: {reason}")]
    Overlay { path: PathBuf, reason: String },

    #[error(transparent)]
    Cache(#[from] CacheError),
}
