//! Descarga de modelos remotos detrás de un trait.
//!
//! La caché no conoce la red directamente: recibe un `Fetcher`. En producción
//! es `HttpFetcher` (reqwest bloqueante); en tests, un fake que escribe bytes
//! fijos. Un fallo de fetch es fatal para el paso de resolución que lo pidió:
//! no hay reintentos ni timeout interno (el caller que necesite latencia
//! acotada envuelve la llamada con su propio deadline).

use std::fs::File;
use std::path::Path;

use crate::errors::CacheError;

/// Capacidad mínima de descarga que necesita la caché.
pub trait Fetcher {
    /// Trae los bytes de `uri` y los deja en `dest`. `dest` no existe aún
    /// (la caché ya desambiguó el nombre).
    fn fetch(&self, uri: &str, dest: &Path) -> Result<(), CacheError>;
}

/// Fetcher HTTP(S) bloqueante.
#[derive(Debug, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, uri: &str, dest: &Path) -> Result<(), CacheError> {
        let mut resp = reqwest::blocking::get(uri)
            .and_then(|r| r.error_for_status())
            .map_err(|e| CacheError::Fetch { uri: uri.to_string(), reason: e.to_string() })?;
        let mut out = File::create(dest)?;
        // Copia en streaming al disco, sin cargar el modelo entero en memoria.
        std::io::copy(&mut resp, &mut out)
            .map_err(|e| CacheError::Fetch { uri: uri.to_string(), reason: e.to_string() })?;
        Ok(())
    }
}
