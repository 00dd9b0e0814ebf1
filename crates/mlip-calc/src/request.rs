//! Request de cálculo: los campos nombrados que expone la capa del motor de
//! workflows, todos opcionales salvo lo que la validación exija por tipo.

use std::path::PathBuf;

use mlip_core::{Artifact, ConfigOverlay};

/// De dónde sale el modelo adjunto al request.
#[derive(Debug, Clone)]
pub enum ModelSource {
    /// Artifact ya resuelto (p. ej. output de un entrenamiento previo).
    Attached(Artifact),
    /// Archivo local: se envuelve sin red ni dedup.
    Local(PathBuf),
    /// URI remota: pasa por la caché con dedup por hash de contenido.
    Remote {
        uri: String,
        /// `true` salta el dedup y garantiza una copia fresca en disco.
        keep_duplicate: bool,
    },
}

/// Inputs de un cálculo tal como llegan del motor.
#[derive(Debug, Default, Clone)]
pub struct CalcRequest {
    pub arch: Option<String>,
    pub model: Option<ModelSource>,
    pub structure: Option<PathBuf>,
    pub device: Option<String>,
    pub precision: Option<String>,
    pub log_filename: Option<String>,
    /// Overlay de configuración ya parseado (fuente de menor precedencia).
    pub config: Option<ConfigOverlay>,
}
