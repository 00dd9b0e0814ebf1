//! Equation of state: barrido de volúmenes sobre el cálculo base.
//!
//! Siempre emite `--write-structures`; las estructuras generadas se anotan
//! en el archivo de resultados. Convención de bools: OmitFalse.

use serde::{Deserialize, Serialize};
use serde_json::json;

use mlip_core::{Defaults, ResolveError, ResolvedInputs};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EosSettings {
    /// Factor de escala mínimo de volumen.
    pub min_volume: Option<f64>,
    /// Factor de escala máximo de volumen.
    pub max_volume: Option<f64>,
    /// Cantidad de volúmenes a muestrear.
    pub n_volumes: Option<u64>,
    /// Tipo de ecuación de estado a ajustar.
    pub eos_type: Option<String>,
    /// Minimizar la estructura inicial antes del barrido.
    pub minimize: Option<bool>,
    /// Minimizar todas las estructuras generadas.
    pub minimize_all: Option<bool>,
    pub fmax: Option<f64>,
    /// Prefijo de los archivos de salida del barrido.
    pub file_prefix: Option<String>,
}

pub(crate) fn extend(
    resolved: &mut ResolvedInputs,
    settings: &EosSettings,
    defaults: &Defaults,
    retrieve: &mut Vec<String>,
) -> Result<(), ResolveError> {
    resolved.params.insert("write_structures".into(), json!(true));

    if let Some(v) = settings.min_volume {
        resolved.params.insert("min_volume".into(), json!(v));
    }
    if let Some(v) = settings.max_volume {
        resolved.params.insert("max_volume".into(), json!(v));
    }
    if let Some(v) = settings.n_volumes {
        resolved.params.insert("n_volumes".into(), json!(v));
    }
    if let Some(v) = &settings.eos_type {
        resolved.params.insert("eos_type".into(), json!(v));
    }
    if let Some(v) = settings.minimize {
        resolved.params.insert("minimize".into(), json!(v));
    }
    if let Some(v) = settings.minimize_all {
        resolved.params.insert("minimize_all".into(), json!(v));
    }
    if let Some(v) = settings.fmax {
        resolved.params.insert("fmax".into(), json!(v));
    }
    if let Some(v) = &settings.file_prefix {
        resolved.params.insert("file_prefix".into(), json!(v));
    }

    retrieve.push(defaults.results_file.clone());
    Ok(())
}
