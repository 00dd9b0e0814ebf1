//! Dinámica molecular.
//!
//! `ensemble` es obligatorio: explícito o del overlay, nunca un default. Las
//! claves de `md_kwargs` se serializan flag por flag en el nivel superior
//! (no como dict anidado). Convención de bools: OmitFalse.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use mlip_core::{merge_params, ConfigOverlay, Defaults, ResolveError, ResolvedInputs};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MdSettings {
    /// Ensamble termodinámico (nvt, nve, npt, ...).
    pub ensemble: Option<String>,
    /// Keywords libres de dinámica molecular (mapping).
    pub md_kwargs: Option<Value>,
}

pub(crate) fn extend(
    resolved: &mut ResolvedInputs,
    settings: &MdSettings,
    overlay: Option<&ConfigOverlay>,
    defaults: &Defaults,
    retrieve: &mut Vec<String>,
) -> Result<(), ResolveError> {
    let ensemble = settings
        .ensemble
        .clone()
        .or_else(|| overlay.and_then(|o| o.get_str("ensemble")))
        .ok_or(ResolveError::MissingEnsemble)?;
    resolved.params.insert("ensemble".into(), json!(ensemble.to_lowercase()));

    // Fusión explícito ⊳ overlay del grupo md_kwargs, aplanado al cmdline.
    let from_overlay = overlay.and_then(|o| o.get("md_kwargs")).cloned().unwrap_or_else(|| json!({}));
    let explicit = settings.md_kwargs.clone().unwrap_or_else(|| json!({}));
    let merged = merge_params(&from_overlay, &explicit);

    let mut stats_file = defaults.stats_file.clone();
    let mut traj_file = defaults.traj_file.clone();
    if let Some(map) = merged.as_object() {
        for (key, value) in map {
            // Overrides de archivos de salida, con clave en guion o guion bajo.
            match (key.replace('-', "_").as_str(), value.as_str()) {
                ("stats_file", Some(name)) => stats_file = name.to_string(),
                ("traj_file", Some(name)) => traj_file = name.to_string(),
                _ => {}
            }
            resolved.params.insert(key.clone(), value.clone());
        }
    }

    // Archivos de stats y trayectoria: con override o no, van al retrieval.
    retrieve.push(stats_file);
    retrieve.push(traj_file);
    Ok(())
}
