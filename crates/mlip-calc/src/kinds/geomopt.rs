//! Geometry optimisation.
//!
//! El grupo `minimize_kwargs` se FUSIONA, no se pisa: explícito sobre
//! overlay, clave por clave, y el nombre de la trayectoria por defecto se
//! inyecta en el grupo si falta. Ese mismo nombre entra a la lista de
//! retrieval: cmdline y retrieval nunca divergen.
//!
//! Convención de bools: NegateFalse (las flags de celda emiten `--no-...`
//! cuando son explícitamente false).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use mlip_core::{merge_params, ConfigOverlay, Defaults, ResolveError, ResolvedInputs};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeomOptSettings {
    /// Optimizar vectores de celda, ángulos y posiciones.
    pub opt_cell_fully: Option<bool>,
    /// Optimizar vectores de celda además de posiciones.
    pub opt_cell_lengths: Option<bool>,
    /// Fuerza máxima de convergencia.
    pub fmax: Option<f64>,
    /// Cantidad de pasos de optimización.
    pub steps: Option<u64>,
    /// Resto de keyword-arguments para el minimizador (mapping).
    pub minimize_kwargs: Option<Value>,
}

pub(crate) fn extend(
    resolved: &mut ResolvedInputs,
    settings: &GeomOptSettings,
    overlay: Option<&ConfigOverlay>,
    defaults: &Defaults,
    retrieve: &mut Vec<String>,
) -> Result<(), ResolveError> {
    let minimize_kwargs = merged_minimize_kwargs(settings, overlay, defaults);
    let traj = minimize_kwargs
        .get("traj_kwargs")
        .and_then(|t| t.get("filename"))
        .and_then(Value::as_str)
        .unwrap_or(&defaults.traj_file)
        .to_string();

    resolved.params.insert("minimize_kwargs".into(), minimize_kwargs);
    resolved.params.insert("write_traj".into(), json!(true));
    if let Some(v) = settings.opt_cell_fully {
        resolved.params.insert("opt_cell_fully".into(), json!(v));
    }
    if let Some(v) = settings.opt_cell_lengths {
        resolved.params.insert("opt_cell_lengths".into(), json!(v));
    }
    if let Some(v) = settings.fmax {
        resolved.params.insert("fmax".into(), json!(v));
    }
    if let Some(v) = settings.steps {
        resolved.params.insert("steps".into(), json!(v));
    }

    retrieve.push(traj);
    Ok(())
}

/// explícito ⊳ overlay, y luego el default de trayectoria si el grupo no
/// trae uno.
fn merged_minimize_kwargs(settings: &GeomOptSettings, overlay: Option<&ConfigOverlay>, defaults: &Defaults) -> Value {
    let from_overlay = overlay
        .and_then(|o| o.get("minimize_kwargs"))
        .cloned()
        .unwrap_or_else(|| json!({}));
    let explicit = settings.minimize_kwargs.clone().unwrap_or_else(|| json!({}));
    let mut merged = merge_params(&from_overlay, &explicit);

    if let Some(map) = merged.as_object_mut() {
        let traj_kwargs = map.entry("traj_kwargs".to_string()).or_insert_with(|| json!({}));
        if let Some(tk) = traj_kwargs.as_object_mut() {
            tk.entry("filename".to_string()).or_insert_with(|| json!(defaults.traj_file));
        }
    }
    merged
}
