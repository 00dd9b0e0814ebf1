//! Descriptors: flags booleanas de presencia sobre el cálculo base.
//!
//! Convención de bools: OmitFalse (un `false` simplemente no emite flag).

use serde::{Deserialize, Serialize};
use serde_json::json;

use mlip_core::{Defaults, ResolveError, ResolvedInputs};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptorsSettings {
    /// Calcular sólo descriptores invariantes.
    pub invariants_only: Option<bool>,
    /// Descriptores medios por elemento.
    pub calc_per_element: Option<bool>,
    /// Descriptores por átomo.
    pub calc_per_atom: Option<bool>,
}

pub(crate) fn extend(
    resolved: &mut ResolvedInputs,
    settings: &DescriptorsSettings,
    defaults: &Defaults,
    retrieve: &mut Vec<String>,
) -> Result<(), ResolveError> {
    if let Some(v) = settings.invariants_only {
        resolved.params.insert("invariants_only".into(), json!(v));
    }
    if let Some(v) = settings.calc_per_element {
        resolved.params.insert("calc_per_element".into(), json!(v));
    }
    if let Some(v) = settings.calc_per_atom {
        resolved.params.insert("calc_per_atom".into(), json!(v));
    }
    // Los descriptores quedan anotados en el mismo archivo de resultados.
    let out = defaults.results_file.clone();
    resolved.params.insert("out".into(), json!(out));
    retrieve.push(out);
    Ok(())
}
