//! Single point: el cálculo base, sin claves extra más allá de las comunes.

use serde::{Deserialize, Serialize};
use serde_json::json;

use mlip_core::{Defaults, ResolveError, ResolvedInputs};

/// Settings específicos de single point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinglePointSettings {
    /// Propiedades a calcular (energy, forces, stress, ...). La flag se
    /// repite una vez por propiedad.
    pub properties: Option<Vec<String>>,
    /// Archivo de resultados; por defecto el nombre fijo de resultados.
    pub out_file: Option<String>,
}

pub(crate) fn extend(
    resolved: &mut ResolvedInputs,
    settings: &SinglePointSettings,
    defaults: &Defaults,
    retrieve: &mut Vec<String>,
) -> Result<(), ResolveError> {
    if let Some(props) = &settings.properties {
        resolved.params.insert("properties".into(), json!(props));
    }
    let out = settings.out_file.clone().unwrap_or_else(|| defaults.results_file.clone());
    resolved.params.insert("out".into(), json!(out));
    retrieve.push(out);
    Ok(())
}
