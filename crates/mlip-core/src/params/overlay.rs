//! Overlay de configuración: archivo YAML del usuario, fuente de menor
//! precedencia.
//!
//! El overlay se consulta sólo para settings que ninguna fuente superior
//! aporta, salvo las claves "passthrough" (rutas de archivos de
//! entrenamiento) que siempre se leen de aquí. Cuando el overlay se reenvía
//! al ejecutable como archivo aparte, las claves ya resueltas en la línea de
//! comandos se eliminan de la copia: el valor autoritativo no debe quedar
//! sombreado por un valor viejo entrando por el canal lateral.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::ResolveError;

use super::ParamMap;

/// Mapping clave/valor parseado de un archivo de configuración del usuario.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverlay {
    path: Option<PathBuf>,
    map: ParamMap,
}

impl ConfigOverlay {
    /// Parsea el archivo YAML en `path`.
    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ResolveError::Overlay {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let map: ParamMap = serde_yaml::from_str(&raw).map_err(|e| ResolveError::Overlay {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { path: Some(path.to_path_buf()), map })
    }

    /// Overlay ya parseado (tests y construcción programática).
    pub fn from_map(map: ParamMap) -> Self {
        Self { path: None, map }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Valor como string, aceptando escalares YAML no-string.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.map.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Copia del mapping sin las claves de `skip` (comparación insensible a
    /// guion/underscore, como las flags).
    pub fn filtered(&self, skip: &[String]) -> ParamMap {
        let skip: Vec<String> = skip.iter().map(|k| normalize_key(k)).collect();
        self.map
            .iter()
            .filter(|(k, _)| !skip.contains(&normalize_key(k)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Contenido YAML del overlay filtrado, listo para reenviar.
    pub fn render_filtered(&self, skip: &[String]) -> String {
        let filtered = self.filtered(skip);
        serde_yaml::to_string(&filtered).unwrap_or_default()
    }
}

fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overlay() -> ConfigOverlay {
        let mut map = ParamMap::new();
        map.insert("arch".into(), json!("chgnet"));
        map.insert("ensemble".into(), json!("nvt"));
        map.insert("minimize-kwargs".into(), json!({"fmax": 0.05}));
        ConfigOverlay::from_map(map)
    }

    #[test]
    fn filtered_strips_resolved_keys() {
        let o = overlay();
        let left = o.filtered(&["arch".to_string(), "ensemble".to_string()]);
        assert_eq!(left.len(), 1);
        assert!(left.contains_key("minimize-kwargs"));
    }

    #[test]
    fn filtering_is_hyphen_underscore_insensitive() {
        let o = overlay();
        let left = o.filtered(&["minimize_kwargs".to_string()]);
        assert!(!left.contains_key("minimize-kwargs"));
    }

    #[test]
    fn load_reads_yaml_file_preserving_top_level_order() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.yaml");
        std::fs::write(&p, "struct: NaCl.cif\narch: mace\nfmax: 0.01\n").unwrap();

        let o = ConfigOverlay::load(&p).unwrap();
        let keys: Vec<&str> = o.keys().collect();
        assert_eq!(keys, vec!["struct", "arch", "fmax"]);
        assert_eq!(o.get_str("fmax").as_deref(), Some("0.01"));
    }

    #[test]
    fn load_missing_file_is_overlay_error() {
        let err = ConfigOverlay::load(Path::new("/no/config.yaml")).unwrap_err();
        assert!(matches!(err, ResolveError::Overlay { .. }));
    }
}
