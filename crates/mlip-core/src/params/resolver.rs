//! Resolución común a todos los tipos de cálculo.
//!
//! Produce el `ResolvedInputs` con exactamente un valor ganador por setting.
//! La parte específica de cada tipo (ensemble, minimize_kwargs, ...) la
//! agrega el assembler sobre el mismo mapping, y recién entonces se llama a
//! `finalize` para recortar del overlay las claves ya resueltas.

use std::path::PathBuf;

use log::debug;
use serde_json::{json, Map, Value};

use crate::cache::{Fetcher, ModelCache, ProvenanceStore};
use crate::errors::ResolveError;
use crate::model::Artifact;

use super::{ConfigOverlay, Defaults, ParamMap};

/// Campos explícitos del request, todos opcionales. Fuente de máxima
/// precedencia.
#[derive(Debug, Default, Clone)]
pub struct CommonInputs {
    pub arch: Option<String>,
    /// Artifact de modelo adjunto. Su ruta se usa tal cual.
    pub model: Option<Artifact>,
    /// Referencia explícita a la estructura de entrada.
    pub structure: Option<PathBuf>,
    pub device: Option<String>,
    pub precision: Option<String>,
    pub log_filename: Option<String>,
}

/// Copia filtrada del overlay que se reenvía junto a la línea de comandos.
#[derive(Debug, Clone)]
pub struct Passthrough {
    pub filename: String,
    pub content: String,
}

/// Mapping resuelto más el contexto que el assembler necesita después.
#[derive(Debug)]
pub struct ResolvedInputs {
    /// Mapping ordenado listo para serializar.
    pub params: ParamMap,
    /// De dónde sale la estructura (el staging del archivo es del motor).
    pub structure_source: PathBuf,
    pub architecture: String,
    pub log_filename: String,
    /// Artifact resuelto, si uno fue adjuntado o descargado.
    pub model: Option<Artifact>,
    pub passthrough: Option<Passthrough>,
}

/// Resuelve settings contra la caché de modelos y los defaults inyectados.
pub struct Resolver<'a, F: Fetcher> {
    cache: &'a ModelCache<F>,
    defaults: &'a Defaults,
}

impl<'a, F: Fetcher> Resolver<'a, F> {
    pub fn new(cache: &'a ModelCache<F>, defaults: &'a Defaults) -> Self {
        Self { cache, defaults }
    }

    pub fn defaults(&self) -> &Defaults {
        self.defaults
    }

    /// Resolución compartida: estructura, log, precisión, dispositivo,
    /// arquitectura y modelo. Falla rápido: ningún token se construye si un
    /// input requerido falta o hay conflicto.
    pub fn resolve_common(
        &self,
        inputs: &CommonInputs,
        overlay: Option<&ConfigOverlay>,
        store: Option<&mut (dyn ProvenanceStore + '_)>,
    ) -> Result<ResolvedInputs, ResolveError> {
        // Estructura: explícita > overlay. Sin estructura no hay cálculo.
        let structure_source = match (&inputs.structure, overlay) {
            (Some(path), _) => path.clone(),
            (None, Some(o)) => match o.get_str("struct") {
                Some(s) => {
                    let path = PathBuf::from(s);
                    if !path.exists() {
                        return Err(ResolveError::OverlayPathMissing { key: "struct".into(), path });
                    }
                    path
                }
                None => return Err(ResolveError::MissingStructure),
            },
            (None, None) => return Err(ResolveError::MissingStructure),
        };

        let log_filename = inputs.log_filename.clone().unwrap_or_else(|| self.defaults.log_file.clone());

        let precision = pick_scalar(&inputs.precision, overlay, "precision", &self.defaults.precision);
        let device = pick_scalar(&inputs.device, overlay, "device", &self.defaults.device);

        // Arquitectura: dos fuentes igual de explícitas en conflicto son un
        // error de validación, nunca un override silencioso.
        let architecture = match (&inputs.arch, &inputs.model) {
            (Some(explicit), Some(artifact)) if artifact.architecture != *explicit => {
                return Err(ResolveError::ArchConflict {
                    explicit: explicit.clone(),
                    artifact: artifact.architecture.clone(),
                });
            }
            (Some(explicit), _) => explicit.clone(),
            (None, Some(artifact)) => artifact.architecture.clone(),
            (None, None) => pick_scalar(&None, overlay, "arch", &self.defaults.arch),
        };

        // Modelo: artifact adjunto > entrada `model` del overlay (sin fetch,
        // el ejecutable la resuelve solo) > descarga del modelo por defecto
        // etiquetado con la arquitectura recién resuelta.
        let mut model: Option<Artifact> = None;
        let mut model_path: Option<PathBuf> = None;
        if let Some(artifact) = &inputs.model {
            model_path = Some(artifact.storage_path.clone());
            model = Some(artifact.clone());
        } else if overlay.map(|o| o.contains("model")).unwrap_or(false) {
            debug!("model taken from config overlay, no fetch");
        } else {
            let fetched = self
                .cache
                .resolve_remote(&self.defaults.model_uri, &architecture, None, false, store)?
                .into_artifact();
            model_path = Some(fetched.storage_path.clone());
            model = Some(fetched);
        }

        let mut calc_kwargs = Map::new();
        calc_kwargs.insert("default_dtype".to_string(), json!(precision));
        if let Some(path) = &model_path {
            calc_kwargs.insert("model".to_string(), json!(path.to_string_lossy()));
        }

        let mut params = ParamMap::new();
        params.insert("struct".to_string(), json!(self.defaults.input_file));
        params.insert("log".to_string(), json!(log_filename));
        params.insert("calc_kwargs".to_string(), Value::Object(calc_kwargs));
        params.insert("device".to_string(), json!(device));
        params.insert("arch".to_string(), json!(architecture));

        Ok(ResolvedInputs {
            params,
            structure_source,
            architecture,
            log_filename,
            model,
            passthrough: None,
        })
    }

    /// Cierra la resolución una vez que el tipo de cálculo agregó sus claves:
    /// si hay overlay, lo filtra quitando todo lo ya resuelto en el mapping y
    /// agrega el token `config` que apunta a la copia reenviada.
    pub fn finalize(&self, resolved: &mut ResolvedInputs, overlay: Option<&ConfigOverlay>) {
        if let Some(o) = overlay {
            let skip: Vec<String> = resolved.params.keys().cloned().collect();
            let content = o.render_filtered(&skip);
            resolved.params.insert("config".to_string(), json!(self.defaults.config_file));
            resolved.passthrough = Some(Passthrough { filename: self.defaults.config_file.clone(), content });
        }
    }
}

/// explícito > overlay > default, para settings escalares.
fn pick_scalar(explicit: &Option<String>, overlay: Option<&ConfigOverlay>, key: &str, default: &str) -> String {
    if let Some(v) = explicit {
        return v.clone();
    }
    if let Some(v) = overlay.and_then(|o| o.get_str(key)) {
        return v;
    }
    default.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Fetcher;
    use crate::errors::CacheError;
    use std::path::Path;

    struct FakeFetcher;

    impl Fetcher for FakeFetcher {
        fn fetch(&self, _uri: &str, dest: &Path) -> Result<(), CacheError> {
            std::fs::write(dest, b"default model bytes")?;
            Ok(())
        }
    }

    fn setup() -> (tempfile::TempDir, Defaults) {
        let dir = tempfile::tempdir().unwrap();
        let defaults = Defaults {
            cache_root: dir.path().join("cache"),
            model_uri: "https://models.test/mace_mp_small.model".into(),
            ..Defaults::default()
        };
        (dir, defaults)
    }

    fn structure(dir: &tempfile::TempDir) -> PathBuf {
        let p = dir.path().join("NaCl.cif");
        std::fs::write(&p, "data_NaCl").unwrap();
        p
    }

    fn attached(dir: &tempfile::TempDir, arch: &str) -> Artifact {
        let p = dir.path().join("attached.model");
        std::fs::write(&p, b"attached weights").unwrap();
        Artifact::local(&p, arch).unwrap()
    }

    #[test]
    fn explicit_arch_vs_attached_artifact_conflict_is_error() {
        let (dir, defaults) = setup();
        let cache = ModelCache::new(&defaults.cache_root, FakeFetcher);
        let resolver = Resolver::new(&cache, &defaults);

        let inputs = CommonInputs {
            arch: Some("mace".into()),
            model: Some(attached(&dir, "chgnet")),
            structure: Some(structure(&dir)),
            ..CommonInputs::default()
        };
        let err = resolver.resolve_common(&inputs, None, None).unwrap_err();
        assert!(matches!(err, ResolveError::ArchConflict { .. }));
    }

    #[test]
    fn artifact_alone_supplies_architecture() {
        let (dir, defaults) = setup();
        let cache = ModelCache::new(&defaults.cache_root, FakeFetcher);
        let resolver = Resolver::new(&cache, &defaults);

        let inputs = CommonInputs {
            model: Some(attached(&dir, "mace")),
            structure: Some(structure(&dir)),
            ..CommonInputs::default()
        };
        let resolved = resolver.resolve_common(&inputs, None, None).unwrap();
        assert_eq!(resolved.architecture, "mace");
        assert_eq!(resolved.params["arch"], json!("mace"));
    }

    #[test]
    fn matching_explicit_and_artifact_arch_is_fine() {
        let (dir, defaults) = setup();
        let cache = ModelCache::new(&defaults.cache_root, FakeFetcher);
        let resolver = Resolver::new(&cache, &defaults);

        let inputs = CommonInputs {
            arch: Some("mace".into()),
            model: Some(attached(&dir, "mace")),
            structure: Some(structure(&dir)),
            ..CommonInputs::default()
        };
        assert!(resolver.resolve_common(&inputs, None, None).is_ok());
    }

    #[test]
    fn default_model_is_fetched_and_tagged_with_resolved_arch() {
        let (dir, defaults) = setup();
        let cache = ModelCache::new(&defaults.cache_root, FakeFetcher);
        let resolver = Resolver::new(&cache, &defaults);

        let inputs = CommonInputs {
            arch: Some("mace".into()),
            structure: Some(structure(&dir)),
            ..CommonInputs::default()
        };
        let resolved = resolver.resolve_common(&inputs, None, None).unwrap();

        let model = resolved.model.expect("default model fetched");
        assert_eq!(model.architecture, "mace");
        assert!(model.storage_path.starts_with(defaults.cache_root.canonicalize().unwrap()));
        // La ruta del modelo cacheado entra al grupo calc_kwargs.
        let kwargs = resolved.params["calc_kwargs"].as_object().unwrap();
        assert_eq!(kwargs["model"], json!(model.storage_path.to_string_lossy()));
        assert_eq!(kwargs["default_dtype"], json!("float64"));
    }

    #[test]
    fn overlay_model_entry_suppresses_fetch() {
        let (dir, defaults) = setup();
        let cache = ModelCache::new(&defaults.cache_root, FakeFetcher);
        let resolver = Resolver::new(&cache, &defaults);

        let mut map = ParamMap::new();
        map.insert("model".into(), json!("/opt/models/local.model"));
        let overlay = ConfigOverlay::from_map(map);

        let inputs = CommonInputs { structure: Some(structure(&dir)), ..CommonInputs::default() };
        let resolved = resolver.resolve_common(&inputs, Some(&overlay), None).unwrap();

        assert!(resolved.model.is_none());
        assert!(!resolved.params["calc_kwargs"].as_object().unwrap().contains_key("model"));
        // Nada se descargó.
        assert!(!defaults.cache_root.exists() || std::fs::read_dir(&defaults.cache_root).unwrap().next().is_none());
    }

    #[test]
    fn missing_structure_everywhere_is_hard_error() {
        let (_dir, defaults) = setup();
        let cache = ModelCache::new(&defaults.cache_root, FakeFetcher);
        let resolver = Resolver::new(&cache, &defaults);

        let err = resolver.resolve_common(&CommonInputs::default(), None, None).unwrap_err();
        assert!(matches!(err, ResolveError::MissingStructure));
    }

    #[test]
    fn overlay_struct_path_must_exist() {
        let (_dir, defaults) = setup();
        let cache = ModelCache::new(&defaults.cache_root, FakeFetcher);
        let resolver = Resolver::new(&cache, &defaults);

        let mut map = ParamMap::new();
        map.insert("struct".into(), json!("/no/such/structure.cif"));
        let overlay = ConfigOverlay::from_map(map);

        let err = resolver.resolve_common(&CommonInputs::default(), Some(&overlay), None).unwrap_err();
        assert!(matches!(err, ResolveError::OverlayPathMissing { .. }));
    }

    #[test]
    fn device_and_precision_follow_explicit_overlay_default_order() {
        let (dir, defaults) = setup();
        let cache = ModelCache::new(&defaults.cache_root, FakeFetcher);
        let resolver = Resolver::new(&cache, &defaults);

        let mut map = ParamMap::new();
        map.insert("device".into(), json!("cuda"));
        map.insert("model".into(), json!("m.model"));
        let overlay = ConfigOverlay::from_map(map);

        // Overlay gana al default.
        let inputs = CommonInputs { structure: Some(structure(&dir)), ..CommonInputs::default() };
        let resolved = resolver.resolve_common(&inputs, Some(&overlay), None).unwrap();
        assert_eq!(resolved.params["device"], json!("cuda"));

        // Explícito gana al overlay.
        let inputs = CommonInputs {
            structure: Some(structure(&dir)),
            device: Some("mps".into()),
            ..CommonInputs::default()
        };
        let resolved = resolver.resolve_common(&inputs, Some(&overlay), None).unwrap();
        assert_eq!(resolved.params["device"], json!("mps"));
        assert_eq!(resolved.params["calc_kwargs"]["default_dtype"], json!("float64"));
    }

    #[test]
    fn finalize_strips_resolved_keys_from_passthrough() {
        let (dir, defaults) = setup();
        let cache = ModelCache::new(&defaults.cache_root, FakeFetcher);
        let resolver = Resolver::new(&cache, &defaults);

        let mut map = ParamMap::new();
        map.insert("device".into(), json!("cuda"));
        map.insert("model".into(), json!("m.model"));
        map.insert("fmax".into(), json!(0.05));
        let overlay = ConfigOverlay::from_map(map);

        let inputs = CommonInputs { structure: Some(structure(&dir)), ..CommonInputs::default() };
        let mut resolved = resolver.resolve_common(&inputs, Some(&overlay), None).unwrap();
        resolver.finalize(&mut resolved, Some(&overlay));

        let pass = resolved.passthrough.expect("passthrough present");
        assert_eq!(pass.filename, "config.yaml");
        // `device` quedó resuelto en el cmdline, no debe viajar dos veces.
        assert!(!pass.content.contains("device"));
        // `model` y `fmax` no están en el cmdline: sobreviven en la copia.
        assert!(pass.content.contains("model"));
        assert!(pass.content.contains("fmax"));
        assert_eq!(resolved.params["config"], json!("config.yaml"));
    }
}
