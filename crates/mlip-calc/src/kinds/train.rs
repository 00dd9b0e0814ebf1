//! Entrenamiento de modelos.
//!
//! A diferencia del resto, no hay estructura ni modelo de cálculo: el
//! overlay es obligatorio y las claves de rutas de entrenamiento son
//! "passthrough": siempre se leen de él. Las rutas relativas se reescriben
//! absolutas en la copia reenviada, porque el ejecutable corre en otro
//! directorio de trabajo.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use mlip_core::{serialize, Artifact, BoolFlagStyle, Defaults, ParamMap, Passthrough, ResolveError};

use crate::plan::CalcPlan;
use crate::request::CalcRequest;

/// Nombre de la copia del config en el directorio de ejecución.
const TRAIN_CONFIG_COPY: &str = "mlip-train.yml";

/// Claves del overlay que deben ser rutas existentes.
const REQUIRED_PATH_KEYS: [&str; 3] = ["train_file", "valid_file", "test_file"];

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_RESULT_DIR: &str = "results";
const DEFAULT_CHECKPOINT_DIR: &str = "checkpoints";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainSettings {
    /// Ajuste fino de un modelo de fundación en vez de entrenar de cero.
    pub fine_tune: bool,
    /// Modelo a ajustar; también puede venir del overlay
    /// (`foundation_model`).
    pub foundation_model: Option<Artifact>,
}

pub(crate) fn plan_train(
    request: &CalcRequest,
    settings: &TrainSettings,
    defaults: &Defaults,
    run_id: String,
) -> Result<CalcPlan, ResolveError> {
    let overlay = request.config.as_ref().ok_or(ResolveError::MissingOverlay)?;

    let name = overlay
        .get_str("name")
        .ok_or_else(|| ResolveError::MissingConfigKey("name".into()))?;

    // Validar y absolutizar las rutas de entrenamiento antes de emitir nada.
    let mut content = overlay.filtered(&[]);
    for key in REQUIRED_PATH_KEYS {
        let raw = overlay
            .get_str(key)
            .ok_or_else(|| ResolveError::MissingConfigKey(key.into()))?;
        let path = PathBuf::from(&raw);
        let abs = path
            .canonicalize()
            .map_err(|_| ResolveError::OverlayPathMissing { key: key.into(), path })?;
        content.insert(key.to_string(), json!(abs.to_string_lossy()));
    }

    if settings.fine_tune {
        match (&settings.foundation_model, overlay.contains("foundation_model")) {
            (Some(model), _) => {
                content.insert("foundation_model".into(), json!(model.storage_path.to_string_lossy()));
            }
            (None, true) => {} // el overlay ya lo trae
            (None, false) => return Err(ResolveError::MissingFineTuneModel),
        }
    }

    let mut params = ParamMap::new();
    params.insert("mlip_config".into(), json!(TRAIN_CONFIG_COPY));
    if settings.fine_tune {
        params.insert("fine_tune".into(), json!(true));
    }
    let tokens = serialize(&params, "train", BoolFlagStyle::OmitFalse);

    let model_dir = overlay.get_str("model_dir").unwrap_or_else(|| ".".to_string());
    let mut retrieve = vec![
        defaults.output_file.clone(),
        run_id.clone(),
        overlay.get_str("log_dir").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
        overlay.get_str("result_dir").unwrap_or_else(|| DEFAULT_RESULT_DIR.to_string()),
        overlay.get_str("checkpoint_dir").unwrap_or_else(|| DEFAULT_CHECKPOINT_DIR.to_string()),
    ];
    retrieve.push(in_model_dir(&model_dir, &format!("{name}.model")));
    retrieve.push(in_model_dir(&model_dir, &format!("{name}_compiled.model")));

    let content = serde_yaml::to_string(&content).unwrap_or_default();

    Ok(CalcPlan {
        run_id,
        tokens,
        retrieve,
        structure_source: None,
        passthrough: Some(Passthrough { filename: TRAIN_CONFIG_COPY.to_string(), content }),
    })
}

fn in_model_dir(model_dir: &str, filename: &str) -> String {
    if model_dir == "." {
        filename.to_string()
    } else {
        Path::new(model_dir).join(filename).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlip_core::ConfigOverlay;

    fn overlay_with_files(dir: &Path, extra: &[(&str, serde_json::Value)]) -> ConfigOverlay {
        let mut map = ParamMap::new();
        map.insert("name".into(), json!("test-model"));
        for key in REQUIRED_PATH_KEYS {
            let p = dir.join(format!("{key}.xyz"));
            std::fs::write(&p, "data").unwrap();
            map.insert(key.into(), json!(p.to_string_lossy()));
        }
        for (k, v) in extra {
            map.insert(k.to_string(), v.clone());
        }
        ConfigOverlay::from_map(map)
    }

    #[test]
    fn train_requires_an_overlay() {
        let err = plan_train(&CalcRequest::default(), &TrainSettings::default(), &Defaults::default(), "id".into())
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingOverlay));
    }

    #[test]
    fn missing_mandatory_key_is_validation_error() {
        let mut map = ParamMap::new();
        map.insert("name".into(), json!("m"));
        let request = CalcRequest {
            config: Some(ConfigOverlay::from_map(map)),
            ..CalcRequest::default()
        };
        let err = plan_train(&request, &TrainSettings::default(), &Defaults::default(), "id".into()).unwrap_err();
        assert!(matches!(err, ResolveError::MissingConfigKey(k) if k == "train_file"));
    }

    #[test]
    fn nonexistent_training_path_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = ParamMap::new();
        map.insert("name".into(), json!("m"));
        map.insert("train_file".into(), json!("/no/such/train.xyz"));
        map.insert("valid_file".into(), json!(dir.path().join("v.xyz").to_string_lossy()));
        map.insert("test_file".into(), json!(dir.path().join("t.xyz").to_string_lossy()));
        let request = CalcRequest {
            config: Some(ConfigOverlay::from_map(map)),
            ..CalcRequest::default()
        };
        let err = plan_train(&request, &TrainSettings::default(), &Defaults::default(), "id".into()).unwrap_err();
        assert!(matches!(err, ResolveError::OverlayPathMissing { key, .. } if key == "train_file"));
    }

    #[test]
    fn plan_rewrites_paths_absolute_and_lists_model_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let request = CalcRequest {
            config: Some(overlay_with_files(dir.path(), &[])),
            ..CalcRequest::default()
        };
        let plan = plan_train(&request, &TrainSettings::default(), &Defaults::default(), "run-1".into()).unwrap();

        assert_eq!(plan.tokens, vec!["train", "--mlip-config", "mlip-train.yml"]);
        assert!(plan.retrieve.contains(&"test-model.model".to_string()));
        assert!(plan.retrieve.contains(&"test-model_compiled.model".to_string()));
        assert!(plan.retrieve.contains(&"logs".to_string()));

        let pass = plan.passthrough.unwrap();
        assert_eq!(pass.filename, "mlip-train.yml");
        // Las rutas reenviadas son absolutas.
        let canon = dir.path().canonicalize().unwrap();
        assert!(pass.content.contains(&canon.join("train_file.xyz").to_string_lossy().into_owned()));
    }

    #[test]
    fn fine_tune_without_model_anywhere_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let request = CalcRequest {
            config: Some(overlay_with_files(dir.path(), &[])),
            ..CalcRequest::default()
        };
        let settings = TrainSettings { fine_tune: true, foundation_model: None };
        let err = plan_train(&request, &settings, &Defaults::default(), "id".into()).unwrap_err();
        assert!(matches!(err, ResolveError::MissingFineTuneModel));
    }

    #[test]
    fn fine_tune_flag_and_model_path_reach_command_and_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("base.model");
        std::fs::write(&model_path, b"weights").unwrap();
        let model = Artifact::local(&model_path, "mace").unwrap();

        let request = CalcRequest {
            config: Some(overlay_with_files(dir.path(), &[])),
            ..CalcRequest::default()
        };
        let settings = TrainSettings { fine_tune: true, foundation_model: Some(model.clone()) };
        let plan = plan_train(&request, &settings, &Defaults::default(), "id".into()).unwrap();

        assert_eq!(plan.tokens, vec!["train", "--mlip-config", "mlip-train.yml", "--fine-tune"]);
        let pass = plan.passthrough.unwrap();
        assert!(pass.content.contains("foundation_model"));
        assert!(pass.content.contains(&model.storage_path.to_string_lossy().into_owned()));
    }
}
