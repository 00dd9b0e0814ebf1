//! Defaults nombrados que entran al assembler como valor, no como global.
//!
//! Centralizar estos valores en una estructura permite que los tests los
//! sustituyan (otra URI de modelo, otra raíz de caché) sin parchear estado
//! global.

use std::path::PathBuf;

use crate::constants;

/// Conjunto de defaults compartidos por todos los tipos de cálculo.
#[derive(Debug, Clone)]
pub struct Defaults {
    pub arch: String,
    pub device: String,
    pub precision: String,
    /// URI del modelo de fundación a descargar si ninguna fuente aporta uno.
    pub model_uri: String,
    /// Raíz de la caché de modelos en disco.
    pub cache_root: PathBuf,
    pub input_file: String,
    pub output_file: String,
    pub log_file: String,
    pub traj_file: String,
    pub stats_file: String,
    pub results_file: String,
    /// Nombre del overlay filtrado reenviado al directorio de ejecución.
    pub config_file: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            arch: constants::DEFAULT_ARCH.to_string(),
            device: constants::DEFAULT_DEVICE.to_string(),
            precision: constants::DEFAULT_PRECISION.to_string(),
            model_uri: constants::DEFAULT_MODEL_URI.to_string(),
            cache_root: dirs_cache_root(),
            input_file: constants::DEFAULT_INPUT_FILE.to_string(),
            output_file: constants::DEFAULT_OUTPUT_FILE.to_string(),
            log_file: constants::DEFAULT_LOG_FILE.to_string(),
            traj_file: constants::DEFAULT_TRAJ_FILE.to_string(),
            stats_file: constants::DEFAULT_STATS_FILE.to_string(),
            results_file: constants::DEFAULT_RESULTS_FILE.to_string(),
            config_file: constants::CONFIG_PASSTHROUGH_FILE.to_string(),
        }
    }
}

/// `~/.cache/mlips` o, sin HOME, un directorio relativo.
fn dirs_cache_root() -> PathBuf {
    std::env::var_os("HOME")
        .map(|h| PathBuf::from(h).join(".cache").join("mlips"))
        .unwrap_or_else(|| PathBuf::from(".mlips-cache"))
}
