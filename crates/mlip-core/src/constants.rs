//! Constantes del núcleo.
//!
//! Valores por defecto compartidos entre tipos de cálculo. Los call sites no
//! los usan directamente: entran al assembler a través de `params::Defaults`
//! para que los tests puedan sustituirlos sin estado global.

/// Arquitectura MLIP por defecto cuando ninguna fuente la aporta.
pub const DEFAULT_ARCH: &str = "mace";

/// Dispositivo de cómputo genérico por defecto.
pub const DEFAULT_DEVICE: &str = "cpu";

/// Precisión de punto flotante por defecto (`default_dtype` del calculador).
pub const DEFAULT_PRECISION: &str = "float64";

/// URI del modelo de fundación que se descarga cuando no se adjunta ningún
/// modelo ni el overlay declara uno.
pub const DEFAULT_MODEL_URI: &str =
    "https://github.com/stfc/janus-core/raw/main/tests/models/mace_mp_small.model";

/// Nombres de archivo que el ejecutable externo produce o consume.
pub const DEFAULT_INPUT_FILE: &str = "aiida.xyz";
pub const DEFAULT_OUTPUT_FILE: &str = "aiida-stdout.txt";
pub const DEFAULT_LOG_FILE: &str = "aiida.log";
pub const DEFAULT_TRAJ_FILE: &str = "aiida-traj.xyz";
pub const DEFAULT_STATS_FILE: &str = "aiida-stats.dat";
pub const DEFAULT_RESULTS_FILE: &str = "aiida-results.xyz";

/// Nombre bajo el cual se reenvía el overlay filtrado al directorio de
/// ejecución.
pub const CONFIG_PASSTHROUGH_FILE: &str = "config.yaml";

/// Tamaño de bloque para el hashing en streaming (64 KiB).
pub const HASH_BUF_SIZE: usize = 65536;
