//! El plan listo para el boundary externo.

use std::path::PathBuf;

use mlip_core::Passthrough;

/// Producto del assembler: línea de comandos + lista de retrieval.
///
/// `tokens` es inmutable una vez devuelto (append-only durante construcción)
/// y se consume exactamente una vez. `retrieve` enumera lo que el proceso
/// externo debe producir; el parser post-hoc detecta faltantes contra esta
/// lista. Un nombre de trayectoria custom que entró al cmdline aparece
/// también aquí: las dos listas nunca divergen.
#[derive(Debug)]
pub struct CalcPlan {
    /// Identificador opaco de la corrida; también entra a `retrieve`.
    pub run_id: String,
    pub tokens: Vec<String>,
    pub retrieve: Vec<String>,
    /// Origen resuelto de la estructura (`None` para entrenamiento).
    pub structure_source: Option<PathBuf>,
    /// Copia filtrada del overlay para reenviar, si corresponde.
    pub passthrough: Option<Passthrough>,
}
