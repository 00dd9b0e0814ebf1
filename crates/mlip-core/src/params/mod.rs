//! Resolución de parámetros por precedencia fija.
//!
//! Orden por setting (de mayor a menor): campo explícito del request >
//! metadata del artifact adjunto (sólo arquitectura) > entrada del overlay de
//! configuración > default incorporado > ausente. Todo error de validación se
//! reporta antes de construir ninguna línea de comandos.

mod defaults;
mod merge;
mod overlay;
mod resolver;

pub use defaults::Defaults;
pub use merge::merge_params;
pub use overlay::ConfigOverlay;
pub use resolver::{CommonInputs, Passthrough, ResolvedInputs, Resolver};

/// Mapping ordenado de settings resueltos. El orden de inserción se preserva
/// y es observable en la serialización (los tests dependen de eso).
pub type ParamMap = indexmap::IndexMap<String, serde_json::Value>;
