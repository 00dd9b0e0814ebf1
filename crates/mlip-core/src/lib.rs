//! mlip-core: resolución de inputs y caché de modelos para cálculos MLIP.
//!
//! Este crate contiene el núcleo reutilizado por todos los tipos de cálculo:
//! - `hashing`: digest SHA-256 en streaming para identidad de artifacts.
//! - `model`: el `Artifact` (modelo entrenado + arquitectura + hash).
//! - `cache`: deduplicación por hash de contenido bajo particiones por
//!   arquitectura, con un `ProvenanceStore` opcional (trait + fake in-memory).
//! - `params`: overlay de configuración YAML y resolución por precedencia
//!   fija (campo explícito > artifact adjunto > overlay > default).
//! - `command`: serialización del mapping resuelto a tokens de línea de
//!   comandos para el ejecutable externo.
//!
//! El crate no conoce el motor de workflows ni el ejecutable: sólo produce
//! valores resueltos y tokens. Ningún estado mutable compartido entre
//! invocaciones salvo el directorio de caché en disco.

pub mod cache;
pub mod command;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod model;
pub mod params;

pub use cache::{CacheOutcome, Fetcher, HttpFetcher, InMemoryProvenanceStore, ModelCache, ModelRecord, ProvenanceStore};
pub use command::{render_py_dict, serialize, BoolFlagStyle};
pub use errors::{CacheError, ResolveError};
pub use model::{Artifact, ArtifactOrigin};
pub use params::{merge_params, CommonInputs, ConfigOverlay, Defaults, ParamMap, Passthrough, ResolvedInputs, Resolver};
