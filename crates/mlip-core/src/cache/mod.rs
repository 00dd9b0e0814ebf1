//! Caché de modelos con dedup por hash de contenido.
//!
//! Layout en disco: `{cache_root}/{architecture}/{filename}`. La arquitectura
//! particiona el namespace: archivos byte-idénticos bajo tags distintos nunca
//! se consideran duplicados entre sí.

mod fetch;
mod model_cache;
mod store;

pub use fetch::{Fetcher, HttpFetcher};
pub use model_cache::{CacheOutcome, ModelCache};
pub use store::{InMemoryProvenanceStore, ModelRecord, ProvenanceStore};
