//! Modelo de datos: el `Artifact` (archivo de modelo entrenado).

mod artifact;

pub use artifact::{Artifact, ArtifactOrigin};
