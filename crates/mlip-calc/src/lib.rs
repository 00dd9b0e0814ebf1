//! mlip-calc: tipos de cálculo y ensamblado de planes.
//!
//! Capa de adaptación sobre `mlip-core`: cada tipo de cálculo (single point,
//! geomopt, MD, descriptors, EOS, train) es una variante cerrada de
//! `Calculation` con su struct de settings tipado. El `Assembler` orquesta
//! por cálculo: resolver estructura/modelo/dispositivo, fusionar el overlay,
//! serializar la línea de comandos y computar la lista de retrieval que el
//! motor de workflows usará para traer los outputs de vuelta.

pub mod assemble;
pub mod kinds;
pub mod plan;
pub mod request;

pub use assemble::Assembler;
pub use kinds::{
    Calculation, DescriptorsSettings, EosSettings, GeomOptSettings, MdSettings, SinglePointSettings, TrainSettings,
};
pub use plan::CalcPlan;
pub use request::{CalcRequest, ModelSource};
