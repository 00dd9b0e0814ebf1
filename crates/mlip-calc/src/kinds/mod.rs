//! Enumeración cerrada de tipos de cálculo.
//!
//! Reemplaza el dispatch dinámico por atributos con una variante por tipo,
//! cada una con su struct de settings tipado. El assembler recibe la
//! variante como parámetro explícito y ramifica por match, no por presencia
//! de claves.

mod descriptors;
mod eos;
mod geomopt;
mod md;
mod singlepoint;
mod train;

pub use descriptors::DescriptorsSettings;
pub use eos::EosSettings;
pub use geomopt::GeomOptSettings;
pub use md::MdSettings;
pub use singlepoint::SinglePointSettings;
pub use train::TrainSettings;

pub(crate) use descriptors::extend as extend_descriptors;
pub(crate) use eos::extend as extend_eos;
pub(crate) use geomopt::extend as extend_geomopt;
pub(crate) use md::extend as extend_md;
pub(crate) use singlepoint::extend as extend_singlepoint;
pub(crate) use train::plan_train;

use mlip_core::BoolFlagStyle;

/// Un cálculo concreto con sus settings específicos.
#[derive(Debug, Clone)]
pub enum Calculation {
    SinglePoint(SinglePointSettings),
    GeomOpt(GeomOptSettings),
    MolecularDynamics(MdSettings),
    Descriptors(DescriptorsSettings),
    Eos(EosSettings),
    Train(TrainSettings),
}

impl Calculation {
    /// Token inicial del sub-comando del ejecutable externo.
    pub fn leading_token(&self) -> &'static str {
        match self {
            Calculation::SinglePoint(_) => "singlepoint",
            Calculation::GeomOpt(_) => "geomopt",
            Calculation::MolecularDynamics(_) => "md",
            Calculation::Descriptors(_) => "descriptors",
            Calculation::Eos(_) => "eos",
            Calculation::Train(_) => "train",
        }
    }

    /// Convención de booleanos-false del comando lógico. Elegida por familia
    /// de flags y fijada por tests; ver cada módulo de kind.
    pub fn bool_style(&self) -> BoolFlagStyle {
        match self {
            // geomopt emite negaciones explícitas para las flags de celda.
            Calculation::GeomOpt(_) => BoolFlagStyle::NegateFalse,
            // El resto omite los false (convención del ejecutable).
            _ => BoolFlagStyle::OmitFalse,
        }
    }
}
