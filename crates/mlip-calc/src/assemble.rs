//! El assembler: de request + tipo de cálculo a `CalcPlan`.
//!
//! Secuencia por cálculo: resolver fuente de modelo -> resolución común
//! (estructura, dispositivo, precisión, arquitectura, modelo) -> claves del
//! tipo -> filtrado del overlay -> serialización. Toda la validación ocurre
//! antes de serializar: nunca se expone una línea de comandos parcial.

use log::debug;
use uuid::Uuid;

use mlip_core::{
    serialize, Artifact, CommonInputs, Defaults, Fetcher, ModelCache, ProvenanceStore, ResolveError, Resolver,
};

use crate::kinds::{
    extend_descriptors, extend_eos, extend_geomopt, extend_md, extend_singlepoint, plan_train, Calculation,
};
use crate::plan::CalcPlan;
use crate::request::{CalcRequest, ModelSource};

/// Orquestador por cálculo. Sin estado mutable compartido entre llamadas:
/// sólo la caché en disco y el store de procedencia que el caller pase.
pub struct Assembler<'a, F: Fetcher> {
    cache: &'a ModelCache<F>,
    defaults: &'a Defaults,
}

impl<'a, F: Fetcher> Assembler<'a, F> {
    pub fn new(cache: &'a ModelCache<F>, defaults: &'a Defaults) -> Self {
        Self { cache, defaults }
    }

    /// Prepara el plan de un cálculo. El `store` es opcional: sin él, el
    /// dedup se limita al escaneo en disco.
    pub fn prepare(
        &self,
        request: &CalcRequest,
        calc: &Calculation,
        mut store: Option<&mut (dyn ProvenanceStore + '_)>,
    ) -> Result<CalcPlan, ResolveError> {
        let run_id = Uuid::new_v4().to_string();
        debug!("preparing {} calculation, run {}", calc.leading_token(), run_id);

        // El entrenamiento no tiene estructura ni modelo de cálculo: va por
        // su propio camino.
        if let Calculation::Train(settings) = calc {
            return plan_train(request, settings, self.defaults, run_id);
        }

        let attached = self.resolve_model_source(request, store.as_deref_mut())?;
        let inputs = CommonInputs {
            arch: request.arch.clone(),
            model: attached,
            structure: request.structure.clone(),
            device: request.device.clone(),
            precision: request.precision.clone(),
            log_filename: request.log_filename.clone(),
        };

        let resolver = Resolver::new(self.cache, self.defaults);
        let overlay = request.config.as_ref();
        let mut resolved = resolver.resolve_common(&inputs, overlay, store.as_deref_mut())?;

        let mut retrieve = vec![
            self.defaults.output_file.clone(),
            run_id.clone(),
            resolved.log_filename.clone(),
        ];

        match calc {
            Calculation::SinglePoint(s) => extend_singlepoint(&mut resolved, s, self.defaults, &mut retrieve)?,
            Calculation::GeomOpt(s) => extend_geomopt(&mut resolved, s, overlay, self.defaults, &mut retrieve)?,
            Calculation::MolecularDynamics(s) => extend_md(&mut resolved, s, overlay, self.defaults, &mut retrieve)?,
            Calculation::Descriptors(s) => extend_descriptors(&mut resolved, s, self.defaults, &mut retrieve)?,
            Calculation::Eos(s) => extend_eos(&mut resolved, s, self.defaults, &mut retrieve)?,
            Calculation::Train(_) => unreachable!("train handled above"),
        }

        resolver.finalize(&mut resolved, overlay);
        let tokens = serialize(&resolved.params, calc.leading_token(), calc.bool_style());

        Ok(CalcPlan {
            run_id,
            tokens,
            retrieve,
            structure_source: Some(resolved.structure_source),
            passthrough: resolved.passthrough,
        })
    }

    /// Convierte la fuente de modelo del request en un `Artifact` adjunto.
    fn resolve_model_source(
        &self,
        request: &CalcRequest,
        store: Option<&mut (dyn ProvenanceStore + '_)>,
    ) -> Result<Option<Artifact>, ResolveError> {
        // Tag para fuentes que no traen arquitectura propia: misma cadena de
        // fallback que usará el resolver.
        let arch_hint = request
            .arch
            .clone()
            .or_else(|| request.config.as_ref().and_then(|o| o.get_str("arch")))
            .unwrap_or_else(|| self.defaults.arch.clone());

        match &request.model {
            None => Ok(None),
            Some(ModelSource::Attached(artifact)) => Ok(Some(artifact.clone())),
            Some(ModelSource::Local(path)) => Ok(Some(self.cache.resolve_local(path, &arch_hint)?)),
            Some(ModelSource::Remote { uri, keep_duplicate }) => {
                let outcome = self.cache.resolve_remote(uri, &arch_hint, None, *keep_duplicate, store)?;
                Ok(Some(outcome.into_artifact()))
            }
        }
    }
}
