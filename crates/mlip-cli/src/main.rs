//! CLI mínima para preparar planes de cálculo sin motor de workflows.
//!
//! `mlip-cli prepare --kind <KIND> --struct <FILE> [--arch <A>] [--model <FILE>]
//!     [--model-url <URI>] [--device <D>] [--precision <P>] [--config <YAML>]
//!     [--ensemble <E>] [--fine-tune] [--keep-duplicate]`
//! `mlip-cli hash <FILE>`

use std::path::PathBuf;

use mlip_calc::{
    Assembler, CalcRequest, Calculation, DescriptorsSettings, EosSettings, GeomOptSettings, MdSettings,
    ModelSource, SinglePointSettings, TrainSettings,
};
use mlip_core::{ConfigOverlay, Defaults, HttpFetcher, ModelCache};

fn main() {
    // Cargar .env si existe para obtener MLIP_CACHE_ROOT
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("prepare") => prepare(&args[2..]),
        Some("hash") => hash(&args[2..]),
        _ => {
            eprintln!("Uso: mlip-cli <prepare|hash> ...");
            std::process::exit(2);
        }
    }
}

fn hash(args: &[String]) {
    let Some(path) = args.first() else {
        eprintln!("Uso: mlip-cli hash <FILE>");
        std::process::exit(2);
    };
    match mlip_core::hashing::hash_file(PathBuf::from(path).as_path()) {
        Ok(digest) => println!("{digest}  {path}"),
        Err(e) => {
            eprintln!("[mlip hash] error: {e}");
            std::process::exit(5);
        }
    }
}

fn prepare(args: &[String]) {
    let mut kind: Option<String> = None;
    let mut structure: Option<PathBuf> = None;
    let mut arch: Option<String> = None;
    let mut model: Option<PathBuf> = None;
    let mut model_url: Option<String> = None;
    let mut device: Option<String> = None;
    let mut precision: Option<String> = None;
    let mut config: Option<PathBuf> = None;
    let mut ensemble: Option<String> = None;
    let mut fine_tune = false;
    let mut keep_duplicate = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--kind" => { i += 1; if i < args.len() { kind = Some(args[i].clone()); } }
            "--struct" => { i += 1; if i < args.len() { structure = Some(PathBuf::from(&args[i])); } }
            "--arch" => { i += 1; if i < args.len() { arch = Some(args[i].clone()); } }
            "--model" => { i += 1; if i < args.len() { model = Some(PathBuf::from(&args[i])); } }
            "--model-url" => { i += 1; if i < args.len() { model_url = Some(args[i].clone()); } }
            "--device" => { i += 1; if i < args.len() { device = Some(args[i].clone()); } }
            "--precision" => { i += 1; if i < args.len() { precision = Some(args[i].clone()); } }
            "--config" => { i += 1; if i < args.len() { config = Some(PathBuf::from(&args[i])); } }
            "--ensemble" => { i += 1; if i < args.len() { ensemble = Some(args[i].clone()); } }
            "--fine-tune" => { fine_tune = true; }
            "--keep-duplicate" => { keep_duplicate = true; }
            other => {
                eprintln!("[mlip prepare] flag desconocida: {other}");
                std::process::exit(2);
            }
        }
        i += 1;
    }

    let Some(kind) = kind else {
        eprintln!("Uso: mlip-cli prepare --kind <singlepoint|geomopt|md|descriptors|eos|train> ...");
        std::process::exit(2);
    };

    let calc = match kind.as_str() {
        "singlepoint" => Calculation::SinglePoint(SinglePointSettings::default()),
        "geomopt" => Calculation::GeomOpt(GeomOptSettings::default()),
        "md" => Calculation::MolecularDynamics(MdSettings { ensemble: ensemble.clone(), ..MdSettings::default() }),
        "descriptors" => Calculation::Descriptors(DescriptorsSettings::default()),
        "eos" => Calculation::Eos(EosSettings::default()),
        "train" => Calculation::Train(TrainSettings { fine_tune, foundation_model: None }),
        other => {
            eprintln!("[mlip prepare] kind desconocido: {other}");
            std::process::exit(2);
        }
    };

    let overlay = match config {
        Some(path) => match ConfigOverlay::load(&path) {
            Ok(o) => Some(o),
            Err(e) => {
                eprintln!("[mlip prepare] config error: {e}");
                std::process::exit(3);
            }
        },
        None => None,
    };

    let model_source = match (model, model_url) {
        (Some(_), Some(_)) => {
            eprintln!("[mlip prepare] --model y --model-url son excluyentes");
            std::process::exit(2);
        }
        (Some(path), None) => Some(ModelSource::Local(path)),
        (None, Some(uri)) => Some(ModelSource::Remote { uri, keep_duplicate }),
        (None, None) => None,
    };

    let mut defaults = Defaults::default();
    if let Ok(root) = std::env::var("MLIP_CACHE_ROOT") {
        defaults.cache_root = PathBuf::from(root);
    }

    let cache = ModelCache::new(&defaults.cache_root, HttpFetcher);
    let assembler = Assembler::new(&cache, &defaults);
    let request = CalcRequest {
        arch,
        model: model_source,
        structure,
        device,
        precision,
        log_filename: None,
        config: overlay,
    };

    match assembler.prepare(&request, &calc, None) {
        Ok(plan) => {
            println!("run: {}", plan.run_id);
            println!("cmdline: {}", plan.tokens.join(" "));
            if let Some(src) = &plan.structure_source {
                println!("struct: {}", src.display());
            }
            if let Some(pass) = &plan.passthrough {
                println!("forward: {}", pass.filename);
            }
            for file in &plan.retrieve {
                println!("retrieve: {file}");
            }
        }
        Err(e) => {
            eprintln!("[mlip prepare] {e}");
            std::process::exit(4);
        }
    }
}
