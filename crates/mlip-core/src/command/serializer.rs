//! Del mapping resuelto a la lista plana de tokens.
//!
//! Reglas por tipo de valor:
//! - `true`  -> una sola flag `--clave-con-guiones` (sin token de valor);
//! - `false` -> según `BoolFlagStyle`, se omite o se emite `--no-clave`.
//!   La elección es por comando lógico y se documenta en el call site, no
//!   globalmente (el ejecutable usa ambas convenciones según la familia).
//! - mapping anidado -> flag + UN token con el dict en sintaxis literal de
//!   Python (`{'clave': 'valor'}`), no JSON;
//! - array -> la flag repetida, un par flag/valor por elemento;
//! - null -> no se emite nada (equivale a la clave ausente);
//! - cualquier otro escalar -> flag + token con su forma string.
//!
//! Invariantes: salida plana, ningún token vacío, el orden de claves del
//! mapping se preserva (los tests dependen del determinismo).

use serde_json::Value;

use crate::params::ParamMap;

/// Convención para booleanos en `false` de un comando lógico.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolFlagStyle {
    /// `false` no emite nada.
    OmitFalse,
    /// `false` emite la flag negada `--no-clave`.
    NegateFalse,
}

/// Serializa `params` detrás del token inicial del sub-comando.
pub fn serialize(params: &ParamMap, leading: &str, bools: BoolFlagStyle) -> Vec<String> {
    let mut tokens = vec![leading.to_string()];
    for (key, value) in params {
        push_pair(&mut tokens, key, value, bools);
    }
    tokens
}

fn push_pair(tokens: &mut Vec<String>, key: &str, value: &Value, bools: BoolFlagStyle) {
    let flag = format!("--{}", key.replace('_', "-"));
    match value {
        // null equivale a "sin valor": ni flag ni token.
        Value::Null => {}
        Value::Bool(true) => tokens.push(flag),
        Value::Bool(false) => {
            if bools == BoolFlagStyle::NegateFalse {
                tokens.push(format!("--no-{}", key.replace('_', "-")));
            }
        }
        Value::Object(_) => {
            tokens.push(flag);
            tokens.push(render_py_dict(value));
        }
        Value::Array(items) => {
            for item in items {
                tokens.push(flag.clone());
                tokens.push(scalar_to_string(item));
            }
        }
        other => {
            let rendered = scalar_to_string(other);
            // Ningún token vacío: un escalar vacío no emite ni la flag.
            if !rendered.is_empty() {
                tokens.push(flag);
                tokens.push(rendered);
            }
        }
    }
}

/// Renderiza un mapping como literal de dict de Python: claves y strings
/// entre comillas simples, booleanos `True`/`False`, números tal cual.
pub fn render_py_dict(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let items: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{}': {}", k, render_py_value(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
        other => render_py_value(other),
    }
}

fn render_py_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{s}'"),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_py_value).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(_) => render_py_dict(value),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(entries: &[(&str, Value)]) -> ParamMap {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn true_is_presence_flag_with_hyphens() {
        let p = params(&[("invariants_only", json!(true))]);
        assert_eq!(serialize(&p, "descriptors", BoolFlagStyle::OmitFalse), vec!["descriptors", "--invariants-only"]);
    }

    #[test]
    fn false_omitted_or_negated_per_style() {
        let p = params(&[("invariants_only", json!(true)), ("calc_per_atom", json!(false))]);

        let omitted = serialize(&p, "descriptors", BoolFlagStyle::OmitFalse);
        assert_eq!(omitted, vec!["descriptors", "--invariants-only"]);

        let negated = serialize(&p, "descriptors", BoolFlagStyle::NegateFalse);
        assert_eq!(negated, vec!["descriptors", "--invariants-only", "--no-calc-per-atom"]);
    }

    #[test]
    fn nested_mapping_renders_as_python_dict_literal() {
        let p = params(&[("calc_kwargs", json!({"default_dtype": "float64"}))]);
        let tokens = serialize(&p, "singlepoint", BoolFlagStyle::OmitFalse);
        assert_eq!(tokens, vec!["singlepoint", "--calc-kwargs", "{'default_dtype': 'float64'}"]);
    }

    #[test]
    fn py_dict_renders_numbers_bools_and_nesting() {
        let v = json!({"fmax": 0.01, "write": true, "traj_kwargs": {"filename": "t.xyz"}});
        // serde_json::Map ordena alfabéticamente las claves.
        assert_eq!(
            render_py_dict(&v),
            "{'fmax': 0.01, 'traj_kwargs': {'filename': 't.xyz'}, 'write': True}"
        );
    }

    #[test]
    fn scalars_keep_mapping_order() {
        let p = params(&[
            ("struct", json!("aiida.xyz")),
            ("steps", json!(10)),
            ("fmax", json!(0.01)),
        ]);
        let tokens = serialize(&p, "geomopt", BoolFlagStyle::OmitFalse);
        assert_eq!(tokens, vec!["geomopt", "--struct", "aiida.xyz", "--steps", "10", "--fmax", "0.01"]);
    }

    #[test]
    fn arrays_repeat_the_flag() {
        let p = params(&[("properties", json!(["energy", "forces"]))]);
        let tokens = serialize(&p, "singlepoint", BoolFlagStyle::OmitFalse);
        assert_eq!(tokens, vec!["singlepoint", "--properties", "energy", "--properties", "forces"]);
    }

    #[test]
    fn top_level_null_emits_nothing() {
        let p = params(&[
            ("thermostat", json!(null)),
            ("steps", json!(10)),
            ("md_kwargs", json!({"friction": null})),
        ]);
        let tokens = serialize(&p, "md", BoolFlagStyle::OmitFalse);
        // null de primer nivel desaparece; dentro de un dict sigue siendo None.
        assert_eq!(tokens, vec!["md", "--steps", "10", "--md-kwargs", "{'friction': None}"]);
    }

    #[test]
    fn no_token_is_ever_empty() {
        let p = params(&[("a", json!("")), ("b", json!({"k": "v"}))]);
        let tokens = serialize(&p, "cmd", BoolFlagStyle::OmitFalse);
        assert_eq!(tokens, vec!["cmd", "--b", "{'k': 'v'}"]);
        assert!(tokens.iter().all(|t| !t.is_empty()));
    }
}
