//! Fusión de grupos de keyword-arguments (calc_kwargs, minimize_kwargs, ...).
//!
//! La fusión es clave por clave y de un solo nivel: el valor explícito pisa
//! al del overlay entrada por entrada, sin descender en sub-mappings.

use serde_json::Value;

/// Fusiona `overlay` y `explicit`: entrada por entrada, `explicit` gana.
/// Si alguno de los dos no es un mapping, `explicit` reemplaza todo.
pub fn merge_params(overlay: &Value, explicit: &Value) -> Value {
    let (Value::Object(base), Value::Object(wins)) = (overlay, explicit) else {
        return explicit.clone();
    };
    let mut merged = base.clone();
    merged.extend(wins.iter().map(|(k, v)| (k.clone(), v.clone())));
    Value::Object(merged)
}
