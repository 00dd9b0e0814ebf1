//! Serialización del mapping resuelto a tokens de línea de comandos.

mod serializer;

pub use serializer::{render_py_dict, serialize, BoolFlagStyle};
