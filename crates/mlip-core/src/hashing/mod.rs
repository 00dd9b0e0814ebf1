//! Identidad por contenido: digest SHA-256 de archivos binarios.

mod digest;

pub use digest::hash_file;
