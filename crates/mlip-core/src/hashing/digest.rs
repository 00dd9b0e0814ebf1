//! Hash en streaming – el archivo se lee por bloques, nunca entero en
//! memoria. Dos archivos byte-idénticos producen el mismo digest sin importar
//! su ruta o nombre.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::constants::HASH_BUF_SIZE;

/// Digest SHA-256 (hex) del contenido de `path`.
///
/// Errores de I/O se propagan sin reintento: un archivo ilegible es fatal
/// para el paso de resolución que lo pidió.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_BUF_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
