//! Local key file: the client's RSA keypair as two PEM blocks, the PKCS#1
//! private key followed by the PKCS#1 public key.

use std::path::Path;

use sealpost_shared::{KeyPair, SealpostError};
use tracing::{debug, info, warn};

/// Load the keypair at `path`, or generate and persist a new one.
///
/// A missing, unreadable or unparsable file is replaced by a fresh 2048-bit
/// keypair, overwriting whatever was there. Only failures while generating
/// or writing the replacement are returned.
pub fn load_or_generate(path: impl AsRef<Path>) -> Result<KeyPair, SealpostError> {
    let path = path.as_ref();

    match std::fs::read_to_string(path) {
        Ok(contents) => match KeyPair::from_pem(&contents) {
            Ok(keys) => {
                debug!(path = %path.display(), "Loaded keypair");
                return Ok(keys);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Unusable key file, regenerating"),
        },
        Err(e) => warn!(path = %path.display(), error = %e, "No key file, generating keypair"),
    }

    generate_and_save(path)
}

fn generate_and_save(path: &Path) -> Result<KeyPair, SealpostError> {
    let keys = KeyPair::generate()?;
    let pem = keys.to_pem()?;
    write_private(path, pem.as_bytes())?;

    info!(path = %path.display(), "Generated new keypair");
    Ok(keys)
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}
