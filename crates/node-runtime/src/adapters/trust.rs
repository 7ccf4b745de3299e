//! Trusted-certificate installation.

use std::path::Path;

use shared_bus::{TransportClient, TransportError};
use tracing::info;

/// Read a PEM bundle from `path` and install it on `transport`.
///
/// Must run before any publish or subscribe.
pub fn install_trusted_certs(
    transport: &dyn TransportClient,
    path: &Path,
) -> Result<(), TransportError> {
    let pem = std::fs::read_to_string(path).map_err(|e| {
        TransportError::TrustedCerts(format!("cannot read {}: {}", path.display(), e))
    })?;
    transport.set_trusted_certs(&pem)?;
    info!(path = %path.display(), "Trusted certificates installed");
    Ok(())
}
