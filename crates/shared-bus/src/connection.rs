//! # Module Connection String
//!
//! Parses the `EdgeHubConnectionString` handed to every module:
//!
//! ```text
//! HostName=<host>;DeviceId=<device>;SharedAccessKey=<key>;ModuleId=<module>[;GatewayHostName=<gateway>]
//! ```
//!
//! Segment order does not matter. Values may contain `=` (base64 keys).

use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

const HOST_NAME: &str = "HostName";
const DEVICE_ID: &str = "DeviceId";
const SHARED_ACCESS_KEY: &str = "SharedAccessKey";
const MODULE_ID: &str = "ModuleId";
const GATEWAY_HOST_NAME: &str = "GatewayHostName";

/// Parsed module connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub host_name: String,
    pub device_id: String,
    pub shared_access_key: String,
    pub module_id: String,
    pub gateway_host_name: Option<String>,
}

impl ConnectionString {
    /// Host the transport connects to: the gateway when present.
    pub fn endpoint(&self) -> &str {
        self.gateway_host_name.as_deref().unwrap_or(&self.host_name)
    }
}

impl FromStr for ConnectionString {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut host_name = None;
        let mut device_id = None;
        let mut shared_access_key = None;
        let mut module_id = None;
        let mut gateway_host_name = None;

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            let Some((key, value)) = segment.split_once('=') else {
                return Err(TransportError::InvalidConnectionString(format!(
                    "segment without '=': {}",
                    key_hint(segment)
                )));
            };
            let value = value.trim().to_string();
            match key.trim() {
                HOST_NAME => host_name = Some(value),
                DEVICE_ID => device_id = Some(value),
                SHARED_ACCESS_KEY => shared_access_key = Some(value),
                MODULE_ID => module_id = Some(value),
                GATEWAY_HOST_NAME => gateway_host_name = Some(value),
                // Unknown keys are tolerated for forward compatibility
                _ => {}
            }
        }

        Ok(Self {
            host_name: require(host_name, HOST_NAME)?,
            device_id: require(device_id, DEVICE_ID)?,
            shared_access_key: require(shared_access_key, SHARED_ACCESS_KEY)?,
            module_id: require(module_id, MODULE_ID)?,
            gateway_host_name: gateway_host_name.filter(|g| !g.is_empty()),
        })
    }
}

fn require(value: Option<String>, field: &str) -> Result<String, TransportError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TransportError::InvalidConnectionString(format!(
            "missing {}",
            field
        ))),
    }
}

// Never echo a whole segment: it may be the access key.
fn key_hint(segment: &str) -> String {
    segment.chars().take(16).collect()
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("host_name", &self.host_name)
            .field("device_id", &self.device_id)
            .field("shared_access_key", &"<redacted>")
            .field("module_id", &self.module_id)
            .field("gateway_host_name", &self.gateway_host_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "HostName=hub.example.net;DeviceId=edge-1;SharedAccessKey=c2VjcmV0a2V5PT0=;ModuleId=SenderModule;GatewayHostName=gateway.local";

    #[test]
    fn test_parse_full() {
        let cs: ConnectionString = FULL.parse().unwrap();
        assert_eq!(cs.host_name, "hub.example.net");
        assert_eq!(cs.device_id, "edge-1");
        assert_eq!(cs.shared_access_key, "c2VjcmV0a2V5PT0=");
        assert_eq!(cs.module_id, "SenderModule");
        assert_eq!(cs.gateway_host_name.as_deref(), Some("gateway.local"));
        assert_eq!(cs.endpoint(), "gateway.local");
    }

    #[test]
    fn test_gateway_is_optional() {
        let cs: ConnectionString =
            "HostName=h;DeviceId=d;SharedAccessKey=k;ModuleId=m;".parse().unwrap();
        assert_eq!(cs.gateway_host_name, None);
        assert_eq!(cs.endpoint(), "h");
    }

    #[test]
    fn test_missing_field() {
        let err = "HostName=h;DeviceId=d;SharedAccessKey=k"
            .parse::<ConnectionString>()
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::InvalidConnectionString("missing ModuleId".into())
        );
    }

    #[test]
    fn test_empty_string() {
        assert!("".parse::<ConnectionString>().is_err());
    }

    #[test]
    fn test_malformed_segment() {
        assert!(matches!(
            "HostName=h;garbage".parse::<ConnectionString>(),
            Err(TransportError::InvalidConnectionString(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let cs: ConnectionString = FULL.parse().unwrap();
        let debug = format!("{:?}", cs);
        assert!(!debug.contains("c2VjcmV0a2V5PT0="));
        assert!(debug.contains("<redacted>"));
    }
}
