//! Per-call routing between the native bridge and HTTP.
//!
//! The environment is decided once, when the router is built: a present
//! bridge means every call goes native, otherwise every call goes over HTTP.
//! Both paths resolve to the same `TransportResult<Value>` shape.

use crate::error::TransportResult;
use crate::http::{HttpRequest, HttpTransport, HttpTransportConfig};
use crate::native::{BridgeConfig, NativeBridgeTransport, NativeHost};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which transport a router was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Native,
    Http,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// A transport capable of executing game operations.
pub enum Transport {
    Native(NativeBridgeTransport),
    Http(HttpTransport),
}

impl Transport {
    /// Picks the native bridge when `host` is present, HTTP otherwise.
    pub fn detect(
        host: Option<Arc<dyn NativeHost>>,
        bridge: BridgeConfig,
        http: HttpTransportConfig,
    ) -> Self {
        match host {
            Some(host) => Self::Native(NativeBridgeTransport::new(Some(host), bridge)),
            None => Self::Http(HttpTransport::new(http)),
        }
    }

    /// The variant's kind.
    #[must_use]
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Native(_) => TransportKind::Native,
            Self::Http(_) => TransportKind::Http,
        }
    }
}

/// Dispatches every logical operation to the transport chosen at construction.
pub struct TransportRouter {
    transport: Transport,
}

impl TransportRouter {
    /// Creates a router over an already selected transport.
    pub fn new(transport: Transport) -> Self {
        debug!("Transport router using {}", transport.kind());
        Self { transport }
    }

    /// Detects the environment and builds the matching router.
    pub fn detect(
        host: Option<Arc<dyn NativeHost>>,
        bridge: BridgeConfig,
        http: HttpTransportConfig,
    ) -> Self {
        Self::new(Transport::detect(host, bridge, http))
    }

    /// Which transport serves calls.
    #[must_use]
    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Executes one operation.
    ///
    /// `bridge_args` are used on the native path, `request` on the HTTP path;
    /// the two must describe the same operation.
    pub async fn route(
        &self,
        operation: &str,
        bridge_args: &[Value],
        request: HttpRequest,
    ) -> TransportResult<Value> {
        match &self.transport {
            Transport::Native(native) => {
                let value = native.invoke(operation, bridge_args).await?;
                Ok(decode_native_payload(value))
            }
            Transport::Http(http) => http.send(request).await,
        }
    }
}

/// Hosts often hand back JSON as text; lift objects and arrays so both paths
/// produce the same structured shape.
fn decode_native_payload(value: Value) -> Value {
    match value {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
            _ => Value::String(text),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_lifts_json_text() {
        assert_eq!(decode_native_payload(json!("{\"a\":1}")), json!({"a": 1}));
        assert_eq!(decode_native_payload(json!("[1,2]")), json!([1, 2]));
    }

    #[test]
    fn decode_leaves_plain_text_and_scalars() {
        assert_eq!(decode_native_payload(json!("ok")), json!("ok"));
        assert_eq!(decode_native_payload(json!("42")), json!("42"));
        assert_eq!(decode_native_payload(json!(true)), json!(true));
    }
}
