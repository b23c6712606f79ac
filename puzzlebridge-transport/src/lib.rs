//! Dual transport for PuzzleBridge.
//!
//! The same game runs embedded in a native web view, where calls cross a
//! callback-based bridge, and in a plain browser, where calls go over HTTP.
//!
//! # Components
//!
//! - **Native**: [`NativeBridgeTransport`] correlates fire-and-forget host
//!   calls with their one-shot callbacks through a [`CallbackTable`]
//! - **HTTP**: [`HttpTransport`] sends JSON requests to the backend
//! - **Router**: [`TransportRouter`] picks one of the two once and presents a
//!   single `TransportResult<Value>` contract to callers
//!
//! # Example
//!
//! ```
//! use puzzlebridge_transport::{BridgeConfig, HttpTransportConfig, TransportKind, TransportRouter};
//!
//! // No bridge injected: the router talks HTTP.
//! let router =
//!     TransportRouter::detect(None, BridgeConfig::default(), HttpTransportConfig::default());
//! assert_eq!(router.kind(), TransportKind::Http);
//! ```

mod error;
pub mod http;
pub mod native;
pub mod router;

pub use error::{TransportError, TransportResult};
pub use http::{HttpRequest, HttpTransport, HttpTransportConfig};
pub use native::{
    BridgeArg, BridgeCall, BridgeConfig, CallbackTable, NativeBridgeTransport, NativeHost,
};
pub use router::{Transport, TransportKind, TransportRouter};

pub use reqwest::Method;
