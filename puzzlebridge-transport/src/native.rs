//! Native bridge transport.
//!
//! The host only supports fire-and-forget calls: every method takes its
//! declared arguments plus a trailing callback name, and later reports back by
//! settling that name exactly once with `(result, error)`. This module turns
//! each such call into an awaitable result.
//!
//! Correlation lives in an explicit [`CallbackTable`] owned by the transport:
//! a map from token to a one-shot settlement channel. A record is inserted
//! immediately before the host is invoked and removed exactly once, on
//! settlement, on a synchronous host failure, or when a configured deadline
//! expires.

use crate::error::{TransportError, TransportResult};
use chrono::{DateTime, Utc};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// An argument as forwarded across the native boundary.
///
/// Objects and arrays cross as their JSON text; primitives cross unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeArg {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl BridgeArg {
    /// Encodes a JSON value for the native side.
    pub fn encode(value: &Value) -> TransportResult<Self> {
        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Text(serde_json::to_string(value)?),
        })
    }

    /// Returns the text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// The object the platform injects into the embedding web view.
pub trait NativeHost: Send + Sync {
    /// Whether `method` is a callable member of the bridge.
    fn has_method(&self, method: &str) -> bool;

    /// Starts `method`. The final argument is the callback token; the host
    /// must eventually call [`CallbackTable::settle`] with it exactly once.
    ///
    /// An `Err` means the call failed synchronously and no callback will come.
    fn invoke(
        &self,
        method: &str,
        args: Vec<BridgeArg>,
        callbacks: &CallbackTable,
    ) -> Result<(), String>;
}

/// Correlation record for one in-flight native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeCall {
    pub operation: String,
    pub created_at: DateTime<Utc>,
    pub token: String,
}

struct Pending {
    call: BridgeCall,
    settle: oneshot::Sender<TransportResult<Value>>,
}

#[derive(Default)]
struct TableInner {
    next_seq: u64,
    pending: HashMap<String, Pending>,
}

/// Token → one-shot settlement map shared between the transport and the host.
#[derive(Clone, Default)]
pub struct CallbackTable {
    inner: Arc<Mutex<TableInner>>,
}

impl CallbackTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a single-shot callback for `operation`.
    ///
    /// Tokens come from a per-table monotonic counter, so two calls to the
    /// same operation in the same instant still get distinct tokens.
    pub(crate) fn register(
        &self,
        operation: &str,
    ) -> (String, oneshot::Receiver<TransportResult<Value>>) {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.lock();
        inner.next_seq += 1;
        let token = format!("{operation}_cb_{}", inner.next_seq);
        let call = BridgeCall {
            operation: operation.to_string(),
            created_at: Utc::now(),
            token: token.clone(),
        };
        inner.pending.insert(token.clone(), Pending { call, settle: tx });
        (token, rx)
    }

    /// Settles the callback registered under `token`.
    ///
    /// An `error` other than null, `false`, `0` or `""` rejects the call; string errors are first
    /// parsed as JSON and fall back to the raw string. Returns `false` if no
    /// record exists (already settled, discarded, or never registered).
    pub fn settle(&self, token: &str, result: Option<Value>, error: Option<Value>) -> bool {
        let Some(pending) = self.lock().pending.remove(token) else {
            debug!("Ignoring settlement for unknown callback {token}");
            return false;
        };

        let outcome = match error.filter(is_error_present) {
            Some(error) => {
                let payload = parse_error_payload(error);
                warn!(
                    "Native call {} failed: {payload}",
                    pending.call.operation
                );
                Err(TransportError::NativeCall(payload))
            }
            None => Ok(result.unwrap_or(Value::Null)),
        };

        if pending.settle.send(outcome).is_err() {
            debug!("Caller for {token} went away before settlement");
        }
        true
    }

    /// Removes a record without settling it.
    pub(crate) fn discard(&self, token: &str) -> bool {
        self.lock().pending.remove(token).is_some()
    }

    /// Drops every pending record; their callers observe
    /// [`TransportError::CallbackDropped`].
    pub fn clear(&self) {
        self.lock().pending.clear();
    }

    /// Whether a callback is currently registered under `token`.
    #[must_use]
    pub fn is_registered(&self, token: &str) -> bool {
        self.lock().pending.contains_key(token)
    }

    /// Number of in-flight calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Whether no call is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the in-flight correlation records, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<BridgeCall> {
        let mut calls: Vec<BridgeCall> =
            self.lock().pending.values().map(|p| p.call.clone()).collect();
        calls.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.token.cmp(&b.token)));
        calls
    }
}

impl std::fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackTable")
            .field("pending", &self.len())
            .finish()
    }
}

fn is_error_present(error: &Value) -> bool {
    match error {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn parse_error_payload(error: Value) -> Value {
    match error {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}

/// Configuration for the native bridge transport.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Deadline for a single call. `None` waits for the host indefinitely.
    pub call_timeout: Option<Duration>,
}

/// Turns host calls into awaitable results.
pub struct NativeBridgeTransport {
    host: Option<Arc<dyn NativeHost>>,
    callbacks: CallbackTable,
    config: BridgeConfig,
}

impl NativeBridgeTransport {
    /// Creates a transport over the host bridge, if one was injected.
    pub fn new(host: Option<Arc<dyn NativeHost>>, config: BridgeConfig) -> Self {
        Self {
            host,
            callbacks: CallbackTable::new(),
            config,
        }
    }

    /// Whether a bridge object is present at all.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.host.is_some()
    }

    /// The callback table the host settles into.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackTable {
        &self.callbacks
    }

    /// Invokes `operation` on the host and waits for its callback.
    pub async fn invoke(&self, operation: &str, args: &[Value]) -> TransportResult<Value> {
        let host = self
            .host
            .as_ref()
            .ok_or_else(|| TransportError::Unavailable("no native bridge exposed".to_string()))?;

        if !host.has_method(operation) {
            return Err(TransportError::Unavailable(format!(
                "native bridge has no method {operation}"
            )));
        }

        let mut forwarded = args
            .iter()
            .map(BridgeArg::encode)
            .collect::<TransportResult<Vec<_>>>()?;

        let (token, settled) = self.callbacks.register(operation);
        forwarded.push(BridgeArg::Text(token.clone()));
        debug!("Invoking native {operation} with callback {token}");

        if let Err(thrown) = host.invoke(operation, forwarded, &self.callbacks) {
            self.callbacks.discard(&token);
            warn!("Native {operation} threw synchronously: {thrown}");
            return Err(TransportError::NativeCall(Value::String(thrown)));
        }

        let received = match self.config.call_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, settled).await {
                Ok(received) => received,
                Err(_) => {
                    self.callbacks.discard(&token);
                    warn!("Native {operation} timed out after {deadline:?}");
                    return Err(TransportError::Timeout);
                }
            },
            None => settled.await,
        };

        received.map_err(|_| TransportError::CallbackDropped)?
    }
}

/// Scripted hosts for testing code that sits on top of the bridge.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;

    /// How a scripted method answers.
    #[derive(Debug, Clone)]
    pub enum Reply {
        /// Settle with a result before `invoke` returns.
        Resolve(Value),
        /// Settle with an error before `invoke` returns.
        Reject(Value),
        /// Fail `invoke` itself.
        Throw(String),
        /// Settle with a result from a spawned task.
        ResolveLater(Value),
        /// Never settle.
        Hang,
    }

    /// One recorded host invocation.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub method: String,
        pub args: Vec<BridgeArg>,
    }

    impl RecordedCall {
        /// The callback token (always the last argument).
        #[must_use]
        pub fn token(&self) -> Option<&str> {
            self.args.last().and_then(BridgeArg::as_text)
        }

        /// Arguments without the trailing token.
        #[must_use]
        pub fn payload(&self) -> &[BridgeArg] {
            &self.args[..self.args.len().saturating_sub(1)]
        }
    }

    /// A host whose methods answer from per-method reply queues.
    ///
    /// The last queued reply for a method is sticky: it keeps answering once
    /// the queue is down to one entry.
    #[derive(Default)]
    pub struct ScriptedHost {
        replies: Mutex<HashMap<String, VecDeque<Reply>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedHost {
        /// Creates a host with no methods.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a reply for `method`, exposing it on the bridge.
        #[must_use]
        pub fn with(self, method: &str, reply: Reply) -> Self {
            self.push(method, reply);
            self
        }

        /// Queues a reply for `method`.
        pub fn push(&self, method: &str, reply: Reply) {
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(method.to_string())
                .or_default()
                .push_back(reply);
        }

        /// Every invocation so far, in order.
        #[must_use]
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Invocations of `method`.
        #[must_use]
        pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
            self.calls()
                .into_iter()
                .filter(|c| c.method == method)
                .collect()
        }

        fn next_reply(&self, method: &str) -> Option<Reply> {
            let mut replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
            let queue = replies.get_mut(method)?;
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        }
    }

    impl NativeHost for ScriptedHost {
        fn has_method(&self, method: &str) -> bool {
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(method)
        }

        fn invoke(
            &self,
            method: &str,
            args: Vec<BridgeArg>,
            callbacks: &CallbackTable,
        ) -> Result<(), String> {
            let token = args
                .last()
                .and_then(BridgeArg::as_text)
                .map(str::to_string)
                .ok_or_else(|| "missing callback token".to_string())?;

            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedCall {
                    method: method.to_string(),
                    args,
                });

            match self.next_reply(method) {
                Some(Reply::Resolve(value)) => {
                    callbacks.settle(&token, Some(value), None);
                }
                Some(Reply::Reject(error)) => {
                    callbacks.settle(&token, None, Some(error));
                }
                Some(Reply::Throw(message)) => return Err(message),
                Some(Reply::ResolveLater(value)) => {
                    let callbacks = callbacks.clone();
                    tokio::spawn(async move {
                        tokio::task::yield_now().await;
                        callbacks.settle(&token, Some(value), None);
                    });
                }
                Some(Reply::Hang) | None => {}
            }
            Ok(())
        }
    }
}
