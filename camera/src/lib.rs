//! Bridged camera capability.
//!
//! This crate exposes the device camera to web content. A [`CameraClient`]
//! validates the caller's callbacks, normalizes [`CameraOptions`], forwards a
//! single `Camera.takePicture` command over a [`Bridge`] and later routes the
//! native result back to the caller's callbacks.
//!
//! Only one request is remembered at a time: a new request replaces the
//! callbacks of any request still in flight. Bridges that echo the
//! [`RequestId`] can use the tagged entry points to drop stale responses.
//!
//! ```
//! use gapkit_bridge::MemoryBridge;
//! use gapkit_camera::{CameraClient, CameraOptions, DestinationType};
//!
//! let client = CameraClient::new(MemoryBridge::new());
//! client.request(
//!     |picture| println!("got {} bytes", picture.len()),
//!     Some(|message| eprintln!("capture failed: {message}")),
//!     CameraOptions::new().with_destination(DestinationType::FileUri),
//! );
//!
//! // Later, the native side reports back.
//! client.on_success("file:///tmp/photo.jpg");
//! ```

#![warn(missing_docs)]

mod client;
mod options;

use std::fmt;
use std::sync::OnceLock;

pub use client::{Callback, CameraClient, Delivery, Picture, RequestId};
pub use gapkit_bridge::{Bridge, BridgeCommand, HostValue};
pub use options::{CameraOptions, DEFAULT_QUALITY, DestinationType, SourceType};

/// Name of the capability on the native side.
pub const SERVICE: &str = "Camera";

/// Name of the capture operation on the native side.
pub const TAKE_PICTURE: &str = "takePicture";

/// Which of the caller's callbacks is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// The success callback.
    Success,
    /// The error callback.
    Error,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Errors that can occur with camera operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    /// The success callback is missing or not a function.
    #[error("success callback is not a function (got {found})")]
    SuccessCallbackNotCallable {
        /// Type of the value that was supplied instead.
        found: &'static str,
    },
    /// An error callback was supplied but is not a function.
    #[error("error callback is not a function (got {found})")]
    ErrorCallbackNotCallable {
        /// Type of the value that was supplied instead.
        found: &'static str,
    },
    /// Capture failed or was cancelled on the native side.
    #[error("capture failed: {0}")]
    Capture(String),
    /// The caller's own callback panicked.
    #[error("{kind} callback panicked: {message}")]
    CallbackPanicked {
        /// Which callback panicked.
        kind: CallbackKind,
        /// Panic message, if one could be recovered.
        message: String,
    },
    /// A tagged response arrived for a request that is no longer pending.
    #[error("stale response for request {received} (pending: {expected:?})")]
    StaleResponse {
        /// The request currently pending, if any.
        expected: Option<RequestId>,
        /// The request the response was tagged with.
        received: RequestId,
    },
    /// The request was replaced by a newer one before any response arrived.
    #[error("request superseded by a newer request")]
    Superseded,
    /// No camera client has been installed for this process.
    #[error("camera client not installed")]
    NotInstalled,
    /// A destination type value outside the known set.
    #[error("unknown destination type: {0}")]
    UnknownDestinationType(i64),
    /// A source type value outside the known set.
    #[error("unknown source type: {0}")]
    UnknownSourceType(i64),
}

/// The process-wide client type.
pub type InstalledClient = CameraClient<Box<dyn Bridge>>;

static INSTALLED: OnceLock<InstalledClient> = OnceLock::new();

/// Install the process-wide camera client.
///
/// The first call wins. Later calls keep the existing client, drop `bridge`
/// and return the installed client.
pub fn install(bridge: impl Bridge + 'static) -> &'static InstalledClient {
    let mut fresh = false;
    let client = INSTALLED.get_or_init(|| {
        fresh = true;
        CameraClient::new(Box::new(bridge) as Box<dyn Bridge>)
    });
    if !fresh {
        log::debug!("camera client already installed; keeping the existing one");
    }
    client
}

/// The process-wide camera client, if one has been installed.
#[must_use]
pub fn installed() -> Option<&'static InstalledClient> {
    INSTALLED.get()
}

/// The process-wide camera client.
///
/// # Errors
/// Returns [`CameraError::NotInstalled`] if [`install`] has not been called.
pub fn client() -> Result<&'static InstalledClient, CameraError> {
    installed().ok_or(CameraError::NotInstalled)
}

/// Native entry point: a capture completed successfully.
///
/// Routes `payload` to the installed client's success callback.
pub fn on_success(payload: impl Into<String>) {
    match client() {
        Ok(client) => client.on_success(payload),
        Err(err) => log::warn!("dropping camera result: {err}"),
    }
}

/// Native entry point: a capture failed or was cancelled.
///
/// Routes `message` to the installed client's error callback.
pub fn on_error(message: impl Into<String>) {
    match client() {
        Ok(client) => client.on_error(message),
        Err(err) => log::warn!("dropping camera error: {err}"),
    }
}

/// Tagged native entry point for bridges that echo the request id.
pub fn on_success_for(id: RequestId, payload: impl Into<String>) {
    match client() {
        Ok(client) => client.on_success_for(id, payload),
        Err(err) => log::warn!("dropping camera result: {err}"),
    }
}

/// Tagged native entry point for bridges that echo the request id.
pub fn on_error_for(id: RequestId, message: impl Into<String>) {
    match client() {
        Ok(client) => client.on_error_for(id, message),
        Err(err) => log::warn!("dropping camera error: {err}"),
    }
}
