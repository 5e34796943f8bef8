//! The camera client and its callback bookkeeping.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use futures::channel::oneshot;
use gapkit_bridge::{Bridge, BridgeCommand, HostValue};
use log::{debug, error, warn};
use serde_json::Value;

use crate::{CallbackKind, CameraError, CameraOptions, DestinationType, SERVICE, TAKE_PICTURE};

/// A stored success or error callback.
pub type Callback = Box<dyn FnMut(String) + Send>;

/// Correlation token for a single capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Rebuild an id from the raw value echoed back by a bridge.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value sent over the bridge.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of routing a native response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// A callback received the response.
    Delivered,
    /// The callback was already running on this thread; the response is
    /// handed to it as soon as the running call returns.
    Deferred,
    /// No callback was registered for the response.
    Unclaimed,
}

/// A captured picture, as returned by [`CameraClient::take_picture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Picture {
    /// Base64 encoded image data.
    DataUrl(String),
    /// URI of the image file on the device.
    FileUri(String),
}

impl Picture {
    fn new(destination_type: DestinationType, payload: String) -> Self {
        match destination_type {
            DestinationType::DataUrl => Self::DataUrl(payload),
            DestinationType::FileUri => Self::FileUri(payload),
        }
    }

    /// The raw payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::DataUrl(data) | Self::FileUri(data) => data,
        }
    }

    /// The destination type the picture was requested with.
    #[must_use]
    pub const fn destination_type(&self) -> DestinationType {
        match self {
            Self::DataUrl(_) => DestinationType::DataUrl,
            Self::FileUri(_) => DestinationType::FileUri,
        }
    }

    /// A `data:` URL for inline image data, usable as an `img` source.
    #[must_use]
    pub fn to_data_url(&self) -> Option<String> {
        match self {
            Self::DataUrl(data) => Some(format!("data:image/jpeg;base64,{data}")),
            Self::FileUri(_) => None,
        }
    }

    /// Unwrap into the raw payload.
    #[must_use]
    pub fn into_inner(self) -> String {
        match self {
            Self::DataUrl(data) | Self::FileUri(data) => data,
        }
    }
}

// A registered callback. Calls from other threads wait for the running one;
// calls made from inside the callback are queued and run once it returns.
struct Handler {
    kind: CallbackKind,
    callback: Mutex<Callback>,
    runner: Mutex<Option<ThreadId>>,
    deferred: Mutex<VecDeque<String>>,
}

impl Handler {
    fn new(kind: CallbackKind, callback: Callback) -> Arc<Self> {
        Arc::new(Self {
            kind,
            callback: Mutex::new(callback),
            runner: Mutex::new(None),
            deferred: Mutex::new(VecDeque::new()),
        })
    }

    fn invoke(&self, argument: String) -> Result<Delivery, CameraError> {
        let current = thread::current().id();
        if *guard(&self.runner) == Some(current) {
            guard(&self.deferred).push_back(argument);
            return Ok(Delivery::Deferred);
        }

        let mut callback = guard(&self.callback);
        *guard(&self.runner) = Some(current);

        let mut outcome = self.run(&mut callback, argument);
        loop {
            let next = guard(&self.deferred).pop_front();
            let Some(next) = next else { break };
            if let Err(err) = self.run(&mut callback, next) {
                if outcome.is_ok() {
                    outcome = Err(err);
                } else {
                    error!("camera: {err}");
                }
            }
        }

        *guard(&self.runner) = None;
        outcome.map(|()| Delivery::Delivered)
    }

    fn run(&self, callback: &mut Callback, argument: String) -> Result<(), CameraError> {
        panic::catch_unwind(AssertUnwindSafe(|| callback(argument))).map_err(|payload| {
            CameraError::CallbackPanicked {
                kind: self.kind,
                message: panic_message(payload.as_ref()),
            }
        })
    }
}

struct Slot {
    id: Option<RequestId>,
    success: Option<Arc<Handler>>,
    error: Option<Arc<Handler>>,
    options: Option<CameraOptions>,
}

/// Camera client.
///
/// Forwards capture requests over a [`Bridge`] and routes native results back
/// to the callbacks of the most recent request.
pub struct CameraClient<B> {
    bridge: B,
    slot: Mutex<Slot>,
    next_id: AtomicU64,
}

impl<B> fmt::Debug for CameraClient<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.lock();
        f.debug_struct("CameraClient")
            .field("pending", &slot.id)
            .field("options", &slot.options)
            .finish_non_exhaustive()
    }
}

impl<B: Bridge> CameraClient<B> {
    /// Create a client that forwards requests over `bridge`.
    pub const fn new(bridge: B) -> Self {
        Self {
            bridge,
            slot: Mutex::new(Slot {
                id: None,
                success: None,
                error: None,
                options: None,
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// The bridge requests are forwarded over.
    pub const fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Request a picture.
    ///
    /// Replaces the callbacks of any request still in flight, then sends a
    /// single `Camera.takePicture` command with
    /// `[quality, destinationType, sourceType]`.
    pub fn request<S, E>(&self, success: S, error: Option<E>, options: CameraOptions) -> RequestId
    where
        S: FnMut(String) + Send + 'static,
        E: FnMut(String) + Send + 'static,
    {
        self.submit(
            Box::new(success),
            error.map(|e| Box::new(e) as Callback),
            options,
        )
    }

    /// Request a picture with arguments as handed over by web content.
    ///
    /// `success` must be a function. `error` may be absent or falsy, otherwise
    /// it must be a function too. Malformed option fields fall back to their
    /// defaults.
    ///
    /// # Errors
    /// Returns [`CameraError::SuccessCallbackNotCallable`] or
    /// [`CameraError::ErrorCallbackNotCallable`]. Nothing is sent and the
    /// pending callbacks are left untouched in that case.
    pub fn request_from_host(
        &self,
        success: HostValue,
        error: HostValue,
        options: &Value,
    ) -> Result<RequestId, CameraError> {
        let success = match success {
            HostValue::Function(f) => f.into_inner(),
            other => {
                let err = CameraError::SuccessCallbackNotCallable {
                    found: other.type_name(),
                };
                error!("camera: {err}");
                return Err(err);
            }
        };

        let error = match error {
            HostValue::Function(f) => Some(f.into_inner()),
            other if other.is_falsy() => None,
            other => {
                let err = CameraError::ErrorCallbackNotCallable {
                    found: other.type_name(),
                };
                error!("camera: {err}");
                return Err(err);
            }
        };

        Ok(self.submit(success, error, CameraOptions::from_value(options)))
    }

    /// Take a picture and wait for the result.
    ///
    /// The returned future resolves with the picture, with
    /// [`CameraError::Capture`] if the native side reports an error, or with
    /// [`CameraError::Superseded`] if a newer request replaces this one first.
    pub fn take_picture(
        &self,
        options: CameraOptions,
    ) -> impl Future<Output = Result<Picture, CameraError>> + Send + use<B> {
        let (tx, rx) = oneshot::channel::<Result<String, String>>();
        let tx = Arc::new(Mutex::new(Some(tx)));

        let on_success = {
            let tx = tx.clone();
            move |payload| resolve(&tx, Ok(payload))
        };
        let on_error = move |message| resolve(&tx, Err(message));

        let destination_type = options.destination_type;
        self.request(on_success, Some(on_error), options);

        async move {
            match rx.await {
                Ok(Ok(payload)) => Ok(Picture::new(destination_type, payload)),
                Ok(Err(message)) => Err(CameraError::Capture(message)),
                Err(oneshot::Canceled) => Err(CameraError::Superseded),
            }
        }
    }

    fn submit(
        &self,
        success: Callback,
        error: Option<Callback>,
        options: CameraOptions,
    ) -> RequestId {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let replaced = std::mem::replace(
            &mut *self.lock(),
            Slot {
                id: Some(id),
                success: Some(Handler::new(CallbackKind::Success, success)),
                error: error.map(|e| Handler::new(CallbackKind::Error, e)),
                options: Some(options),
            },
        );
        if let Some(previous) = replaced.id {
            debug!("camera request {previous} replaced by {id}");
        }
        drop(replaced);

        let [quality, destination_type, source_type] = options.args();
        self.bridge.exec(
            BridgeCommand::new(SERVICE, TAKE_PICTURE)
                .arg(quality)
                .arg(destination_type)
                .arg(source_type)
                .with_callback_id(id.get()),
        );
        id
    }
}

impl<B> CameraClient<B> {
    /// The request whose callbacks are currently stored.
    #[must_use]
    pub fn pending_request(&self) -> Option<RequestId> {
        self.lock().id
    }

    /// Options of the most recent request.
    #[must_use]
    pub fn last_options(&self) -> Option<CameraOptions> {
        self.lock().options
    }

    /// Native entry point: a capture completed successfully.
    ///
    /// Calls the stored success callback with `payload`. A panicking callback
    /// is logged and never propagates to the caller.
    pub fn on_success(&self, payload: impl Into<String>) {
        report(self.dispatch_success(payload));
    }

    /// Native entry point: a capture failed or was cancelled.
    ///
    /// Calls the stored error callback with `message`. A panicking callback
    /// is logged and never propagates to the caller.
    pub fn on_error(&self, message: impl Into<String>) {
        report(self.dispatch_error(message));
    }

    /// Like [`on_success`](Self::on_success), but drops the response unless
    /// `id` is the pending request.
    pub fn on_success_for(&self, id: RequestId, payload: impl Into<String>) {
        report(self.dispatch_success_for(id, payload));
    }

    /// Like [`on_error`](Self::on_error), but drops the response unless `id`
    /// is the pending request.
    pub fn on_error_for(&self, id: RequestId, message: impl Into<String>) {
        report(self.dispatch_error_for(id, message));
    }

    /// Route a success payload to the stored success callback.
    ///
    /// # Errors
    /// Returns [`CameraError::CallbackPanicked`] if the callback panics.
    pub fn dispatch_success(&self, payload: impl Into<String>) -> Result<Delivery, CameraError> {
        self.dispatch(CallbackKind::Success, None, payload.into())
    }

    /// Route an error message to the stored error callback.
    ///
    /// # Errors
    /// Returns [`CameraError::CallbackPanicked`] if the callback panics.
    pub fn dispatch_error(&self, message: impl Into<String>) -> Result<Delivery, CameraError> {
        self.dispatch(CallbackKind::Error, None, message.into())
    }

    /// Route a success payload tagged with its request id.
    ///
    /// # Errors
    /// Returns [`CameraError::StaleResponse`] if `id` is not the pending
    /// request, or [`CameraError::CallbackPanicked`] if the callback panics.
    pub fn dispatch_success_for(
        &self,
        id: RequestId,
        payload: impl Into<String>,
    ) -> Result<Delivery, CameraError> {
        self.dispatch(CallbackKind::Success, Some(id), payload.into())
    }

    /// Route an error message tagged with its request id.
    ///
    /// # Errors
    /// Returns [`CameraError::StaleResponse`] if `id` is not the pending
    /// request, or [`CameraError::CallbackPanicked`] if the callback panics.
    pub fn dispatch_error_for(
        &self,
        id: RequestId,
        message: impl Into<String>,
    ) -> Result<Delivery, CameraError> {
        self.dispatch(CallbackKind::Error, Some(id), message.into())
    }

    // The slot lock is released before the callback runs so the callback may
    // issue a new request or deliver another response.
    fn dispatch(
        &self,
        kind: CallbackKind,
        tagged: Option<RequestId>,
        argument: String,
    ) -> Result<Delivery, CameraError> {
        let handler = {
            let slot = self.lock();
            if let Some(received) = tagged {
                if slot.id != Some(received) {
                    return Err(CameraError::StaleResponse {
                        expected: slot.id,
                        received,
                    });
                }
            }
            match kind {
                CallbackKind::Success => slot.success.clone(),
                CallbackKind::Error => slot.error.clone(),
            }
        };

        match handler {
            Some(handler) => handler.invoke(argument),
            None => Ok(Delivery::Unclaimed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        guard(&self.slot)
    }
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn resolve(
    tx: &Mutex<Option<oneshot::Sender<Result<String, String>>>>,
    result: Result<String, String>,
) {
    let sender = guard(tx).take();
    if let Some(sender) = sender {
        let _ = sender.send(result);
    }
}

fn report(result: Result<Delivery, CameraError>) {
    match result {
        Ok(_) => {}
        Err(err @ CameraError::StaleResponse { .. }) => warn!("camera: dropping {err}"),
        Err(err) => error!("camera: {err}"),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
