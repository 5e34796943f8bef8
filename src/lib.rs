//! # Gapkit
//!
//! Device capabilities for web content, bridged to the native platform.
//!
//! Each capability describes its calls as bridge commands and hands them to a
//! host-supplied bridge; native results come back through the capability's
//! inbound entry points.
//!
//! ## Features
//!
//! - `bridge`: the generic bridge plumbing (`Bridge`, `BridgeCommand`, `HostValue`).
//! - `camera`: take pictures through the native camera.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! gapkit = { version = "0.1", features = ["camera"] }
//! ```
//!
//! ```rust
//! # #[cfg(feature = "camera")]
//! # fn main() {
//! use gapkit::bridge::MemoryBridge;
//! use gapkit::camera::{self, CameraOptions};
//!
//! let client = camera::install(MemoryBridge::new());
//! client.request(
//!     |data| println!("picture: {data}"),
//!     None::<camera::Callback>,
//!     CameraOptions::default(),
//! );
//! # }
//! # #[cfg(not(feature = "camera"))]
//! # fn main() {}
//! ```

#[cfg(feature = "bridge")]
pub use gapkit_bridge as bridge;

#[cfg(feature = "camera")]
pub use gapkit_camera as camera;
