//! Generic web-to-native bridge plumbing.
//!
//! Capabilities such as the camera never talk to the native platform
//! directly. They describe each call as a [`BridgeCommand`] and hand it to a
//! [`Bridge`], which transports it across the boundary. Native results come
//! back later through the capability's own inbound entry points.
//!
//! Values handed over by web content are loosely typed; [`HostValue`] models
//! them so capabilities can validate what they were given.

#![warn(missing_docs)]

mod command;
mod memory;
mod value;

use std::sync::Arc;

pub use command::{BridgeCommand, BridgeError};
pub use memory::MemoryBridge;
pub use value::{HostFunction, HostValue};

/// Transport that forwards commands to native code.
///
/// Execution is fire-and-forget: a bridge reports completion by invoking the
/// capability's inbound entry points, never through a return value.
pub trait Bridge: Send + Sync {
    /// Forward a command to the native side.
    fn exec(&self, command: BridgeCommand);
}

impl<B: Bridge + ?Sized> Bridge for Arc<B> {
    fn exec(&self, command: BridgeCommand) {
        (**self).exec(command);
    }
}

impl<B: Bridge + ?Sized> Bridge for Box<B> {
    fn exec(&self, command: BridgeCommand) {
        (**self).exec(command);
    }
}

impl<B: Bridge + ?Sized> Bridge for &B {
    fn exec(&self, command: BridgeCommand) {
        (**self).exec(command);
    }
}
