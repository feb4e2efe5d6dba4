use std::fmt;

use crate::runtime::leak_detector;

/// Callback invoked with the wrapped resource once the last share is gone.
pub type HandleReleaseFn = fn(u64);

/// Shared payload of a handle type.
///
/// Copies of a handle value share one box through `Rc`. Dropping the last
/// share runs the release callback taken from the handle type's parameter,
/// so a resource is released exactly once no matter how many values held it.
pub struct HandleBox {
    resource: u64,
    release: HandleReleaseFn,
}

impl HandleBox {
    pub fn new(resource: u64, release: HandleReleaseFn) -> Self {
        leak_detector::record_handle_open();
        Self { resource, release }
    }

    pub fn resource(&self) -> u64 {
        self.resource
    }
}

impl Drop for HandleBox {
    fn drop(&mut self) {
        leak_detector::record_handle_release();
        (self.release)(self.resource);
    }
}

impl fmt::Debug for HandleBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandleBox({})", self.resource)
    }
}
