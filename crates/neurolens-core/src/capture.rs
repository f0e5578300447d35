//! Camera boundary.
//!
//! The monitor never reads frames. It only needs to know whether the
//! capture device could be opened when monitoring is switched on.

use crate::error::PermissionError;

pub trait CaptureDevice: Send {
    /// Open the device. Fails when the user refuses camera access.
    fn acquire(&mut self) -> Result<(), PermissionError>;

    /// Close the device. Safe to call when not acquired.
    fn release(&mut self);

    fn is_active(&self) -> bool;
}

/// Capture device with a fixed permission answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedCamera {
    granted: bool,
    active: bool,
}

impl SimulatedCamera {
    pub fn granted() -> Self {
        Self {
            granted: true,
            active: false,
        }
    }

    pub fn denied() -> Self {
        Self {
            granted: false,
            active: false,
        }
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::granted()
    }
}

impl CaptureDevice for SimulatedCamera {
    fn acquire(&mut self) -> Result<(), PermissionError> {
        if !self.granted {
            return Err(PermissionError::Camera);
        }
        self.active = true;
        Ok(())
    }

    fn release(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_camera_toggles() {
        let mut cam = SimulatedCamera::granted();
        cam.acquire().unwrap();
        assert!(cam.is_active());
        cam.release();
        assert!(!cam.is_active());
    }

    #[test]
    fn denied_camera_stays_inactive() {
        let mut cam = SimulatedCamera::denied();
        assert_eq!(cam.acquire(), Err(PermissionError::Camera));
        assert!(!cam.is_active());
    }
}
