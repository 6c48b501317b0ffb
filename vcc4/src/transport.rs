//! Outbound byte transport.
use crate::Result;

/// Something which can carry command frames to the camera.
///
/// Delivery is not guaranteed: a successful `send()` only means that the
/// bytes were handed off. Inbound bytes are pushed into the driver separately,
/// with [`Vcc4::receive()`][crate::Vcc4::receive].
pub trait Transport {
    /// Sends a complete frame.
    fn send(&mut self, frame: &[u8]) -> Result;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, frame: &[u8]) -> Result {
        (**self).send(frame)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, frame: &[u8]) -> Result {
        (**self).send(frame)
    }
}
