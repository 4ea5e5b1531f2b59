//! Boundary between the sequencer and whatever moves bytes to and from the device.

use crate::error::Result;
use crate::midi::InboundEvent;
use crate::sequencer::drums::DrumSound;
use crate::sequencer::grid::PadId;

/// Everything the sequencer needs from the outside world.
///
/// Writes are fire-and-forget: an `Err` is logged by the caller and the
/// command is not retried.
pub trait Transport {
    /// Switch the device into programmable LED mode. Sent once, before any LED command.
    fn handshake(&mut self) -> Result<()>;

    fn set_led(&mut self, id: PadId, color: u8) -> Result<()>;

    fn clear_led(&mut self, id: PadId) -> Result<()>;

    /// Non-blocking; returns everything received since the previous call.
    fn drain_pending_events(&mut self) -> Vec<InboundEvent>;

    /// Trigger a drum sound on the sound output (not on the device).
    fn emit_sound(&mut self, sound: DrumSound) -> Result<()>;

    /// Close every port. Must be safe to call more than once.
    fn release(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn handshake(&mut self) -> Result<()> {
        (**self).handshake()
    }

    fn set_led(&mut self, id: PadId, color: u8) -> Result<()> {
        (**self).set_led(id, color)
    }

    fn clear_led(&mut self, id: PadId) -> Result<()> {
        (**self).clear_led(id)
    }

    fn drain_pending_events(&mut self) -> Vec<InboundEvent> {
        (**self).drain_pending_events()
    }

    fn emit_sound(&mut self, sound: DrumSound) -> Result<()> {
        (**self).emit_sound(sound)
    }

    fn release(&mut self) {
        (**self).release()
    }
}
