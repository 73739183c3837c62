//! Bridge to the downstream renderer collaborator.
//!
//! Frames go out on a bounded channel with `try_send`, so a slow or absent
//! consumer never stalls a tick. Drops are logged and counted.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use log::{debug, warn};

use crate::events::frame::RenderFrame;

#[derive(Resource, Debug)]
pub struct RendererBridge {
    tx_frame: Sender<RenderFrame>,
    /// Frames delivered to the channel.
    pub sent: u64,
    /// Frames dropped because the channel was full or closed.
    pub dropped: u64,
    connected: bool,
}

impl RendererBridge {
    /// Create a bridge buffering up to `capacity` frames and the matching receiver.
    pub fn bounded(capacity: usize) -> (Self, Receiver<RenderFrame>) {
        let (tx_frame, rx_frame) = bounded(capacity.max(1));
        (
            RendererBridge {
                tx_frame,
                sent: 0,
                dropped: 0,
                connected: true,
            },
            rx_frame,
        )
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Best-effort send. Returns `true` if the frame was queued.
    pub fn dispatch(&mut self, frame: RenderFrame) -> bool {
        if !self.connected {
            self.dropped += 1;
            return false;
        }
        match self.tx_frame.try_send(frame) {
            Ok(()) => {
                self.sent += 1;
                true
            }
            Err(TrySendError::Full(frame)) => {
                self.dropped += 1;
                if self.dropped == 1 || self.dropped % 100 == 0 {
                    warn!(
                        "Renderer queue full, dropped frame {} ({} dropped so far)",
                        frame.tick, self.dropped
                    );
                } else {
                    debug!("Renderer queue full, dropped frame {}", frame.tick);
                }
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                self.connected = false;
                warn!("Renderer disconnected, further frames will be dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tick: u64) -> RenderFrame {
        RenderFrame {
            tick,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (mut bridge, rx) = RendererBridge::bounded(2);
        assert!(bridge.dispatch(frame(1)));
        assert!(bridge.dispatch(frame(2)));
        assert!(!bridge.dispatch(frame(3)));
        assert_eq!(bridge.sent, 2);
        assert_eq!(bridge.dropped, 1);
        assert_eq!(rx.try_recv().unwrap().tick, 1);
        assert!(bridge.dispatch(frame(4)));
    }

    #[test]
    fn test_disconnected_receiver() {
        let (mut bridge, rx) = RendererBridge::bounded(2);
        drop(rx);
        assert!(!bridge.dispatch(frame(1)));
        assert!(!bridge.is_connected());
        assert!(!bridge.dispatch(frame(2)));
        assert_eq!(bridge.dropped, 2);
    }
}
