//! # Bus link abstraction
//!
//! The physical bus transceiver and its receive queueing live outside this
//! software. [`BusLink`] is the contract the control task holds against that
//! subsystem: a non-blocking poll of queued frames, a send, and a query for
//! whether the receive side has gone stale.
//!
//! [`ChannelBusLink`] is the in-process implementation over standard channels
//! used by the simulation harness and by unit tests.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::time::Duration;
use thiserror::Error;

// Internal
use crate::frame::BusFrame;
use util::time::WatchdogTimer;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Interface to the bus transceiver subsystem.
pub trait BusLink {
    /// Receive the next queued frame, or `None` if the queue is empty.
    ///
    /// This call never blocks.
    fn poll(&mut self) -> Option<BusFrame>;

    /// Queue a frame for transmission.
    fn send(&mut self, frame: &BusFrame) -> Result<(), BusSendError>;

    /// True once no well-formed frame has been received within the link's
    /// staleness window.
    fn rx_stale(&self) -> bool;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised when sending a frame over the link.
#[derive(Debug, Error)]
pub enum BusSendError {
    #[error("The transmit side of the link is disconnected")]
    Disconnected,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An in-process bus link over standard channels.
pub struct ChannelBusLink {
    rx: Receiver<BusFrame>,
    tx: Sender<BusFrame>,
    rx_wd: WatchdogTimer,
}

/// The far end of a [`ChannelBusLink`], held by the test or simulation
/// driving the bus.
pub struct ChannelBusPeer {
    /// Frames sent here arrive at the link's receive queue
    pub tx: Sender<BusFrame>,

    /// Frames sent by the control software arrive here
    pub rx: Receiver<BusFrame>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ChannelBusLink {
    /// Create a connected link/peer pair with the given receive staleness
    /// window.
    pub fn new(rx_timeout: Duration) -> (Self, ChannelBusPeer) {
        let (peer_tx, link_rx) = channel();
        let (link_tx, peer_rx) = channel();

        (
            Self {
                rx: link_rx,
                tx: link_tx,
                rx_wd: WatchdogTimer::new(rx_timeout),
            },
            ChannelBusPeer {
                tx: peer_tx,
                rx: peer_rx,
            },
        )
    }
}

impl BusLink for ChannelBusLink {
    fn poll(&mut self) -> Option<BusFrame> {
        match self.rx.try_recv() {
            Ok(frame) => {
                self.rx_wd.reset();
                Some(frame)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    fn send(&mut self, frame: &BusFrame) -> Result<(), BusSendError> {
        self.tx
            .send(frame.clone())
            .map_err(|_| BusSendError::Disconnected)
    }

    fn rx_stale(&self) -> bool {
        self.rx_wd.has_timed_out()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame::id;

    #[test]
    fn test_poll_is_non_blocking() {
        let (mut link, peer) = ChannelBusLink::new(Duration::from_millis(50));

        // Empty queue yields nothing
        assert!(link.poll().is_none());

        peer.tx
            .send(BusFrame::new(id::LATERAL_CONTROL, vec![0; 6]).unwrap())
            .unwrap();
        assert_eq!(link.poll().unwrap().id, id::LATERAL_CONTROL);
        assert!(link.poll().is_none());
    }

    #[test]
    fn test_send_reaches_peer() {
        let (mut link, peer) = ChannelBusLink::new(Duration::from_millis(50));

        let frame = BusFrame::new(id::FRONT_WHEEL_PARAMS, vec![0; 4]).unwrap();
        link.send(&frame).unwrap();
        assert_eq!(peer.rx.try_recv().unwrap(), frame);
    }

    #[test]
    fn test_rx_staleness() {
        let (mut link, peer) = ChannelBusLink::new(Duration::from_millis(0));

        // A zero window goes stale as soon as any time passes
        std::thread::sleep(Duration::from_millis(2));
        assert!(link.rx_stale());

        // Receiving a frame resets the staleness watchdog
        peer.tx
            .send(BusFrame::new(id::LATERAL_CONTROL, vec![0; 6]).unwrap())
            .unwrap();
        link.poll();
        assert!(link.rx_wd.elapsed() < Duration::from_millis(2));
    }
}
