//! Single-writer event queue
//!
//! Platform callbacks submit events from any thread; one worker thread
//! drains them into the controller in submission order.

use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::{Event, UpdateController};
use crate::error::{Result, SessionFxError};

enum QueueMsg {
    Event(Event),
    /// Acknowledged once every earlier message has been handled
    Flush(Sender<()>),
    Shutdown,
}

/// Handle to the worker thread feeding an `UpdateController`
pub struct EventQueue {
    tx: Sender<QueueMsg>,
    join_handle: Option<JoinHandle<()>>,
}

impl EventQueue {
    /// Start the worker thread
    pub fn spawn(controller: Arc<UpdateController>) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let join_handle = thread::Builder::new()
            .name("sessionfx-events".to_string())
            .spawn(move || run(controller, rx))?;

        Ok(Self {
            tx,
            join_handle: Some(join_handle),
        })
    }

    /// Queue an event for the controller
    pub fn submit(&self, event: Event) -> Result<()> {
        self.tx
            .send(QueueMsg::Event(event))
            .map_err(|_| SessionFxError::QueueClosed)
    }

    /// Block until every event submitted so far has been handled
    pub fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        self.tx
            .send(QueueMsg::Flush(ack_tx))
            .map_err(|_| SessionFxError::QueueClosed)?;
        ack_rx.recv().map_err(|_| SessionFxError::QueueClosed)
    }
}

impl Drop for EventQueue {
    fn drop(&mut self) {
        let _ = self.tx.send(QueueMsg::Shutdown);
        if let Some(handle) = self.join_handle.take() {
            if handle.join().is_err() {
                warn!("Event worker panicked");
            }
        }
    }
}

fn run(controller: Arc<UpdateController>, rx: Receiver<QueueMsg>) {
    for msg in rx.iter() {
        match msg {
            QueueMsg::Event(event) => {
                debug!("Handling {:?}", event);
                controller.handle_event(event);
            }
            QueueMsg::Flush(ack) => {
                let _ = ack.send(());
            }
            QueueMsg::Shutdown => break,
        }
    }
    debug!("Event worker stopped");
}
