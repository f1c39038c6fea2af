//! Message bus session.
//!
//! A [`Session`] delivers decoded messages to handlers registered per data
//! type, on its own dispatch thread, and reports whether it is still running.
//! [`LocalSession`] is the in-process implementation: anything holding a
//! [`Publisher`] can feed it messages.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often an idle dispatch thread re-checks whether it should stop.
pub const DISPATCH_POLL: Duration = Duration::from_millis(50);

/// Direction towards something the vehicle perceives, in image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Direction {
    pub azimuth_angle: f32,
    pub zenith_angle: f32,
}

impl Direction {
    pub const ID: u32 = 1037;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    Direction(Direction),
}

impl Message {
    pub fn data_type(&self) -> u32 {
        match self {
            Message::Direction(_) => Direction::ID,
        }
    }
}

pub type Handler = Box<dyn Fn(&Message) + Send + Sync + 'static>;

pub trait Session {
    /// Register `handler` for messages of `data_type`, replacing any earlier one.
    fn data_trigger(&self, data_type: u32, handler: Handler);
    fn is_running(&self) -> bool;
}

type Handlers = Arc<Mutex<HashMap<u32, Arc<dyn Fn(&Message) + Send + Sync>>>>;

pub struct LocalSession {
    cid: u16,
    running: Arc<AtomicBool>,
    handlers: Handlers,
    tx: Sender<Message>,
    dispatcher: Option<JoinHandle<()>>,
}

impl LocalSession {
    /// Start a session for conference id `cid` and its dispatch thread.
    pub fn new(cid: u16) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let handlers: Handlers = Arc::default();
        let (tx, rx) = mpsc::channel();

        let dispatcher = {
            let running = Arc::clone(&running);
            let handlers = Arc::clone(&handlers);
            thread::Builder::new()
                .name(format!("session-{cid}"))
                .spawn(move || dispatch(rx, &running, &handlers))
                .map_err(|err| log::error!("session {cid}: cannot spawn dispatch thread: {err}"))
                .ok()
        };
        if dispatcher.is_none() {
            running.store(false, Ordering::SeqCst);
        }

        log::debug!("session {cid} started");
        Self { cid, running, handlers, tx, dispatcher }
    }

    pub fn cid(&self) -> u16 {
        self.cid
    }

    pub fn publisher(&self) -> Publisher {
        Publisher { tx: self.tx.clone(), running: Arc::clone(&self.running) }
    }

    /// Mark the session as finished. The dispatch thread exits within one
    /// [`DISPATCH_POLL`] once its queue is drained.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            log::debug!("session {} stopping", self.cid);
        }
    }
}

impl Session for LocalSession {
    fn data_trigger(&self, data_type: u32, handler: Handler) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(data_type, Arc::from(handler));
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for LocalSession {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.dispatcher.take() {
            if handle.join().is_err() {
                log::warn!("session {}: dispatch thread panicked", self.cid);
            }
        }
    }
}

fn dispatch(rx: Receiver<Message>, running: &AtomicBool, handlers: &Handlers) {
    loop {
        match rx.recv_timeout(DISPATCH_POLL) {
            Ok(msg) => {
                // clone the handler out so it runs without the registry lock
                let handler = handlers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&msg.data_type())
                    .cloned();
                match handler {
                    Some(handler) => handler(&msg),
                    None => log::trace!("no handler for data type {}", msg.data_type()),
                }
            }
            Err(RecvTimeoutError::Timeout) if running.load(Ordering::SeqCst) => {}
            Err(_) => break,
        }
    }
}

/// Sending side of a [`LocalSession`].
#[derive(Clone)]
pub struct Publisher {
    tx: Sender<Message>,
    running: Arc<AtomicBool>,
}

impl Publisher {
    /// Queue `msg` for dispatch. Returns false once the session has stopped.
    pub fn send(&self, msg: Message) -> bool {
        self.running.load(Ordering::SeqCst) && self.tx.send(msg).is_ok()
    }
}
