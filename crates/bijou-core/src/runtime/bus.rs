//! Multi-producer / single-consumer event bus for a single running
//! program.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::command::{Command, Emitted, Emitter};
use crate::input::{parse_key, parse_mouse, Key, KeyMsg, MouseMsg};
use crate::runtime::context::{Handle, IoPort};

/// A decoded low-level input event, the payload `connect` forwards
/// through the bus. Application message types embed these via
/// `From<InputEvent>`.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// A decoded key press.
    Key(KeyMsg),
    /// A decoded mouse event.
    Mouse(MouseMsg),
    /// A terminal resize, in (columns, rows).
    Resize(usize, usize),
}

struct Subscription<M> {
    id: u64,
    callback: Box<dyn Fn(&M) + Send + Sync>,
}

/// Handle returned by [`EventBus::subscribe`] and [`EventBus::on_quit`];
/// disposing it removes the registered callback.
pub struct SubscriptionHandle {
    id: u64,
    remove: Box<dyn Fn(u64) + Send>,
}

impl Handle for SubscriptionHandle {
    fn dispose(&mut self) {
        (self.remove)(self.id);
    }
}

/// The bus itself. Delivers messages to subscribers in emission
/// order; routes the QUIT sentinel to `onQuit` handlers only. Always
/// held behind an `Arc` so subscription and disposal handles can
/// outlive the call that created them.
pub struct EventBus<M> {
    subscribers: Mutex<Vec<Subscription<M>>>,
    quit_handlers: Mutex<Vec<Subscription<()>>>,
    next_id: AtomicU64,
    ports: Mutex<Vec<Box<dyn Handle>>>,
}

impl<M: Send + 'static> Default for EventBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + 'static> EventBus<M> {
    /// Build an empty bus.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            quit_handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            ports: Mutex::new(Vec::new()),
        }
    }

    fn alloc_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a callback invoked for every emitted message.
    pub fn subscribe(self: &Arc<Self>, callback: impl Fn(&M) + Send + Sync + 'static) -> SubscriptionHandle {
        let id = self.alloc_id();
        self.subscribers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(Subscription { id, callback: Box::new(callback) });
        let bus = Arc::clone(self);
        SubscriptionHandle {
            id,
            remove: Box::new(move |id| {
                bus.subscribers.lock().unwrap_or_else(|p| p.into_inner()).retain(|s| s.id != id);
            }),
        }
    }

    /// Deliver `msg` to every current subscriber, in subscription order.
    pub fn emit(&self, msg: &M) {
        let subs = self.subscribers.lock().unwrap_or_else(|p| p.into_inner());
        for sub in subs.iter() {
            (sub.callback)(msg);
        }
    }

    /// Register a handler for the QUIT sentinel.
    pub fn on_quit(self: &Arc<Self>, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionHandle {
        let id = self.alloc_id();
        self.quit_handlers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(Subscription { id, callback: Box::new(move |()| callback()) });
        let bus = Arc::clone(self);
        SubscriptionHandle {
            id,
            remove: Box::new(move |id| {
                bus.quit_handlers.lock().unwrap_or_else(|p| p.into_inner()).retain(|s| s.id != id);
            }),
        }
    }

    fn quit(&self) {
        let handlers = self.quit_handlers.lock().unwrap_or_else(|p| p.into_inner());
        for handler in handlers.iter() {
            (handler.callback)(&());
        }
    }

    /// Install a keyboard decoder subscription and a resize watcher on
    /// `io`, forwarding decoded events as messages. An unknown raw key
    /// sequence is dropped rather than forwarded.
    pub fn connect(self: &Arc<Self>, io: &dyn IoPort)
    where
        M: From<InputEvent>,
    {
        let bus = Arc::clone(self);
        let input_handle = io.raw_input(Box::new(move |raw| {
            if raw.starts_with(b"\x1b[<") {
                if let Some(mouse) = parse_mouse(raw) {
                    bus.emit(&M::from(InputEvent::Mouse(mouse)));
                }
                return;
            }
            let key = parse_key(raw);
            if matches!(key.key, Key::Unknown) {
                return;
            }
            bus.emit(&M::from(InputEvent::Key(key)));
        }));

        let bus = Arc::clone(self);
        let resize_handle = io.on_resize(Box::new(move |cols, rows| {
            bus.emit(&M::from(InputEvent::Resize(cols, rows)));
        }));

        let mut ports = self.ports.lock().unwrap_or_else(|p| p.into_inner());
        ports.push(input_handle);
        ports.push(resize_handle);
    }

    /// Run a command, listening for the QUIT sentinel and routing
    /// completed messages back through the bus.
    pub async fn run_command(self: &Arc<Self>, cmd: Command<M>) {
        let bus = Arc::clone(self);
        let emitter = Emitter::new(move |e| match e {
            Emitted::Message(msg) => bus.emit(&msg),
            Emitted::Quit => bus.quit(),
        });
        cmd.run(emitter).await;
    }

    /// Drop all subscribers and release every port resource installed
    /// by `connect`.
    pub fn dispose(&self) {
        self.subscribers.lock().unwrap_or_else(|p| p.into_inner()).clear();
        self.quit_handlers.lock().unwrap_or_else(|p| p.into_inner()).clear();
        let mut ports = self.ports.lock().unwrap_or_else(|p| p.into_inner());
        for mut handle in ports.drain(..) {
            handle.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn emits_in_subscription_order() {
        let bus: Arc<EventBus<i32>> = Arc::new(EventBus::new());
        let order = Arc::new(StdMutex::new(Vec::new()));
        let o1 = Arc::clone(&order);
        bus.subscribe(move |m| o1.lock().unwrap().push(("first", *m)));
        let o2 = Arc::clone(&order);
        bus.subscribe(move |m| o2.lock().unwrap().push(("second", *m)));
        bus.emit(&7);
        assert_eq!(*order.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn disposing_a_subscription_stops_delivery() {
        let bus: Arc<EventBus<i32>> = Arc::new(EventBus::new());
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let mut handle = bus.subscribe(move |m| seen_clone.lock().unwrap().push(*m));
        bus.emit(&1);
        handle.dispose();
        bus.emit(&2);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn quit_reaches_only_quit_handlers() {
        let bus: Arc<EventBus<i32>> = Arc::new(EventBus::new());
        let messages = Arc::new(StdMutex::new(Vec::new()));
        let messages_clone = Arc::clone(&messages);
        bus.subscribe(move |m| messages_clone.lock().unwrap().push(*m));
        let quit_fired = Arc::new(StdMutex::new(false));
        let quit_clone = Arc::clone(&quit_fired);
        bus.on_quit(move || *quit_clone.lock().unwrap() = true);
        bus.quit();
        assert!(*quit_fired.lock().unwrap());
        assert!(messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_command_routes_messages_and_quit() {
        let bus: Arc<EventBus<i32>> = Arc::new(EventBus::new());
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        bus.subscribe(move |m| seen_clone.lock().unwrap().push(*m));
        let quit_fired = Arc::new(StdMutex::new(false));
        let quit_clone = Arc::clone(&quit_fired);
        bus.on_quit(move || *quit_clone.lock().unwrap() = true);

        let cmd = Command::new(|e: Emitter<i32>| async move {
            e.send(42);
            e.quit();
        });
        bus.run_command(cmd).await;

        assert_eq!(*seen.lock().unwrap(), vec![42]);
        assert!(*quit_fired.lock().unwrap());
    }
}
