//! Commands: asynchronous emitters that are the runtime's sole channel
//! for side effects, and the shared emitter handle they publish
//! through.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// What an emitter call publishes: a regular message, or the
/// distinguished QUIT sentinel, which never appears as a regular
/// message to `update`.
pub enum Emitted<M> {
    /// A regular application message.
    Message(M),
    /// The distinguished quit sentinel.
    Quit,
}

/// A cloneable handle commands use to publish messages back to the bus.
pub struct Emitter<M> {
    sink: Arc<dyn Fn(Emitted<M>) + Send + Sync>,
}

impl<M> Clone for Emitter<M> {
    fn clone(&self) -> Self {
        Self { sink: Arc::clone(&self.sink) }
    }
}

impl<M> Emitter<M> {
    /// Wrap a raw sink function as an emitter.
    pub fn new(sink: impl Fn(Emitted<M>) + Send + Sync + 'static) -> Self {
        Self { sink: Arc::new(sink) }
    }

    /// Publish a regular message.
    pub fn send(&self, msg: M) {
        (self.sink)(Emitted::Message(msg));
    }

    /// Publish the QUIT sentinel.
    pub fn quit(&self) {
        (self.sink)(Emitted::Quit);
    }
}

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A command: a function taking an emitter and returning a completion
/// future. Three legal effects: emit zero or more messages, resolve
/// the completion, or publish QUIT.
pub struct Command<M> {
    run: Box<dyn FnOnce(Emitter<M>) -> BoxFuture + Send>,
}

impl<M: Send + 'static> Command<M> {
    /// Build a command from an async closure over the emitter.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Emitter<M>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self { run: Box::new(move |emitter| Box::pin(f(emitter))) }
    }

    /// A command that emits nothing and resolves immediately.
    pub fn none() -> Self {
        Self::new(|_emitter| async {})
    }

    /// Run this command to completion against the given emitter.
    pub async fn run(self, emitter: Emitter<M>) {
        (self.run)(emitter).await;
    }
}

/// Chain commands so each awaits its predecessor in order, sharing one
/// emitter.
pub fn sequence<M: Send + 'static>(cmds: Vec<Command<M>>) -> Command<M> {
    Command::new(move |emitter| async move {
        for cmd in cmds {
            cmd.run(emitter.clone()).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collecting_emitter() -> (Emitter<i32>, Arc<Mutex<Vec<i32>>>, Arc<Mutex<bool>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let quit = Arc::new(Mutex::new(false));
        let received_clone = Arc::clone(&received);
        let quit_clone = Arc::clone(&quit);
        let emitter = Emitter::new(move |e| match e {
            Emitted::Message(m) => received_clone.lock().unwrap_or_else(|p| p.into_inner()).push(m),
            Emitted::Quit => *quit_clone.lock().unwrap_or_else(|p| p.into_inner()) = true,
        });
        (emitter, received, quit)
    }

    #[tokio::test]
    async fn command_emits_messages() {
        let (emitter, received, _quit) = collecting_emitter();
        let cmd = Command::new(|e: Emitter<i32>| async move {
            e.send(1);
            e.send(2);
        });
        cmd.run(emitter).await;
        assert_eq!(*received.lock().unwrap_or_else(|p| p.into_inner()), vec![1, 2]);
    }

    #[tokio::test]
    async fn command_can_quit() {
        let (emitter, _received, quit) = collecting_emitter();
        let cmd = Command::new(|e: Emitter<i32>| async move {
            e.quit();
        });
        cmd.run(emitter).await;
        assert!(*quit.lock().unwrap_or_else(|p| p.into_inner()));
    }

    #[tokio::test]
    async fn sequence_runs_in_order() {
        let (emitter, received, _quit) = collecting_emitter();
        let cmds = vec![
            Command::new(|e: Emitter<i32>| async move { e.send(1) }),
            Command::new(|e: Emitter<i32>| async move { e.send(2) }),
        ];
        sequence(cmds).run(emitter).await;
        assert_eq!(*received.lock().unwrap_or_else(|p| p.into_inner()), vec![1, 2]);
    }

    #[tokio::test]
    async fn none_emits_nothing() {
        let (emitter, received, _quit) = collecting_emitter();
        let cmd: Command<i32> = Command::none();
        cmd.run(emitter).await;
        assert!(received.lock().unwrap_or_else(|p| p.into_inner()).is_empty());
    }
}
