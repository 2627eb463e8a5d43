//! The Elm Architecture runtime: a single-threaded, message-driven
//! update loop over a [`Context`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::command::Command;
use crate::runtime::bus::{EventBus, InputEvent};
use crate::runtime::context::Context;
use crate::runtime::screen;

/// The `(init, update, view)` triple a TEA application supplies.
///
/// `update` and `view` must be pure and must never suspend; all side
/// effects happen inside the commands they return.
pub trait App: Send + Sync {
    /// Application state.
    type Model: Send + 'static;
    /// Application message type. Must embed decoded input events so
    /// the runtime can forward keyboard, mouse, and resize activity.
    type Msg: Clone + Send + 'static + From<InputEvent>;

    /// Build the initial model and any startup commands.
    fn init(&self, ctx: &Context) -> (Self::Model, Vec<Command<Self::Msg>>);

    /// Fold one message into the model, returning the next model and
    /// any commands it triggers.
    fn update(&self, ctx: &Context, msg: Self::Msg, model: Self::Model) -> (Self::Model, Vec<Command<Self::Msg>>);

    /// Render the current model to a frame string.
    fn view(&self, ctx: &Context, model: &Self::Model) -> String;
}

/// Drive `app` to completion: enter the alt screen, run init, then
/// process messages one at a time until QUIT, then exit the alt
/// screen and release every bus resource.
pub async fn run<A: App>(app: &A, ctx: Context) {
    screen::enter(ctx.io.as_ref());

    let bus: Arc<EventBus<A::Msg>> = Arc::new(EventBus::new());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<A::Msg>();
    let tx_for_subscription = tx.clone();
    let _delivery = bus.subscribe(move |msg: &A::Msg| {
        let _ = tx_for_subscription.send(msg.clone());
    });

    let quit_seen = Arc::new(AtomicBool::new(false));
    let (quit_tx, mut quit_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    let quit_seen_writer = Arc::clone(&quit_seen);
    let _quit_subscription = bus.on_quit(move || {
        quit_seen_writer.store(true, Ordering::SeqCst);
        let _ = quit_tx.send(());
    });

    bus.connect(ctx.io.as_ref());

    let (mut model, init_cmds) = app.init(&ctx);
    screen::render_frame(ctx.io.as_ref(), &app.view(&ctx, &model));
    spawn_all(&bus, init_cmds);

    loop {
        tokio::select! {
            _ = quit_rx.recv() => break,
            received = rx.recv() => {
                let Some(msg) = received else { break };
                let (next_model, cmds) = app.update(&ctx, msg, model);
                model = next_model;
                screen::render_frame(ctx.io.as_ref(), &app.view(&ctx, &model));
                spawn_all(&bus, cmds);
                if quit_seen.load(Ordering::SeqCst) {
                    break;
                }
            }
        }
    }

    screen::exit(ctx.io.as_ref());
    bus.dispose();
}

fn spawn_all<M: Clone + Send + 'static>(bus: &Arc<EventBus<M>>, cmds: Vec<Command<M>>) {
    for cmd in cmds {
        let bus = Arc::clone(bus);
        tokio::spawn(async move { bus.run_command(cmd).await });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::{BoxFuture, EnvSnapshot, Handle, IoPort, Runtime};
    use std::sync::Mutex;

    struct TestRuntime {
        env: EnvSnapshot,
    }
    impl Runtime for TestRuntime {
        fn columns(&self) -> usize {
            80
        }
        fn rows(&self) -> usize {
            24
        }
        fn stdin_is_tty(&self) -> bool {
            false
        }
        fn stdout_is_tty(&self) -> bool {
            true
        }
        fn env(&self) -> &EnvSnapshot {
            &self.env
        }
    }

    struct NoopHandle;
    impl Handle for NoopHandle {
        fn dispose(&mut self) {}
    }

    struct TestIo {
        frames: Arc<Mutex<Vec<Vec<u8>>>>,
    }
    impl IoPort for TestIo {
        fn write(&self, bytes: &[u8]) {
            self.frames.lock().unwrap().push(bytes.to_vec());
        }
        fn question(&self, _prompt: &str) -> BoxFuture<String> {
            Box::pin(async { String::new() })
        }
        fn raw_input(&self, _callback: Box<dyn Fn(&[u8]) + Send + Sync>) -> Box<dyn Handle> {
            Box::new(NoopHandle)
        }
        fn on_resize(&self, _callback: Box<dyn Fn(usize, usize) + Send + Sync>) -> Box<dyn Handle> {
            Box::new(NoopHandle)
        }
        fn set_interval(&self, _callback: Box<dyn Fn() + Send + Sync>, _ms: u64) -> Box<dyn Handle> {
            Box::new(NoopHandle)
        }
        fn read_file(&self, _path: &str) -> std::io::Result<Vec<u8>> {
            Ok(Vec::new())
        }
        fn read_dir(&self, _path: &str) -> std::io::Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn join_path(&self, base: &str, segment: &str) -> String {
            format!("{base}/{segment}")
        }
    }

    struct NoColorStyle;
    impl crate::runtime::context::StylePort for NoColorStyle {
        fn styled(&self, _token: crate::token::Token, text: &str) -> String {
            text.to_string()
        }
        fn bold(&self, text: &str) -> String {
            text.to_string()
        }
    }

    struct EmptyTheme;
    impl crate::runtime::context::ThemePort for EmptyTheme {
        fn ink(&self, _name: &str) -> Option<crate::token::Token> {
            None
        }
        fn no_color(&self) -> bool {
            true
        }
    }

    #[derive(Clone)]
    enum Msg {
        Increment,
        Input(InputEvent),
    }
    impl From<InputEvent> for Msg {
        fn from(e: InputEvent) -> Self {
            Msg::Input(e)
        }
    }

    struct CounterApp;
    impl App for CounterApp {
        type Model = u32;
        type Msg = Msg;

        fn init(&self, _ctx: &Context) -> (u32, Vec<Command<Msg>>) {
            (0, vec![Command::new(|e| async move {
                e.send(Msg::Increment);
                e.quit();
            })])
        }

        fn update(&self, _ctx: &Context, msg: Msg, model: u32) -> (u32, Vec<Command<Msg>>) {
            match msg {
                Msg::Increment => (model + 1, Vec::new()),
                Msg::Input(_) => (model, Vec::new()),
            }
        }

        fn view(&self, _ctx: &Context, model: &u32) -> String {
            format!("count={model}")
        }
    }

    #[tokio::test]
    async fn runs_to_quit_and_renders_final_frame() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let ctx = Context::new(
            Box::new(TestRuntime { env: EnvSnapshot::from_map(Default::default()) }),
            Box::new(TestIo { frames: Arc::clone(&frames) }),
            Box::new(NoColorStyle),
            Box::new(EmptyTheme),
        );
        run(&CounterApp, ctx).await;

        let written: Vec<u8> = frames.lock().unwrap().concat();
        let written = String::from_utf8(written).unwrap();
        assert!(written.contains("count=1"), "expected final frame to show the incremented count: {written:?}");
    }
}
