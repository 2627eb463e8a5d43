//! A counter with a spring-animated progress bar: small enough to
//! read end to end, exercising init/update/view, commands, the
//! animation kernel, and decoded key input all at once.

use bijou_core::anim::{animate, AnimateMotion, AnimateOptions, SpringConfig};
use bijou_core::command::Command;
use bijou_core::input::{Key, KeyMsg};
use bijou_core::runtime::{App, Context, InputEvent};

const BAR_WIDTH: usize = 30;

/// Application state: a count, and the bar's current animated fill.
pub struct Model {
    count: i64,
    fill: f64,
}

/// Messages the demo app reacts to.
#[derive(Clone)]
pub enum Msg {
    Input(InputEvent),
    Frame(f64),
}

impl From<InputEvent> for Msg {
    fn from(event: InputEvent) -> Self {
        Msg::Input(event)
    }
}

/// The demo `App` implementation.
pub struct DemoApp;

impl DemoApp {
    fn spring_to(target: f64) -> Command<Msg> {
        animate(AnimateOptions::new(0.0, target, AnimateMotion::Spring(SpringConfig::wobbly()), Msg::Frame).fps(30))
    }
}

impl App for DemoApp {
    type Model = Model;
    type Msg = Msg;

    fn init(&self, _ctx: &Context) -> (Model, Vec<Command<Msg>>) {
        (Model { count: 0, fill: 0.0 }, vec![Self::spring_to(0.0)])
    }

    fn update(&self, _ctx: &Context, msg: Msg, mut model: Model) -> (Model, Vec<Command<Msg>>) {
        match msg {
            Msg::Frame(value) => {
                model.fill = value;
                (model, Vec::new())
            }
            Msg::Input(InputEvent::Key(KeyMsg { key: Key::Char('q'), .. })) => {
                (model, vec![Command::new(|emitter| async move { emitter.quit() })])
            }
            Msg::Input(InputEvent::Key(KeyMsg { key: Key::Up, .. })) => {
                model.count += 1;
                let target = (model.count as f64 / 10.0).clamp(0.0, 1.0);
                (model, vec![Self::spring_to(target)])
            }
            Msg::Input(InputEvent::Key(KeyMsg { key: Key::Down, .. })) => {
                model.count -= 1;
                let target = (model.count as f64 / 10.0).clamp(0.0, 1.0);
                (model, vec![Self::spring_to(target)])
            }
            Msg::Input(_) => (model, Vec::new()),
        }
    }

    fn view(&self, ctx: &Context, model: &Model) -> String {
        let filled = ((model.fill.clamp(0.0, 1.0)) * BAR_WIDTH as f64).round() as usize;
        let bar: String = "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled);
        let bar = match ctx.theme.ink("semantic.primary") {
            Some(token) => ctx.style.styled(token, &bar),
            None => bar,
        };
        format!(
            "bijou demo — up/down to adjust, q to quit\n\n  count: {}\n  [{}]\n",
            model.count, bar
        )
    }
}
