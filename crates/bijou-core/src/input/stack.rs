//! A stack of named key-map layers with top-down dispatch.

use super::Key;

struct Layer<M> {
    name: String,
    dispatch: Box<dyn Fn(Key) -> Option<M>>,
}

/// Layered key dispatch: the most recently pushed layer is tried
/// first; the first layer whose dispatch function returns a message
/// wins. If no layer fires, the key is dropped.
pub struct InputStack<M> {
    layers: Vec<Layer<M>>,
}

impl<M> Default for InputStack<M> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<M> InputStack<M> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new layer on top.
    pub fn push(&mut self, name: impl Into<String>, dispatch: impl Fn(Key) -> Option<M> + 'static) {
        self.layers.push(Layer { name: name.into(), dispatch: Box::new(dispatch) });
    }

    /// Pop the top layer, returning its name.
    pub fn pop(&mut self) -> Option<String> {
        self.layers.pop().map(|l| l.name)
    }

    /// Replace an existing layer's dispatch function by name, leaving
    /// its stack position unchanged. Returns `false` if no layer with
    /// that name exists.
    pub fn swap(&mut self, name: &str, dispatch: impl Fn(Key) -> Option<M> + 'static) -> bool {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.name == name) {
            layer.dispatch = Box::new(dispatch);
            true
        } else {
            false
        }
    }

    /// Dispatch a key top-down; the first layer to return `Some` wins.
    pub fn dispatch(&self, key: Key) -> Option<M> {
        self.layers.iter().rev().find_map(|l| (l.dispatch)(key))
    }

    /// Number of layers currently on the stack.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True if the stack has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Name of the top layer, if any.
    pub fn top(&self) -> Option<&str> {
        self.layers.last().map(|l| l.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_layer_wins_when_it_fires() {
        let mut stack: InputStack<&'static str> = InputStack::new();
        stack.push("base", |_| Some("base-msg"));
        stack.push("modal", |k| if k == Key::Escape { Some("close-modal") } else { None });
        assert_eq!(stack.dispatch(Key::Escape), Some("close-modal"));
    }

    #[test]
    fn falls_through_to_lower_layer() {
        let mut stack: InputStack<&'static str> = InputStack::new();
        stack.push("base", |_| Some("base-msg"));
        stack.push("modal", |k| if k == Key::Escape { Some("close-modal") } else { None });
        assert_eq!(stack.dispatch(Key::Enter), Some("base-msg"));
    }

    #[test]
    fn dropped_when_no_layer_fires() {
        let mut stack: InputStack<&'static str> = InputStack::new();
        stack.push("base", |_| None);
        assert_eq!(stack.dispatch(Key::Enter), None);
    }

    #[test]
    fn pop_removes_top_layer() {
        let mut stack: InputStack<&'static str> = InputStack::new();
        stack.push("base", |_| Some("base-msg"));
        stack.push("modal", |_| Some("modal-msg"));
        assert_eq!(stack.pop().as_deref(), Some("modal"));
        assert_eq!(stack.dispatch(Key::Enter), Some("base-msg"));
    }

    #[test]
    fn swap_replaces_dispatch_in_place() {
        let mut stack: InputStack<&'static str> = InputStack::new();
        stack.push("base", |_| Some("old"));
        assert!(stack.swap("base", |_| Some("new")));
        assert_eq!(stack.dispatch(Key::Enter), Some("new"));
        assert!(!stack.swap("missing", |_| None));
    }
}
