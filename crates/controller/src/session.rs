use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use shapedraw_common::{Result, ShapeDrawError};
use shapedraw_render::{same_shape, ShapeHandle};

use crate::controller::Controller;
use crate::event::{same_listener, ListenerHandle};

struct SessionState {
    id: Option<String>,
    owner: String,
    shapes: Vec<ShapeHandle>,
    listeners: Vec<ListenerHandle>,
    visible: bool,
    visible_when_hiding_gui: bool,
}

/// A client's drawing session: its shapes, its listeners and its visibility.
///
/// `Session` is a cheap shared handle; clones refer to the same session and
/// compare equal under [`Session::ptr_eq`]. It belongs to the frame thread.
#[derive(Clone)]
pub struct Session {
    inner: Rc<RefCell<SessionState>>,
}

impl Session {
    /// Create a session for `owner` and register it with `controller`.
    pub fn new(controller: &mut Controller, owner: &str) -> Result<Self> {
        let session = Self::detached(owner)?;
        controller.register(&session, owner)?;
        Ok(session)
    }

    /// Create a session without registering it.
    pub fn detached(owner: &str) -> Result<Self> {
        if owner.trim().is_empty() {
            return Err(ShapeDrawError::NullArgument("owner"));
        }
        Ok(Self {
            inner: Rc::new(RefCell::new(SessionState {
                id: None,
                owner: owner.to_string(),
                shapes: Vec::new(),
                listeners: Vec::new(),
                visible: true,
                visible_when_hiding_gui: false,
            })),
        })
    }

    /// Remove this session from `controller`. Returns false if it was not
    /// registered there.
    pub fn unregister(&self, controller: &mut Controller) -> bool {
        controller.unregister(self)
    }

    /// Identity assigned at registration; `None` while unregistered.
    pub fn id(&self) -> Option<String> {
        self.inner.borrow().id.clone()
    }

    pub fn owner(&self) -> String {
        self.inner.borrow().owner.clone()
    }

    pub fn is_registered(&self) -> bool {
        self.inner.borrow().id.is_some()
    }

    /// Identity if registered, otherwise `<owner>#?`.
    pub fn label(&self) -> String {
        let state = self.inner.borrow();
        match &state.id {
            Some(id) => id.clone(),
            None => format!("{}#?", state.owner),
        }
    }

    pub(crate) fn set_id(&self, id: Option<String>) {
        self.inner.borrow_mut().id = id;
    }

    pub fn ptr_eq(&self, other: &Session) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // --- shapes ---

    /// Append a shape. Adding a shape that is already present does nothing.
    pub fn add_shape(&self, shape: ShapeHandle) -> &Self {
        let mut state = self.inner.borrow_mut();
        if !state.shapes.iter().any(|s| same_shape(s, &shape)) {
            state.shapes.push(shape);
        }
        drop(state);
        self
    }

    pub fn remove_shape(&self, shape: &ShapeHandle) -> bool {
        let mut state = self.inner.borrow_mut();
        let before = state.shapes.len();
        state.shapes.retain(|s| !same_shape(s, shape));
        state.shapes.len() != before
    }

    pub fn clear_shapes(&self) -> &Self {
        self.inner.borrow_mut().shapes.clear();
        self
    }

    pub fn contains_shape(&self, shape: &ShapeHandle) -> bool {
        self.inner.borrow().shapes.iter().any(|s| same_shape(s, shape))
    }

    /// Snapshot of the shapes in insertion order.
    pub fn shapes(&self) -> Vec<ShapeHandle> {
        self.inner.borrow().shapes.clone()
    }

    pub fn shape_count(&self) -> usize {
        self.inner.borrow().shapes.len()
    }

    // --- listeners ---

    /// Append a listener. Adding one that is already present does nothing.
    pub fn add_listener(&self, listener: ListenerHandle) -> &Self {
        let mut state = self.inner.borrow_mut();
        if !state.listeners.iter().any(|l| same_listener(l, &listener)) {
            state.listeners.push(listener);
        }
        drop(state);
        self
    }

    pub fn remove_listener(&self, listener: &ListenerHandle) -> bool {
        let mut state = self.inner.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|l| !same_listener(l, listener));
        state.listeners.len() != before
    }

    pub fn clear_listeners(&self) -> &Self {
        self.inner.borrow_mut().listeners.clear();
        self
    }

    /// Snapshot of the listeners in insertion order.
    pub fn listeners(&self) -> Vec<ListenerHandle> {
        self.inner.borrow().listeners.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    // --- visibility ---

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visible
    }

    pub fn set_visible(&self, visible: bool) -> &Self {
        self.inner.borrow_mut().visible = visible;
        self
    }

    /// Whether shapes are still drawn while the host GUI is hidden.
    pub fn is_visible_when_hiding_gui(&self) -> bool {
        self.inner.borrow().visible_when_hiding_gui
    }

    pub fn set_visible_when_hiding_gui(&self, visible: bool) -> &Self {
        self.inner.borrow_mut().visible_when_hiding_gui = visible;
        self
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(state) => f
                .debug_struct("Session")
                .field("id", &state.id)
                .field("owner", &state.owner)
                .field("shapes", &state.shapes.len())
                .field("listeners", &state.listeners.len())
                .field("visible", &state.visible)
                .finish(),
            Err(_) => f.write_str("Session(<busy>)"),
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
