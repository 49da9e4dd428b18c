//! Callback bridge to user drawing code
//!
//! The renderer knows nothing about how user drawing logic is hosted (a
//! scripting runtime, a closure, a scene file). It only hands the bridge
//! the component being drawn and the pass's [`Canvas`], then waits for the
//! call to return.

use std::fmt;

use easel_core::Canvas;

/// Identifies the host component a draw pass is for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    /// Host component type tag
    pub component_type: u32,
    /// Host component instance id
    pub id: u32,
}

impl ComponentRef {
    pub const fn new(component_type: u32, id: u32) -> Self {
        Self { component_type, id }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.component_type, self.id)
    }
}

/// Synchronously runs user drawing logic for one component
pub trait CallbackBridge {
    fn invoke(&mut self, component: ComponentRef, canvas: &Canvas);
}

impl<F> CallbackBridge for F
where
    F: FnMut(ComponentRef, &Canvas),
{
    fn invoke(&mut self, component: ComponentRef, canvas: &Canvas) {
        self(component, canvas)
    }
}
