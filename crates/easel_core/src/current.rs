//! Implicit "current canvas" binding
//!
//! Some callers (scripting bridges, C-style hosts) cannot carry a
//! [`Canvas`] handle through their call stack. For them the renderer binds
//! the pass's canvas as *current* and the free functions in this module
//! record into whatever is bound.
//!
//! The binding is thread-local: a pass on one thread never observes a
//! canvas bound on another. Within a thread it is scoped to one draw pass
//! and must be rebound before every pass; [`bind`] returns a guard that
//! restores the previous binding when the pass ends.
//!
//! Drawing while nothing is bound is not an error: the call is logged and
//! dropped.

use std::cell::RefCell;

use crate::canvas::{Canvas, SharedBuffer};
use crate::color::PackedColor;
use crate::geometry::{Fp, Point};

thread_local! {
    static CURRENT: RefCell<Option<Canvas>> = const { RefCell::new(None) };
}

/// Replace the current binding, returning the previous one
pub fn set_current(canvas: Option<Canvas>) -> Option<Canvas> {
    CURRENT.with(|current| std::mem::replace(&mut *current.borrow_mut(), canvas))
}

/// The canvas currently bound on this thread
pub fn get_current() -> Option<Canvas> {
    CURRENT.with(|current| current.borrow().clone())
}

/// The command buffer currently bound on this thread
pub fn current_buffer() -> Option<SharedBuffer> {
    CURRENT.with(|current| current.borrow().as_ref().map(|c| c.buffer().clone()))
}

/// Run `f` against the bound canvas, or return `None` if nothing is bound
pub fn with_current<R>(f: impl FnOnce(&Canvas) -> R) -> Option<R> {
    // Clone out of the cell so `f` may itself rebind
    get_current().map(|canvas| f(&canvas))
}

/// Bind `canvas` for the lifetime of the returned guard
pub fn bind(canvas: Canvas) -> BindingGuard {
    BindingGuard {
        previous: set_current(Some(canvas)),
    }
}

/// Restores the previous binding on drop
#[must_use = "the canvas is unbound as soon as the guard is dropped"]
pub struct BindingGuard {
    previous: Option<Canvas>,
}

impl Drop for BindingGuard {
    fn drop(&mut self) {
        set_current(self.previous.take());
    }
}

fn with_bound(operation: &'static str, f: impl FnOnce(&Canvas)) {
    if with_current(f).is_none() {
        tracing::warn!(operation, "no canvas command buffer bound");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Free-function drawing API
// ─────────────────────────────────────────────────────────────────────────────

pub fn draw_circle(cx: Fp, cy: Fp, radius: Fp, color: impl Into<PackedColor>, filled: bool) {
    let color = color.into();
    with_bound("draw_circle", |c| c.draw_circle(cx, cy, radius, color, filled));
}

pub fn draw_ellipse(cx: Fp, cy: Fp, rx: Fp, ry: Fp, color: impl Into<PackedColor>, filled: bool) {
    let color = color.into();
    with_bound("draw_ellipse", |c| c.draw_ellipse(cx, cy, rx, ry, color, filled));
}

pub fn draw_arc(
    cx: Fp,
    cy: Fp,
    radius: Fp,
    start_angle: Fp,
    end_angle: Fp,
    color: impl Into<PackedColor>,
) {
    let color = color.into();
    with_bound("draw_arc", |c| {
        c.draw_arc(cx, cy, radius, start_angle, end_angle, color)
    });
}

pub fn draw_polygon(vertices: &[Point], color: impl Into<PackedColor>, filled: bool) {
    let color = color.into();
    with_bound("draw_polygon", |c| c.draw_polygon(vertices, color, filled));
}

pub fn draw_rect(x: Fp, y: Fp, width: Fp, height: Fp, color: impl Into<PackedColor>) {
    let color = color.into();
    with_bound("draw_rect", |c| c.draw_rect(x, y, width, height, color));
}

pub fn draw_line(x1: Fp, y1: Fp, x2: Fp, y2: Fp, color: impl Into<PackedColor>) {
    let color = color.into();
    with_bound("draw_line", |c| c.draw_line(x1, y1, x2, y2, color));
}

pub fn draw_text(text: &str, x: Fp, y: Fp, color: impl Into<PackedColor>) {
    let color = color.into();
    with_bound("draw_text", |c| c.draw_text(text, x, y, color));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandKind};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_draw_without_binding_is_logged_and_dropped() {
        set_current(None);
        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            draw_circle(10.0, 10.0, 5.0, PackedColor::RED, false);
        });

        assert!(get_current().is_none());
        assert!(capture.contents().contains("no canvas command buffer bound"));
        assert!(capture.contents().contains("draw_circle"));
    }

    #[test]
    fn test_bound_canvas_receives_free_function_calls() {
        let canvas = Canvas::detached();
        {
            let _guard = bind(canvas.clone());
            draw_circle(1.0, 2.0, 3.0, PackedColor::BLUE, true);
            draw_text("abc", 0.0, 0.0, PackedColor::BLACK);
            assert!(current_buffer().is_some());
        }
        assert!(get_current().is_none());

        let kinds: Vec<CommandKind> = canvas
            .buffer()
            .borrow()
            .iter()
            .map(|c: Command| c.kind())
            .collect();
        assert_eq!(kinds, vec![CommandKind::Circle, CommandKind::Text]);
    }

    #[test]
    fn test_guard_restores_previous_binding() {
        let outer = Canvas::detached();
        let inner = Canvas::detached();

        let _outer_guard = bind(outer.clone());
        {
            let _inner_guard = bind(inner.clone());
            draw_line(0.0, 0.0, 1.0, 1.0, PackedColor::WHITE);
            assert!(get_current().is_some_and(|c| c.shares_buffer(&inner)));
        }
        draw_rect(0.0, 0.0, 1.0, 1.0, PackedColor::WHITE);

        assert!(get_current().is_some_and(|c| c.shares_buffer(&outer)));
        assert_eq!(inner.command_count(), 1);
        assert_eq!(outer.command_count(), 1);
    }

    #[test]
    fn test_set_current_replaces_binding() {
        let first = Canvas::detached();
        let second = Canvas::detached();
        set_current(Some(first.clone()));
        let previous = set_current(Some(second.clone()));
        assert!(previous.is_some_and(|c| c.shares_buffer(&first)));
        draw_ellipse(0.0, 0.0, 1.0, 2.0, PackedColor::RED, false);
        assert_eq!(first.command_count(), 0);
        assert_eq!(second.command_count(), 1);
        set_current(None);
    }

    #[test]
    fn test_binding_is_thread_local() {
        let canvas = Canvas::detached();
        let _guard = bind(canvas);
        let seen_elsewhere = std::thread::spawn(|| get_current().is_some())
            .join()
            .unwrap();
        assert!(!seen_elsewhere);
    }
}
