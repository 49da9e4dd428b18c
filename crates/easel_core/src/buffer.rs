//! Command buffer and iterator
//!
//! A [`CommandBuffer`] is created once per renderer and reused every frame:
//! `clear` drops the length to zero but keeps the allocation, so steady
//! state frames record without touching the allocator.
//!
//! [`CommandIter`] borrows the buffer immutably, so the buffer cannot be
//! pushed to or cleared while a drain is in progress.

use crate::command::Command;
use crate::error::{CanvasError, Result};

/// Capacity reserved by [`CommandBuffer::new`]
pub const DEFAULT_CAPACITY: usize = 64;

/// Growable, ordered store of canvas commands for one draw pass
#[derive(Clone, Debug)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Create an empty buffer with [`DEFAULT_CAPACITY`] reserved
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Replace the storage with a fresh, empty allocation
    pub fn init(&mut self) {
        self.commands = Vec::with_capacity(DEFAULT_CAPACITY);
    }

    /// Drop every command, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Append a command
    ///
    /// Storage grows by amortized doubling. Fails only when the command has
    /// non-finite geometry or the allocation fails; in both cases the
    /// buffer is left exactly as it was.
    pub fn push(&mut self, command: Command) -> Result<()> {
        if !command.is_finite() {
            return Err(CanvasError::NonFinite(command.kind()));
        }
        self.commands
            .try_reserve(1)
            .map_err(|_| CanvasError::Allocation {
                requested: self.commands.len() + 1,
            })?;
        self.commands.push(command);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.commands.capacity()
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    /// Create a fresh iterator positioned at the first command
    pub fn iter(&self) -> CommandIter<'_> {
        CommandIter::new(self)
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a CommandBuffer {
    type Item = Command;
    type IntoIter = CommandIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Iterator
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only cursor over a [`CommandBuffer`]
///
/// Yields value copies in insertion order and never mutates the buffer.
#[derive(Clone, Debug)]
pub struct CommandIter<'a> {
    buffer: &'a CommandBuffer,
    position: usize,
}

impl<'a> CommandIter<'a> {
    pub fn new(buffer: &'a CommandBuffer) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Copy the next command into `out` and advance
    ///
    /// Returns false and leaves `out` untouched once the buffer is drained.
    pub fn next_into(&mut self, out: &mut Command) -> bool {
        match self.buffer.commands.get(self.position) {
            Some(command) => {
                *out = *command;
                self.position += 1;
                true
            }
            None => false,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for CommandIter<'_> {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        let command = self.buffer.commands.get(self.position).copied()?;
        self.position += 1;
        Some(command)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CommandIter<'_> {}
