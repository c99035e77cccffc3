//! Fixed-capacity argument buffer with reserved placeholder slots.
//!
//! [`ArgSlots::reserve`] lays the argument list out as
//!
//! ```text
//! [program, Empty x extra, arg1, .., argN, End]
//! ```
//!
//! so injected flags land directly after the program name, ahead of the
//! caller's own options, without reallocating. [`ArgSlots::compact`] then
//! squeezes out unused placeholders in place and hands back the final list.

use std::ffi::OsString;

use tracing::info;

/// One cell of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A real argument. May be the empty string if the caller passed one;
    /// such an argument is kept by [`ArgSlots::compact`] and never filled by
    /// [`ArgSlots::insert`]. Only [`Slot::Empty`] cells are placeholders.
    Arg(OsString),
    /// Reserved and not yet filled.
    Empty,
    /// Terminator, always the last cell.
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSlots {
    cells: Vec<Slot>,
}

impl ArgSlots {
    /// Copy `original` into a buffer with `extra` placeholders after the
    /// program name.
    ///
    /// `original` should not be empty: without a program name the
    /// placeholders start at index 0 and the first injected value would end
    /// up as `argv[0]`. The launcher never reserves for an empty list.
    pub fn reserve(original: Vec<OsString>, extra: usize) -> Self {
        let mut cells = Vec::with_capacity(original.len() + extra + 1);
        let mut args = original.into_iter();
        if let Some(program) = args.next() {
            cells.push(Slot::Arg(program));
        }
        cells.extend(std::iter::repeat_n(Slot::Empty, extra));
        cells.extend(args.map(Slot::Arg));
        cells.push(Slot::End);
        Self { cells }
    }

    /// Number of cells before the terminator.
    pub fn len(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.cells.get(index)
    }

    /// Write `value` into the first placeholder and return its index, or
    /// `None` when every reserved slot is taken.
    pub fn insert(&mut self, value: OsString) -> Option<usize> {
        let index = self.cells.iter().position(|cell| *cell == Slot::Empty)?;
        let cell = self.cells.get_mut(index)?;
        info!("Adding {} to command line", value.to_string_lossy());
        *cell = Slot::Arg(value);
        Some(index)
    }

    /// Remove every placeholder, keeping the relative order of the arguments.
    ///
    /// Two cursors sweep the cells once: `kept` counts arguments seen so far,
    /// `dropped` counts placeholders. Kept arguments always sit in
    /// `dropped..dropped + kept`; a placeholder at `kept + dropped` is closed
    /// by shifting that block up one cell.
    ///
    /// # Panics
    ///
    /// If the terminator is not at `len()`.
    pub fn compact(mut self) -> Vec<OsString> {
        let len = self.len();
        assert!(
            matches!(self.cells.get(len), Some(Slot::End)),
            "argument buffer terminator missing at {len}"
        );

        let mut kept = 0;
        let mut dropped = 0;
        while kept + dropped < len {
            let cur = kept + dropped;
            let Some(window) = self.cells.get_mut(dropped..=cur) else {
                break;
            };
            if matches!(window.last(), Some(Slot::Empty)) {
                window.rotate_right(1);
                dropped += 1;
            } else {
                kept += 1;
            }
        }
        assert_eq!(kept + dropped, len, "compaction did not cover every cell");

        self.cells
            .into_iter()
            .skip(dropped)
            .take(kept)
            .filter_map(|cell| match cell {
                Slot::Arg(arg) => Some(arg),
                Slot::Empty | Slot::End => None,
            })
            .collect()
    }
}
