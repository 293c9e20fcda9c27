//! textbuf, a mutable text buffer with inline small-string storage.
//!
//! A [`TextBuf`] behaves like a resizable sequence of storage units
//! (UTF-8, UTF-16 or UTF-32 code units, selected by the unit type
//! parameter). Short content is stored entirely within the value and
//! needs no heap allocation; longer content spills to a heap buffer
//! managed through a pluggable [`Allocator`].
//!
//! A TextBuf is three pointers plus its allocator in size. The three
//! pointer block is shared between two layouts:
//!
//! * Short form: byte 0 holds the length shifted left by one with the
//!   low bit set, and the unit data follows, starting at the unit's
//!   natural alignment. The inline capacity is fixed by the block size.
//! * Long form: a capacity field, a length field, and a pointer to a
//!   heap buffer of capacity units.
//!
//! Byte 0 of the block is the sole discriminant between the two forms.
//! The long form's capacity is kept even, so its low byte always has
//! bit 0 clear, while a short form's byte 0 always has bit 0 set. This
//! trick requires a little-endian target; big-endian targets are
//! rejected at compile time.
//!
//! Every content-changing operation is built on three primitives:
//! [`expand`](TextBuf::expand) opens a window at the tail,
//! [`expand_at`](TextBuf::expand_at) opens a window mid-buffer by
//! shifting the tail right, and [`reduce_at`](TextBuf::reduce_at)
//! closes a gap by shifting the tail left. Capacity grows by at least
//! a factor of two, so repeated appends are amortized O(1) per unit.
//!
//! Values to be written are anything implementing [`Encode`] for the
//! buffer's unit type: characters and string slices (transcoded), raw
//! unit slices, other buffers, and decimal integers through [`Dec`].

#![no_std]

#[cfg(target_endian = "big")]
compile_error!("textbuf relies on a little-endian layout for its discriminant byte");

extern crate alloc;

mod allocator;
mod buf;
mod encode;
mod fromiter;
mod raw;
mod unit;

pub use crate::allocator::{Allocator, Counting, Global};
pub use crate::buf::{TextBuf, TextBuf16, TextBuf32, TextBuf8};
pub use crate::encode::{Dec, Encode};
pub use crate::unit::Unit;
