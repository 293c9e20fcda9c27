use core::borrow::Borrow;
use core::cmp::{max, min};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem;
use core::mem::size_of;
use core::ops::{Add, AddAssign, Deref, DerefMut};
use core::ptr;
use core::slice;

use alloc::vec::Vec;

use crate::allocator;
use crate::allocator::{capacity_overflow, Allocator, Global};
use crate::encode::Encode;
use crate::raw::{Block, RawLong};
use crate::unit::Unit;

/// A mutable text buffer with inline small-string storage.
///
/// The buffer is a resizable sequence of storage units (`u8`, `u16` or
/// `u32` code units). Content up to [`MIN_CAPACITY`](Self::MIN_CAPACITY)
/// units lives inline in the value itself; longer content spills to a
/// heap buffer obtained from the allocator `A`.
///
/// All positions and counts are in storage units, not code points.
/// Unit-level mutation can split an encoded sequence; the buffer does
/// not enforce encoding validity, only the code-point-aware helpers
/// ([`pop`](Self::pop), [`last_char`](Self::last_char),
/// [`first_char`](Self::first_char)) care, and they report `None` on an
/// invalid boundary.
#[repr(C)]
pub struct TextBuf<U: Unit, A: Allocator = Global> {
    block: Block,
    alloc: A,
    marker: PhantomData<U>,
}

unsafe impl<U: Unit, A: Allocator + Send> Send for TextBuf<U, A> {}
unsafe impl<U: Unit, A: Allocator + Sync> Sync for TextBuf<U, A> {}

/// UTF-8 text buffer.
pub type TextBuf8 = TextBuf<u8>;
/// UTF-16 text buffer.
pub type TextBuf16 = TextBuf<u16>;
/// UTF-32 text buffer.
pub type TextBuf32 = TextBuf<u32>;

impl<U: Unit> TextBuf<U, Global> {
    /// Creates a new empty buffer. This will not allocate.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty buffer that can hold `cap` units without
    /// reallocating.
    pub fn with_capacity(cap: usize) -> Self {
        Self::with_capacity_in(cap, Global)
    }

    /// Creates a buffer holding a copy of `s`. This will allocate if
    /// the content does not fit the short form.
    pub fn from_slice(s: &[U]) -> Self {
        Self::from_slice_in(s, Global)
    }

    /// Converts the buffer into a `Vec`, reusing the heap buffer when
    /// there is one.
    pub fn into_vec(self) -> Vec<U> {
        unsafe {
            if self.is_short() {
                self.as_slice().to_vec()
            } else {
                let RawLong { cap, len, ptr } = *self.long();
                mem::forget(self);
                Vec::from_raw_parts(ptr, len, cap)
            }
        }
    }
}

impl<U: Unit, A: Allocator> TextBuf<U, A> {
    /// Inline capacity of the short form, in storage units.
    pub const MIN_CAPACITY: usize = size_of::<RawLong<U>>() / size_of::<U>() - 1;

    /// Largest representable capacity, in storage units.
    pub const MAX_CAPACITY: usize = (isize::MAX as usize / size_of::<U>()) & !1;

    const LAYOUT_OK: () = {
        assert!(size_of::<U>() <= size_of::<usize>());
        assert!(mem::align_of::<U>() <= mem::align_of::<usize>());
        assert!(size_of::<RawLong<U>>() % size_of::<U>() == 0);
        // the short length must fit the 7 bits above the discriminant
        assert!(size_of::<RawLong<U>>() / size_of::<U>() - 1 < 0x80);
    };

    /// Creates a new empty buffer using `alloc`. This will not allocate.
    pub const fn new_in(alloc: A) -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::LAYOUT_OK;
        TextBuf {
            block: Block::EMPTY_SHORT,
            alloc,
            marker: PhantomData,
        }
    }

    /// Creates an empty buffer using `alloc` that can hold `cap` units
    /// without reallocating.
    pub fn with_capacity_in(cap: usize, alloc: A) -> Self {
        let mut buf = Self::new_in(alloc);
        if cap > Self::MIN_CAPACITY {
            if cap > Self::MAX_CAPACITY {
                capacity_overflow();
            }
            buf.grow_exact((cap + 1) & !1);
        }
        buf
    }

    /// Creates a buffer holding a copy of `s`, using `alloc`.
    pub fn from_slice_in(s: &[U], alloc: A) -> Self {
        let mut buf = Self::with_capacity_in(s.len(), alloc);
        buf.expand(s.len()).copy_from_slice(s);
        buf
    }

    #[inline]
    pub(crate) unsafe fn long(&self) -> &RawLong<U> {
        unsafe { &*(self as *const Self as *const RawLong<U>) }
    }

    #[inline]
    pub(crate) unsafe fn long_mut(&mut self) -> &mut RawLong<U> {
        unsafe { &mut *(self as *mut Self as *mut RawLong<U>) }
    }

    #[inline]
    fn tag(&self) -> u8 {
        self.block.0[0] as u8
    }

    #[inline]
    fn short_ptr(&self) -> *const U {
        unsafe { (self as *const Self as *const u8).add(size_of::<U>()) as *const U }
    }

    #[inline]
    fn short_mut_ptr(&mut self) -> *mut U {
        unsafe { (self as *mut Self as *mut u8).add(size_of::<U>()) as *mut U }
    }

    #[inline]
    fn set_short_len(&mut self, len: usize) {
        unsafe { *(self as *mut Self as *mut u8) = ((len as u8) << 1) | 1 };
    }

    /// Reports whether the content is stored inline.
    #[inline]
    pub fn is_short(&self) -> bool {
        self.tag() & 1 != 0
    }

    /// Length of the content, in storage units.
    #[inline]
    pub fn len(&self) -> usize {
        if self.is_short() {
            (self.tag() >> 1) as usize
        } else {
            unsafe { self.long().len }
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity of the current storage, in storage units.
    /// Constant [`MIN_CAPACITY`](Self::MIN_CAPACITY) while short.
    #[inline]
    pub fn capacity(&self) -> usize {
        if self.is_short() {
            Self::MIN_CAPACITY
        } else {
            unsafe { self.long().cap }
        }
    }

    #[inline]
    pub fn as_ptr(&self) -> *const U {
        if self.is_short() {
            self.short_ptr()
        } else {
            unsafe { self.long().ptr }
        }
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut U {
        if self.is_short() {
            self.short_mut_ptr()
        } else {
            unsafe { self.long().ptr }
        }
    }

    /// The used storage, length [`len`](Self::len).
    #[inline]
    pub fn as_slice(&self) -> &[U] {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len()) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [U] {
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len()) }
    }

    /// The full backing storage, length [`capacity`](Self::capacity).
    /// Units past `len()` are zero-filled on allocation but may hold
    /// stale content after removals.
    pub fn all_storage(&self) -> &[U] {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.capacity()) }
    }

    /// Sets the stored length without touching the content.
    ///
    /// # Safety
    /// `len` must not exceed `capacity()`.
    pub unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.capacity());
        if self.is_short() {
            self.set_short_len(len);
        } else {
            unsafe { self.long_mut().len = len };
        }
    }

    /// A reference to the allocator the buffer was built with.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    // ------------------------------------------------------------------
    // capacity manager

    /// Ensures capacity for at least `mincap` units, growing by at
    /// least a factor of two, and returns the resulting capacity.
    /// The first growth past the inline capacity flips the buffer to
    /// the long form; content and logical offsets are preserved.
    pub fn reserve(&mut self, mincap: usize) -> usize {
        let cap = self.capacity();
        if mincap <= cap {
            return cap;
        }
        if mincap > Self::MAX_CAPACITY {
            capacity_overflow();
        }
        // +1 so that rounding down to even never lands below mincap
        let mut new_cap = max(cap * 2, mincap + 1) & !1;
        if new_cap > Self::MAX_CAPACITY {
            new_cap = Self::MAX_CAPACITY;
        }
        self.grow_exact(new_cap);
        new_cap
    }

    // grow to an exact even capacity, promoting to long form if needed
    fn grow_exact(&mut self, new_cap: usize) {
        debug_assert!(new_cap & 1 == 0);
        debug_assert!(new_cap > self.capacity());
        unsafe {
            if self.is_short() {
                let len = self.len();
                let ptr = allocator::acquire::<U, A>(&self.alloc, new_cap);
                ptr::copy_nonoverlapping(self.short_ptr(), ptr, len);
                *self.long_mut() = RawLong { cap: new_cap, len, ptr };
            } else {
                let RawLong { cap, len, ptr } = *self.long();
                let ptr = allocator::grow(&self.alloc, ptr, cap, len, new_cap);
                *self.long_mut() = RawLong { cap: new_cap, len, ptr };
            }
        }
    }

    /// Reduces the capacity as far as the content and the allocator
    /// allow, and returns the resulting capacity. Content that fits
    /// inline flips the buffer back to the short form; otherwise the
    /// shrink is best-effort and may leave the capacity unchanged.
    pub fn shrink_to_fit(&mut self) -> usize {
        if self.is_short() {
            return Self::MIN_CAPACITY;
        }
        let RawLong { cap, len, ptr } = unsafe { *self.long() };
        if len == cap {
            return cap;
        }
        if len <= Self::MIN_CAPACITY {
            unsafe {
                self.set_short_len(len);
                ptr::copy_nonoverlapping(ptr, self.short_mut_ptr(), len);
                allocator::release(&self.alloc, ptr, cap);
            }
            return Self::MIN_CAPACITY;
        }
        let new_cap = (len + 1) & !1;
        if new_cap == cap {
            return cap;
        }
        unsafe {
            if let Some(ptr) = allocator::shrink(&self.alloc, ptr, cap, new_cap) {
                *self.long_mut() = RawLong { cap: new_cap, len, ptr };
                return new_cap;
            }
        }
        cap
    }

    // ------------------------------------------------------------------
    // mutation engine

    #[inline]
    fn room_for(&mut self, len: usize, extra: usize) {
        match len.checked_add(extra) {
            Some(need) => {
                self.reserve(need);
            }
            None => capacity_overflow(),
        }
    }

    /// Opens a zero-filled window of `n` units at the tail and returns
    /// it. The length grows by `n`.
    pub fn expand(&mut self, n: usize) -> &mut [U] {
        let len = self.len();
        self.room_for(len, n);
        unsafe {
            let p = self.as_mut_ptr().add(len);
            ptr::write_bytes(p, 0, n);
            self.set_len(len + n);
            slice::from_raw_parts_mut(p, n)
        }
    }

    /// Opens a zero-filled window of `n` units at `pos`, shifting
    /// `[pos, len)` right by `n`. `pos` at or past the end behaves as
    /// [`expand`](Self::expand).
    pub fn expand_at(&mut self, pos: usize, n: usize) -> &mut [U] {
        let len = self.len();
        if pos >= len {
            return self.expand(n);
        }
        self.room_for(len, n);
        unsafe {
            let p = self.as_mut_ptr();
            ptr::copy(p.add(pos), p.add(pos + n), len - pos);
            let window = p.add(pos);
            ptr::write_bytes(window, 0, n);
            self.set_len(len + n);
            slice::from_raw_parts_mut(window, n)
        }
    }

    /// Removes the `n` units immediately preceding `pos`, shifting
    /// `[pos, len)` left onto them. The length shrinks by `n`.
    ///
    /// Expects `0 < n <= pos <= len()`; debug builds assert this,
    /// release builds clamp.
    pub fn reduce_at(&mut self, pos: usize, n: usize) {
        let len = self.len();
        debug_assert!(n > 0);
        debug_assert!(n <= pos && pos <= len);
        let pos = min(pos, len);
        let n = min(n, pos);
        if n == 0 {
            return;
        }
        unsafe {
            let p = self.as_mut_ptr();
            ptr::copy(p.add(pos), p.add(pos - n), len - pos);
            self.set_len(len - n);
        }
    }

    // ------------------------------------------------------------------
    // assembled operations

    /// Appends `count` copies of `value`, returning the units written.
    pub fn append<E: Encode<U>>(&mut self, value: E, count: usize) -> usize {
        let total = match value.encoded_len().checked_mul(count) {
            Some(total) => total,
            None => capacity_overflow(),
        };
        if total == 0 {
            return 0;
        }
        let window = self.expand(total);
        encode_repeat(window, &value, count);
        total
    }

    /// Appends one copy of `value`, returning the units written.
    #[inline]
    pub fn push<E: Encode<U>>(&mut self, value: E) -> usize {
        self.append(value, 1)
    }

    /// Inserts `count` copies of `value` before the unit at `pos`,
    /// returning the units written. Positions past the end behave as
    /// append.
    pub fn insert<E: Encode<U>>(&mut self, pos: usize, value: E, count: usize) -> usize {
        let total = match value.encoded_len().checked_mul(count) {
            Some(total) => total,
            None => capacity_overflow(),
        };
        if total == 0 {
            return 0;
        }
        let window = self.expand_at(pos, total);
        encode_repeat(window, &value, count);
        total
    }

    /// Removes up to `n` units starting at `pos`. Out-of-range spans
    /// are clamped; removing the tail degenerates to a truncation.
    pub fn erase(&mut self, pos: usize, n: usize) {
        let len = self.len();
        if pos >= len || n == 0 {
            return;
        }
        let n = min(n, len - pos);
        if pos + n == len {
            unsafe { self.set_len(pos) };
        } else {
            self.reduce_at(pos + n, n);
        }
    }

    /// Replaces the (clamped) span of `span` units at `pos` with
    /// `count` copies of `value`, returning the units written. Performs
    /// at most one block move regardless of the size difference.
    pub fn replace<E: Encode<U>>(
        &mut self,
        pos: usize,
        span: usize,
        value: E,
        count: usize,
    ) -> usize {
        if count == 0 {
            return 0;
        }
        let len = self.len();
        let begin = min(pos, len);
        let end = min(pos.saturating_add(span), len);
        let span = end - begin;
        let total = match value.encoded_len().checked_mul(count) {
            Some(total) => total,
            None => capacity_overflow(),
        };
        if span == 0 {
            let window = self.expand_at(begin, total);
            encode_repeat(window, &value, count);
        } else if total == span {
            encode_repeat(&mut self.as_mut_slice()[begin..end], &value, count);
        } else if total < span {
            encode_repeat(&mut self.as_mut_slice()[begin..begin + total], &value, count);
            self.reduce_at(end, span - total);
        } else {
            self.expand_at(end, total - span);
            encode_repeat(&mut self.as_mut_slice()[begin..begin + total], &value, count);
        }
        total
    }

    /// Resizes to `new_len` units, filling any extension with `fill`.
    pub fn resize(&mut self, new_len: usize, fill: U) {
        let len = self.len();
        if new_len <= len {
            unsafe { self.set_len(new_len) };
        } else {
            self.expand(new_len - len).fill(fill);
        }
    }

    /// Shortens the buffer to `len` units. No-op when already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            unsafe { self.set_len(len) };
        }
    }

    /// Clears the content, retaining the capacity.
    pub fn clear(&mut self) {
        unsafe { self.set_len(0) };
    }

    /// Removes and returns the last code point, or `None` when the
    /// buffer is empty or does not end on a valid code point.
    pub fn pop(&mut self) -> Option<char> {
        let (c, n) = U::decode_last(self.as_slice())?;
        let len = self.len();
        unsafe { self.set_len(len - n) };
        Some(c)
    }

    /// The last code point, or `None` on an empty or invalid tail.
    pub fn last_char(&self) -> Option<char> {
        U::decode_last(self.as_slice()).map(|(c, _)| c)
    }

    /// The first code point, or `None` on an empty or invalid head.
    pub fn first_char(&self) -> Option<char> {
        U::decode_first(self.as_slice()).map(|(c, _)| c)
    }

    /// Takes the content out of the buffer, leaving it empty and short.
    /// The heap buffer, if any, moves to the returned value.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let alloc = self.alloc.clone();
        mem::replace(self, Self::new_in(alloc))
    }
}

#[inline]
fn encode_repeat<U: Unit, E: Encode<U>>(dst: &mut [U], value: &E, count: usize) -> usize {
    let mut written = 0;
    for _ in 0..count {
        written += value.encode_into(&mut dst[written..]);
    }
    debug_assert_eq!(written, dst.len());
    written
}

impl<U: Unit, A: Allocator> Drop for TextBuf<U, A> {
    fn drop(&mut self) {
        if self.is_short() {
            return;
        }
        unsafe {
            let RawLong { cap, ptr, .. } = *self.long();
            allocator::release(&self.alloc, ptr, cap);
        }
    }
}

impl<U: Unit, A: Allocator + Clone> Clone for TextBuf<U, A> {
    fn clone(&self) -> Self {
        Self::from_slice_in(self.as_slice(), self.alloc.clone())
    }
}

impl<U: Unit, A: Allocator + Default> Default for TextBuf<U, A> {
    #[inline]
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<U: Unit, A: Allocator> Deref for TextBuf<U, A> {
    type Target = [U];

    #[inline]
    fn deref(&self) -> &[U] {
        self.as_slice()
    }
}

impl<U: Unit, A: Allocator> DerefMut for TextBuf<U, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [U] {
        self.as_mut_slice()
    }
}

impl<U: Unit, A: Allocator, B: Allocator> PartialEq<TextBuf<U, B>> for TextBuf<U, A> {
    fn eq(&self, other: &TextBuf<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}
impl<U: Unit, A: Allocator> Eq for TextBuf<U, A> {}

impl<U: Unit, A: Allocator> PartialEq<&[U]> for TextBuf<U, A> {
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<U: Unit, A: Allocator> PartialEq<TextBuf<U, A>> for &[U] {
    fn eq(&self, other: &TextBuf<U, A>) -> bool {
        *self == other.as_slice()
    }
}

impl<U: Unit, A: Allocator, const N: usize> PartialEq<&[U; N]> for TextBuf<U, A> {
    fn eq(&self, other: &&[U; N]) -> bool {
        self.as_slice() == *other
    }
}

impl<U: Unit, A: Allocator, const N: usize> PartialEq<TextBuf<U, A>> for &[U; N] {
    fn eq(&self, other: &TextBuf<U, A>) -> bool {
        *self == other.as_slice()
    }
}

impl<U: Unit, A: Allocator> PartialOrd for TextBuf<U, A> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<U: Unit, A: Allocator> Ord for TextBuf<U, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<U: Unit, A: Allocator> Hash for TextBuf<U, A> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<U: Unit, A: Allocator> Borrow<[U]> for TextBuf<U, A> {
    #[inline]
    fn borrow(&self) -> &[U] {
        self.as_slice()
    }
}

impl<U: Unit, A: Allocator, T> AsRef<T> for TextBuf<U, A>
where
    [U]: AsRef<T>,
    T: ?Sized,
{
    fn as_ref(&self) -> &T {
        self.as_slice().as_ref()
    }
}

impl<U: Unit, A: Allocator, T> AsMut<T> for TextBuf<U, A>
where
    [U]: AsMut<T>,
    T: ?Sized,
{
    fn as_mut(&mut self) -> &mut T {
        self.as_mut_slice().as_mut()
    }
}

impl<U: Unit> From<&[U]> for TextBuf<U, Global> {
    #[inline]
    fn from(s: &[U]) -> Self {
        Self::from_slice(s)
    }
}

impl<U: Unit, const N: usize> From<&[U; N]> for TextBuf<U, Global> {
    #[inline]
    fn from(s: &[U; N]) -> Self {
        Self::from_slice(s)
    }
}

impl<U: Unit> From<&str> for TextBuf<U, Global> {
    fn from(s: &str) -> Self {
        let mut buf = Self::with_capacity(U::str_len(s));
        buf.push(s);
        buf
    }
}

impl<U: Unit> From<char> for TextBuf<U, Global> {
    fn from(c: char) -> Self {
        let mut buf = Self::new();
        buf.push(c);
        buf
    }
}

impl<U: Unit, A: Allocator + Clone> From<&TextBuf<U, A>> for TextBuf<U, A> {
    #[inline]
    fn from(s: &TextBuf<U, A>) -> Self {
        s.clone()
    }
}

impl<U: Unit, A: Allocator> Add<&str> for TextBuf<U, A> {
    type Output = Self;

    fn add(mut self, rhs: &str) -> Self {
        self += rhs;
        self
    }
}

impl<U: Unit, A: Allocator> AddAssign<&str> for TextBuf<U, A> {
    fn add_assign(&mut self, other: &str) {
        self.push(other);
    }
}

impl<U: Unit, A: Allocator> Add<&[U]> for TextBuf<U, A> {
    type Output = Self;

    fn add(mut self, rhs: &[U]) -> Self {
        self += rhs;
        self
    }
}

impl<U: Unit, A: Allocator> AddAssign<&[U]> for TextBuf<U, A> {
    fn add_assign(&mut self, other: &[U]) {
        self.push(other);
    }
}

impl<U: Unit, A: Allocator> fmt::Write for TextBuf<U, A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.push(c);
        Ok(())
    }
}

impl<U: Unit, A: Allocator> fmt::Display for TextBuf<U, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        let mut s = self.as_slice();
        while !s.is_empty() {
            match U::decode_first(s) {
                Some((c, n)) => {
                    f.write_char(c)?;
                    s = &s[n..];
                }
                None => {
                    f.write_char('\u{fffd}')?;
                    s = &s[1..];
                }
            }
        }
        Ok(())
    }
}

impl<U: Unit, A: Allocator> fmt::Debug for TextBuf<U, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        f.write_char('"')?;
        let mut s = self.as_slice();
        while !s.is_empty() {
            match U::decode_first(s) {
                Some((c, n)) => {
                    for e in c.escape_debug() {
                        f.write_char(e)?;
                    }
                    s = &s[n..];
                }
                None => {
                    f.write_char('\u{fffd}')?;
                    s = &s[1..];
                }
            }
        }
        f.write_char('"')
    }
}

/// Convenience macro to create a [`TextBuf`].
///
/// `tbuf!()` is an empty buffer, `tbuf!(v)` converts from anything the
/// buffer has a `From` impl for (string slices transcode into the
/// inferred unit type), and `tbuf!(v; n)` appends `n` copies of an
/// encodable value to an empty buffer.
#[macro_export]
macro_rules! tbuf {
    () => {
        $crate::TextBuf::new()
    };
    ($v:expr; $n:expr) => {{
        let mut buf = $crate::TextBuf::new();
        buf.append($v, $n);
        buf
    }};
    ($v:expr) => {
        $crate::TextBuf::from($v)
    };
}
