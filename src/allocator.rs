use core::alloc::Layout;
use core::cell::Cell;
use core::ptr;

use alloc::alloc as heap;

/// The allocator contract consumed by [`TextBuf`](crate::TextBuf).
///
/// `reallocate` is an optional capability: the default implementation
/// reports `None`, which routes growth through the allocate-copy-free
/// fallback. An allocator that does support resizing returns
/// `Some(new_ptr)` (the buffer may move, as with C `realloc`) or
/// `Some(null)` if the resize itself failed.
pub trait Allocator {
    /// Allocate `layout.size()` bytes. Returns null on failure.
    fn allocate(&self, layout: Layout) -> *mut u8;

    /// Free a buffer previously obtained from this allocator.
    ///
    /// # Safety
    /// `ptr` and `layout` must match an earlier `allocate`/`reallocate`.
    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) -> bool;

    /// Resize a buffer in place or by moving it.
    ///
    /// # Safety
    /// `ptr` and `layout` must match an earlier `allocate`/`reallocate`.
    unsafe fn reallocate(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> Option<*mut u8> {
        let _ = (ptr, layout, new_size);
        None
    }
}

/// Zero-sized marker routed to the process-wide default allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> *mut u8 {
        unsafe { heap::alloc(layout) }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) -> bool {
        unsafe { heap::dealloc(ptr, layout) };
        true
    }

    #[inline]
    unsafe fn reallocate(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> Option<*mut u8> {
        Some(unsafe { heap::realloc(ptr, layout, new_size) })
    }
}

/// A value-carrying allocator that wraps another allocator and counts
/// its operations. Useful for measuring how many allocator calls a
/// sequence of buffer operations performs.
///
/// `set_resizable(false)` hides the inner allocator's `reallocate`, so
/// every growth takes the allocate-copy-free fallback path.
#[derive(Debug)]
pub struct Counting<A: Allocator> {
    inner: A,
    allocs: Cell<usize>,
    deallocs: Cell<usize>,
    reallocs: Cell<usize>,
    resizable: Cell<bool>,
}

impl<A: Allocator> Counting<A> {
    pub fn new(inner: A) -> Self {
        Counting {
            inner,
            allocs: Cell::new(0),
            deallocs: Cell::new(0),
            reallocs: Cell::new(0),
            resizable: Cell::new(true),
        }
    }

    /// Number of `allocate` calls so far.
    pub fn allocs(&self) -> usize {
        self.allocs.get()
    }

    /// Number of `deallocate` calls so far.
    pub fn deallocs(&self) -> usize {
        self.deallocs.get()
    }

    /// Number of `reallocate` calls forwarded to the inner allocator.
    pub fn reallocs(&self) -> usize {
        self.reallocs.get()
    }

    /// When set to false, `reallocate` reports no resize support.
    pub fn set_resizable(&self, resizable: bool) {
        self.resizable.set(resizable);
    }
}

impl<A: Allocator + Default> Default for Counting<A> {
    fn default() -> Self {
        Counting::new(A::default())
    }
}

impl<A: Allocator> Allocator for Counting<A> {
    fn allocate(&self, layout: Layout) -> *mut u8 {
        self.allocs.set(self.allocs.get() + 1);
        self.inner.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) -> bool {
        self.deallocs.set(self.deallocs.get() + 1);
        unsafe { self.inner.deallocate(ptr, layout) }
    }

    unsafe fn reallocate(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> Option<*mut u8> {
        if !self.resizable.get() {
            return None;
        }
        match unsafe { self.inner.reallocate(ptr, layout, new_size) } {
            Some(p) => {
                self.reallocs.set(self.reallocs.get() + 1);
                Some(p)
            }
            None => None,
        }
    }
}

// ---------------------------------------------------------------------------
// buffer-level adapter used by the capacity manager

#[inline]
pub(crate) fn unit_layout<U>(cap: usize) -> Layout {
    match Layout::array::<U>(cap) {
        Ok(layout) => layout,
        Err(_) => capacity_overflow(),
    }
}

#[cold]
pub(crate) fn capacity_overflow() -> ! {
    panic!("textbuf: capacity overflow");
}

#[cold]
fn allocation_failed(bytes: usize) -> ! {
    panic!("textbuf: allocation of {} bytes failed", bytes);
}

/// Allocate a buffer of `cap` units. The whole buffer is zero-filled so
/// that units beyond the logical length are always initialized.
pub(crate) fn acquire<U, A: Allocator>(alloc: &A, cap: usize) -> *mut U {
    let layout = unit_layout::<U>(cap);
    let p = alloc.allocate(layout);
    if p.is_null() {
        allocation_failed(layout.size());
    }
    unsafe { ptr::write_bytes(p, 0, layout.size()) };
    p as *mut U
}

pub(crate) unsafe fn release<U, A: Allocator>(alloc: &A, ptr: *mut U, cap: usize) {
    let ok = unsafe { alloc.deallocate(ptr as *mut u8, unit_layout::<U>(cap)) };
    debug_assert!(ok);
}

/// Grow a buffer from `old_cap` to `new_cap` units, preserving the first
/// `len` units. Resizes through the allocator when it supports that,
/// otherwise allocates a new buffer, copies, and frees the old one.
pub(crate) unsafe fn grow<U, A: Allocator>(
    alloc: &A,
    ptr: *mut U,
    old_cap: usize,
    len: usize,
    new_cap: usize,
) -> *mut U {
    let old_layout = unit_layout::<U>(old_cap);
    let new_layout = unit_layout::<U>(new_cap);
    match unsafe { alloc.reallocate(ptr as *mut u8, old_layout, new_layout.size()) } {
        Some(p) => {
            if p.is_null() {
                allocation_failed(new_layout.size());
            }
            let p = p as *mut U;
            // realloc does not zero the extension
            unsafe { ptr::write_bytes(p.add(len), 0, new_cap - len) };
            p
        }
        None => {
            let p = acquire::<U, A>(alloc, new_cap);
            unsafe {
                ptr::copy_nonoverlapping(ptr, p, len);
                release(alloc, ptr, old_cap);
            }
            p
        }
    }
}

/// Best-effort in-place shrink. `None` leaves the buffer untouched.
pub(crate) unsafe fn shrink<U, A: Allocator>(
    alloc: &A,
    ptr: *mut U,
    old_cap: usize,
    new_cap: usize,
) -> Option<*mut U> {
    let old_layout = unit_layout::<U>(old_cap);
    match unsafe { alloc.reallocate(ptr as *mut u8, old_layout, unit_layout::<U>(new_cap).size()) } {
        Some(p) if !p.is_null() => Some(p as *mut U),
        _ => None,
    }
}
