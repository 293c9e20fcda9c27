use core::mem::size_of;

//block layout, little endian
//byte 0 is overloaded: in short form it holds (len << 1) | 1,
//in long form it is the low byte of cap, which is kept even.

/// The long (heap) layout. `cap` and `len` are in storage units;
/// `cap` is always even so that bit 0 of the block's first byte
/// stays clear and can serve as the short/long discriminant.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct RawLong<U> {
    pub(crate) cap: usize,
    pub(crate) len: usize,
    pub(crate) ptr: *mut U,
}

pub(crate) const BLOCK_WORDS: usize = 3;

/// The fixed-size block every buffer value occupies, reinterpreted as
/// `RawLong` or as the short form depending on the discriminant bit.
/// In short form, unit data starts at byte offset `size_of::<U>()` so
/// the units stay naturally aligned.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct Block(pub(crate) [usize; BLOCK_WORDS]);

impl Block {
    //tag byte (0 << 1) | 1, everything else zero
    pub(crate) const EMPTY_SHORT: Block = Block([1, 0, 0]);
}

const _: () = {
    assert!(size_of::<RawLong<u8>>() == BLOCK_WORDS * size_of::<usize>());
    assert!(size_of::<Block>() == size_of::<RawLong<u8>>());
    assert!(size_of::<RawLong<u32>>() == size_of::<RawLong<u8>>());
};

#[test]
fn test_tag_transmutation() {
    // the tag byte must overlay the low byte of the long form's cap field
    let b = Block([0x85, 7, 9]);
    let long = unsafe { &*(&b as *const Block as *const RawLong<u8>) };
    assert_eq!(long.cap & 0xff, 0x85);
    assert_eq!(long.len, 7);
}
