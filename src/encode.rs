use crate::allocator::Allocator;
use crate::unit::Unit;
use crate::TextBuf;

/// A value that can be encoded into a buffer of `U` storage units.
///
/// `encoded_len` reports the number of units one copy of the value
/// occupies in the destination encoding; `encode_into` writes one copy
/// at the start of `dst` and returns the units written. The two must
/// agree: the buffer operations size their destination windows from
/// `encoded_len` before encoding.
pub trait Encode<U: Unit> {
    fn encoded_len(&self) -> usize;
    fn encode_into(&self, dst: &mut [U]) -> usize;
}

impl<U: Unit> Encode<U> for char {
    #[inline]
    fn encoded_len(&self) -> usize {
        U::char_len(*self)
    }

    #[inline]
    fn encode_into(&self, dst: &mut [U]) -> usize {
        U::encode_char(*self, dst)
    }
}

impl<U: Unit> Encode<U> for &str {
    #[inline]
    fn encoded_len(&self) -> usize {
        U::str_len(self)
    }

    #[inline]
    fn encode_into(&self, dst: &mut [U]) -> usize {
        U::encode_str(self, dst)
    }
}

impl<U: Unit> Encode<U> for &[U] {
    #[inline]
    fn encoded_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn encode_into(&self, dst: &mut [U]) -> usize {
        dst[..self.len()].copy_from_slice(self);
        self.len()
    }
}

// a single raw unit, stored as-is
macro_rules! impl_encode_raw_unit {
    ($($t:ty)+) => { $(
        impl Encode<$t> for $t {
            #[inline]
            fn encoded_len(&self) -> usize {
                1
            }

            #[inline]
            fn encode_into(&self, dst: &mut [$t]) -> usize {
                dst[0] = *self;
                1
            }
        }
    )+ }
}

impl_encode_raw_unit!(u8 u16 u32);

impl<U: Unit, A: Allocator> Encode<U> for &TextBuf<U, A> {
    #[inline]
    fn encoded_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn encode_into(&self, dst: &mut [U]) -> usize {
        dst[..self.len()].copy_from_slice(self.as_slice());
        self.len()
    }
}

/// Wraps an integer for decimal text encoding, e.g.
/// `buf.append(Dec(42), 1)` appends `"42"`.
///
/// A wrapper type rather than direct impls on the integers, because the
/// unit types `u8`/`u16`/`u32` already encode as raw units.
#[derive(Clone, Copy, Debug)]
pub struct Dec<T>(pub T);

fn dec_len(mut n: u128) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

fn encode_dec<U: Unit>(mut n: u128, negative: bool, dst: &mut [U]) -> usize {
    let len = negative as usize + dec_len(n);
    if negative {
        dst[0] = U::from_ascii(b'-');
    }
    let mut i = len;
    loop {
        i -= 1;
        dst[i] = U::from_ascii(b'0' + (n % 10) as u8);
        n /= 10;
        if n == 0 {
            break;
        }
    }
    len
}

macro_rules! impl_dec_unsigned {
    ($($t:ty)+) => { $(
        impl<U: Unit> Encode<U> for Dec<$t> {
            fn encoded_len(&self) -> usize {
                dec_len(self.0 as u128)
            }

            fn encode_into(&self, dst: &mut [U]) -> usize {
                encode_dec(self.0 as u128, false, dst)
            }
        }
    )+ }
}

macro_rules! impl_dec_signed {
    ($($t:ty)+) => { $(
        impl<U: Unit> Encode<U> for Dec<$t> {
            fn encoded_len(&self) -> usize {
                (self.0 < 0) as usize + dec_len(self.0.unsigned_abs() as u128)
            }

            fn encode_into(&self, dst: &mut [U]) -> usize {
                encode_dec(self.0.unsigned_abs() as u128, self.0 < 0, dst)
            }
        }
    )+ }
}

impl_dec_unsigned!(u8 u16 u32 u64 u128 usize);
impl_dec_signed!(i8 i16 i32 i64 i128 isize);
