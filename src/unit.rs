use core::str;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// A storage unit: the fixed-width element the buffer is measured in.
///
/// Implemented for `u8` (UTF-8 code units), `u16` (UTF-16 code units)
/// and `u32` (UTF-32 / code points). The trait is sealed because the
/// block layout assumes the unit's size and alignment divide a machine
/// word.
///
/// The decode methods report `None` when the units at the relevant end
/// of the slice do not form a valid code point, which can happen after
/// unit-level mutation split an encoded sequence.
pub trait Unit:
    sealed::Sealed + Copy + Default + Eq + Ord + core::hash::Hash + core::fmt::Debug + 'static
{
    /// Encoded length of `c`, in units.
    fn char_len(c: char) -> usize;

    /// Encode `c` at the start of `dst`, returning the units written.
    /// `dst` must hold at least `char_len(c)` units.
    fn encode_char(c: char, dst: &mut [Self]) -> usize;

    /// Encoded length of `s`, in units.
    fn str_len(s: &str) -> usize;

    /// Transcode `s` into the start of `dst`, returning the units written.
    /// `dst` must hold at least `str_len(s)` units.
    fn encode_str(s: &str, dst: &mut [Self]) -> usize;

    /// Decode the first code point of `s` and its width in units.
    fn decode_first(s: &[Self]) -> Option<(char, usize)>;

    /// Decode the last code point of `s` and its width in units.
    fn decode_last(s: &[Self]) -> Option<(char, usize)>;

    /// Lift an ASCII byte into a unit. Used by the integer encoders.
    fn from_ascii(b: u8) -> Self;
}

impl Unit for u8 {
    #[inline]
    fn char_len(c: char) -> usize {
        c.len_utf8()
    }

    #[inline]
    fn encode_char(c: char, dst: &mut [Self]) -> usize {
        c.encode_utf8(dst).len()
    }

    #[inline]
    fn str_len(s: &str) -> usize {
        s.len()
    }

    #[inline]
    fn encode_str(s: &str, dst: &mut [Self]) -> usize {
        dst[..s.len()].copy_from_slice(s.as_bytes());
        s.len()
    }

    fn decode_first(s: &[Self]) -> Option<(char, usize)> {
        let width = match *s.first()? {
            b if b < 0x80 => 1,
            b if b >= 0xc0 && b < 0xe0 => 2,
            b if b >= 0xe0 && b < 0xf0 => 3,
            b if b >= 0xf0 && b < 0xf8 => 4,
            _ => return None, //continuation or invalid lead byte
        };
        if s.len() < width {
            return None;
        }
        let c = str::from_utf8(&s[..width]).ok()?.chars().next()?;
        Some((c, width))
    }

    fn decode_last(s: &[Self]) -> Option<(char, usize)> {
        let mut start = s.len().checked_sub(1)?;
        // walk back over at most three continuation bytes
        while s[start] & 0xc0 == 0x80 {
            if start == 0 || s.len() - start >= 4 {
                return None;
            }
            start -= 1;
        }
        let tail = str::from_utf8(&s[start..]).ok()?;
        let mut chars = tail.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None; //lead byte promised fewer units than present
        }
        Some((c, s.len() - start))
    }

    #[inline]
    fn from_ascii(b: u8) -> Self {
        b
    }
}

const HIGH_SURROGATE: core::ops::Range<u32> = 0xd800..0xdc00;
const LOW_SURROGATE: core::ops::Range<u32> = 0xdc00..0xe000;

impl Unit for u16 {
    #[inline]
    fn char_len(c: char) -> usize {
        c.len_utf16()
    }

    #[inline]
    fn encode_char(c: char, dst: &mut [Self]) -> usize {
        c.encode_utf16(dst).len()
    }

    fn str_len(s: &str) -> usize {
        s.chars().map(char::len_utf16).sum()
    }

    fn encode_str(s: &str, dst: &mut [Self]) -> usize {
        let mut written = 0;
        for c in s.chars() {
            written += c.encode_utf16(&mut dst[written..]).len();
        }
        written
    }

    fn decode_first(s: &[Self]) -> Option<(char, usize)> {
        let u = *s.first()? as u32;
        if HIGH_SURROGATE.contains(&u) {
            let lo = *s.get(1)? as u32;
            if !LOW_SURROGATE.contains(&lo) {
                return None;
            }
            let c = 0x10000 + ((u - 0xd800) << 10) + (lo - 0xdc00);
            Some((char::from_u32(c)?, 2))
        } else {
            Some((char::from_u32(u)?, 1))
        }
    }

    fn decode_last(s: &[Self]) -> Option<(char, usize)> {
        let u = *s.last()? as u32;
        if LOW_SURROGATE.contains(&u) {
            if s.len() < 2 {
                return None;
            }
            let hi = s[s.len() - 2] as u32;
            if !HIGH_SURROGATE.contains(&hi) {
                return None;
            }
            let c = 0x10000 + ((hi - 0xd800) << 10) + (u - 0xdc00);
            Some((char::from_u32(c)?, 2))
        } else {
            Some((char::from_u32(u)?, 1))
        }
    }

    #[inline]
    fn from_ascii(b: u8) -> Self {
        b as u16
    }
}

impl Unit for u32 {
    #[inline]
    fn char_len(_c: char) -> usize {
        1
    }

    #[inline]
    fn encode_char(c: char, dst: &mut [Self]) -> usize {
        dst[0] = c as u32;
        1
    }

    fn str_len(s: &str) -> usize {
        s.chars().count()
    }

    fn encode_str(s: &str, dst: &mut [Self]) -> usize {
        let mut written = 0;
        for c in s.chars() {
            dst[written] = c as u32;
            written += 1;
        }
        written
    }

    fn decode_first(s: &[Self]) -> Option<(char, usize)> {
        Some((char::from_u32(*s.first()?)?, 1))
    }

    fn decode_last(s: &[Self]) -> Option<(char, usize)> {
        Some((char::from_u32(*s.last()?)?, 1))
    }

    #[inline]
    fn from_ascii(b: u8) -> Self {
        b as u32
    }
}

#[test]
fn test_decode_last_utf8() {
    assert_eq!(u8::decode_last("aé".as_bytes()), Some(('é', 2)));
    assert_eq!(u8::decode_last("a🦀".as_bytes()), Some(('🦀', 4)));
    // a dangling continuation byte is not a code point
    assert_eq!(u8::decode_last(&[b'a', 0xa9]), None);
    assert_eq!(u8::decode_last(b""), None);
}

#[test]
fn test_decode_utf16_surrogates() {
    let mut units = [0u16; 2];
    let n = u16::encode_char('🦀', &mut units);
    assert_eq!(n, 2);
    assert_eq!(u16::decode_first(&units), Some(('🦀', 2)));
    assert_eq!(u16::decode_last(&units), Some(('🦀', 2)));
    // an unpaired low surrogate decodes to nothing
    assert_eq!(u16::decode_last(&units[1..]), None);
}
