use textbuf::tbuf;
use textbuf::{TextBuf, TextBuf16, TextBuf32, TextBuf8};

#[test]
fn test_new() {
    let b = TextBuf8::new();
    assert_eq!(b, b"");
    assert!(b.is_short());
    assert!(b.is_empty());
    assert_eq!(b.capacity(), TextBuf8::MIN_CAPACITY);
}

#[test]
fn test_from_slice() {
    let b = TextBuf8::from_slice(b"test");
    assert_eq!(b, b"test");
    assert!(b.is_short());
    assert_eq!(b.capacity(), TextBuf8::MIN_CAPACITY);

    let b = TextBuf8::from_slice(b"the quick brown fox jumped over the lazy dog");
    assert_eq!(b, b"the quick brown fox jumped over the lazy dog");
    assert!(!b.is_short());
    assert!(b.capacity() >= b.len());
}

#[test]
fn test_short_threshold() {
    // content of exactly MIN_CAPACITY units stays inline
    let at_cap = vec![b'x'; TextBuf8::MIN_CAPACITY];
    let b = TextBuf8::from_slice(&at_cap);
    assert!(b.is_short());
    assert_eq!(b.capacity(), TextBuf8::MIN_CAPACITY);

    // one more unit spills to the heap
    let over_cap = vec![b'x'; TextBuf8::MIN_CAPACITY + 1];
    let b = TextBuf8::from_slice(&over_cap);
    assert!(!b.is_short());
    assert!(b.capacity() >= b.len());
    assert_eq!(b.capacity() % 2, 0);
}

#[test]
fn test_with_capacity() {
    let b = TextBuf8::with_capacity(4);
    assert!(b.is_short());
    assert_eq!(b.capacity(), TextBuf8::MIN_CAPACITY);

    let b = TextBuf8::with_capacity(100);
    assert!(!b.is_short());
    assert!(b.capacity() >= 100);
    assert_eq!(b.len(), 0);
}

#[test]
fn test_reserve() {
    let mut b = TextBuf8::from_slice(b"test");
    let cap = b.reserve(10);
    assert_eq!(cap, TextBuf8::MIN_CAPACITY);
    assert!(b.is_short());
    assert_eq!(b, b"test");

    let cap = b.reserve(100);
    assert!(cap >= 100);
    assert!(!b.is_short());
    assert_eq!(b, b"test");
    assert_eq!(b.capacity(), cap);

    // idempotent once satisfied
    let cap2 = b.reserve(100);
    assert_eq!(cap2, cap);
    let cap3 = b.reserve(10);
    assert_eq!(cap3, cap);
    assert_eq!(b, b"test");
}

#[test]
fn test_reserve_keeps_offsets() {
    let mut b = TextBuf8::from_slice(b"0123456789");
    b.reserve(500);
    assert_eq!(&b[3..7], b"3456");
    assert_eq!(b.len(), 10);
}

#[test]
fn test_append_stays_short_when_room() {
    // MIN_CAPACITY for u8 comfortably exceeds six units
    assert!(TextBuf8::MIN_CAPACITY >= 6);
    let mut b = TextBuf8::from_slice(b"123");
    b.append("456", 1);
    assert_eq!(b, b"123456");
    assert!(b.is_short());
}

#[test]
fn test_append_promotes_with_tiny_inline_capacity() {
    // u32 units shrink the inline capacity below six on 64-bit targets
    let mut b = TextBuf32::new();
    b.append("123", 1);
    if TextBuf32::MIN_CAPACITY >= 6 {
        return; //32-bit layout, covered by the u8 case above
    }
    assert!(b.is_short());
    b.append("456", 1);
    assert_eq!(b, &[b'1' as u32, b'2' as u32, b'3' as u32, b'4' as u32, b'5' as u32, b'6' as u32]);
    assert!(!b.is_short());
    assert!(b.capacity() >= 6);
}

#[test]
fn test_append_repeat() {
    let mut b = TextBuf8::new();
    let written = b.append("ab", 3);
    assert_eq!(written, 6);
    assert_eq!(b, b"ababab");

    // a count of zero is a no-op
    let written = b.append("xyz", 0);
    assert_eq!(written, 0);
    assert_eq!(b, b"ababab");

    let written = b.append("", 5);
    assert_eq!(written, 0);
    assert_eq!(b, b"ababab");
}

#[test]
fn test_insert() {
    let mut b = TextBuf8::from_slice(b"123456789");
    let written = b.insert(1, "xyz", 1);
    assert_eq!(written, 3);
    assert_eq!(b, b"1xyz23456789");
}

#[test]
fn test_insert_clamps_past_end() {
    let mut b = TextBuf8::from_slice(b"abc");
    b.insert(1000, "def", 1);
    assert_eq!(b, b"abcdef");

    b.insert(0, "x", 2);
    assert_eq!(b, b"xxabcdef");
}

#[test]
fn test_erase() {
    let mut b = TextBuf8::from_slice(b"123456789");
    b.erase(2, 2);
    assert_eq!(b, b"1256789");
}

#[test]
fn test_erase_clamps() {
    let mut b = TextBuf8::from_slice(b"123456789");
    // past the end: no-op
    b.erase(20, 5);
    assert_eq!(b, b"123456789");
    // zero units: no-op
    b.erase(3, 0);
    assert_eq!(b, b"123456789");
    // span past the end: truncation
    b.erase(4, 100);
    assert_eq!(b, b"1234");
}

#[test]
fn test_replace() {
    let mut b = TextBuf8::from_slice(b"123456789");
    let written = b.replace(1, 2, "xyz", 1);
    assert_eq!(written, 3);
    assert_eq!(b, b"1xyz456789");
}

#[test]
fn test_replace_cases() {
    // equal size: overwrite in place
    let mut b = TextBuf8::from_slice(b"abcdef");
    b.replace(1, 2, "XY", 1);
    assert_eq!(b, b"aXYdef");

    // shorter: overwrite prefix, close the gap
    let mut b = TextBuf8::from_slice(b"abcdef");
    b.replace(1, 4, "X", 1);
    assert_eq!(b, b"aXf");

    // longer: open a gap at the span's end
    let mut b = TextBuf8::from_slice(b"abcdef");
    b.replace(1, 1, "WXYZ", 1);
    assert_eq!(b, b"aWXYZcdef");

    // empty span: pure insertion
    let mut b = TextBuf8::from_slice(b"abcdef");
    b.replace(2, 0, "..", 1);
    assert_eq!(b, b"ab..cdef");

    // empty replacement erases the span
    let mut b = TextBuf8::from_slice(b"abcdef");
    b.replace(2, 3, "", 1);
    assert_eq!(b, b"abf");

    // a count of zero is a no-op
    let mut b = TextBuf8::from_slice(b"abcdef");
    assert_eq!(b.replace(2, 3, "zz", 0), 0);
    assert_eq!(b, b"abcdef");

    // clamped span at the tail
    let mut b = TextBuf8::from_slice(b"abcdef");
    b.replace(4, 100, "!", 1);
    assert_eq!(b, b"abcd!");
}

#[test]
fn test_growth_is_geometric() {
    let mut b = TextBuf8::new();
    let mut caps = vec![b.capacity()];
    for _ in 0..1000 {
        b.append('x', 1);
        if b.capacity() != *caps.last().unwrap() {
            caps.push(b.capacity());
        }
    }
    assert_eq!(b.len(), 1000);
    assert!(!b.is_short());
    // every reallocation at least doubles the prior capacity
    for pair in caps.windows(2) {
        assert!(pair[1] >= pair[0] * 2, "{} -> {}", pair[0], pair[1]);
    }
}

#[test]
fn test_expand() {
    let mut b = TextBuf8::from_slice(b"abc");
    let window = b.expand(3);
    assert_eq!(window, &[0, 0, 0]);
    window.copy_from_slice(b"def");
    assert_eq!(b, b"abcdef");
    assert_eq!(b.len(), 6);
}

#[test]
fn test_expand_at() {
    let mut b = TextBuf8::from_slice(b"abcdef");
    let window = b.expand_at(2, 2);
    assert_eq!(window, &[0, 0]);
    window.copy_from_slice(b"XY");
    assert_eq!(b, b"abXYcdef");

    // at or past the end it appends
    let window = b.expand_at(100, 1);
    window[0] = b'!';
    assert_eq!(b, b"abXYcdef!");
}

#[test]
fn test_reduce_at() {
    let mut b = TextBuf8::from_slice(b"abcdef");
    // removes the units immediately preceding pos
    b.reduce_at(4, 2);
    assert_eq!(b, b"abef");
}

#[test]
fn test_resize_truncate_clear() {
    let mut b = TextBuf8::from_slice(b"abc");
    b.resize(6, b'.');
    assert_eq!(b, b"abc...");
    b.resize(2, b'.');
    assert_eq!(b, b"ab");

    b.truncate(1);
    assert_eq!(b, b"a");
    b.truncate(10); //no-op
    assert_eq!(b, b"a");

    let cap = b.capacity();
    b.clear();
    assert!(b.is_empty());
    assert_eq!(b.capacity(), cap);
}

#[test]
fn test_shrink_to_fit() {
    // short: no-op
    let mut b = TextBuf8::from_slice(b"test");
    assert_eq!(b.shrink_to_fit(), TextBuf8::MIN_CAPACITY);
    assert!(b.is_short());

    // long content that no longer fits inline: capacity drops, content intact
    let mut b = TextBuf8::with_capacity(400);
    b.append("x", 1);
    b.append(&vec![b'y'; 99][..], 1);
    let len = b.len();
    b.shrink_to_fit();
    assert_eq!(b.len(), len);
    assert!(!b.is_short());
    assert!(b.capacity() >= len);
    assert_eq!(&b[..2], b"xy");

    // long content that fits inline flips back to short
    let mut b = TextBuf8::with_capacity(100);
    b.append("abc", 1);
    assert!(!b.is_short());
    assert_eq!(b.shrink_to_fit(), TextBuf8::MIN_CAPACITY);
    assert!(b.is_short());
    assert_eq!(b, b"abc");
}

#[test]
fn test_pop_and_peek() {
    let mut b = TextBuf8::new();
    b.push("aé🦀");
    assert_eq!(b.first_char(), Some('a'));
    assert_eq!(b.last_char(), Some('🦀'));
    assert_eq!(b.pop(), Some('🦀'));
    assert_eq!(b.pop(), Some('é'));
    assert_eq!(b.pop(), Some('a'));
    assert_eq!(b.pop(), None);

    // a split code point reports None rather than panicking
    let mut b = TextBuf8::new();
    b.push("é");
    b.erase(0, 1); //drops the lead byte
    assert_eq!(b.pop(), None);
    assert_eq!(b.len(), 1);
}

#[test]
fn test_take() {
    let mut b = TextBuf8::from_slice(b"the quick brown fox jumped over the lazy dog");
    assert!(!b.is_short());
    let ptr = b.as_ptr();
    let taken = b.take();
    assert_eq!(taken, b"the quick brown fox jumped over the lazy dog");
    assert_eq!(taken.as_ptr(), ptr); //buffer moved, not copied
    assert!(b.is_short());
    assert!(b.is_empty());
    // the source is independently usable again
    b.push("hello");
    assert_eq!(b, b"hello");
}

#[test]
fn test_clone_is_deep() {
    let b = TextBuf8::from_slice(b"the quick brown fox jumped over the lazy dog");
    let c = b.clone();
    assert_eq!(b, c);
    assert_ne!(b.as_ptr(), c.as_ptr());
}

#[test]
fn test_into_vec() {
    let b = TextBuf8::from_slice(b"short");
    assert_eq!(b.into_vec(), b"short".to_vec());

    let b = TextBuf8::from_slice(b"the quick brown fox jumped over the lazy dog");
    let ptr = b.as_ptr();
    let v = b.into_vec();
    assert_eq!(v, b"the quick brown fox jumped over the lazy dog".to_vec());
    assert_eq!(v.as_ptr(), ptr); //heap buffer reused
}

#[test]
fn test_set_len_and_all_storage() {
    let mut b = TextBuf8::with_capacity(40);
    assert_eq!(b.all_storage().len(), b.capacity());
    // freshly acquired storage is zero-filled
    assert!(b.all_storage().iter().all(|&u| u == 0));
    b.append("abcd", 1);
    unsafe { b.set_len(2) };
    assert_eq!(b, b"ab");
    unsafe { b.set_len(4) };
    assert_eq!(b, b"abcd");
}

#[test]
fn test_display_and_debug() {
    let mut b = TextBuf8::new();
    b.push("héllo\n");
    assert_eq!(format!("{}", b), "héllo\n");
    assert_eq!(format!("{:?}", b), "\"héllo\\n\"");

    // invalid units render as replacement characters
    let mut b = TextBuf8::new();
    b.push(0xffu8);
    assert_eq!(format!("{}", b), "\u{fffd}");

    let mut w = TextBuf16::new();
    w.push("wide");
    assert_eq!(format!("{}", w), "wide");
}

#[test]
fn test_operators() {
    let mut b = TextBuf8::new();
    b += "abc";
    b += &b"def"[..];
    assert_eq!(b, b"abcdef");
    let b = b + "!";
    assert_eq!(b, b"abcdef!");

    let other = TextBuf8::from_slice(b"abcdef!");
    assert_eq!(b, other);
    assert!(b < TextBuf8::from_slice(b"b"));
}

#[test]
fn test_append_other_buffer() {
    let mut b = TextBuf8::from_slice(b"one ");
    let two = TextBuf8::from_slice(b"two");
    b.push(&two);
    assert_eq!(b, b"one two");
}

#[test]
fn test_fmt_write() {
    use std::fmt::Write;
    let mut b = TextBuf16::new();
    write!(b, "{}-{}", 4, "two").unwrap();
    let expected: Vec<u16> = "4-two".encode_utf16().collect();
    assert_eq!(b, expected.as_slice());
}

#[test]
fn test_fromiter_and_extend() {
    let b: TextBuf8 = "héllo".chars().collect();
    assert_eq!(b, "héllo".as_bytes());

    let b: TextBuf16 = ["one", " ", "two"].into_iter().collect();
    let expected: Vec<u16> = "one two".encode_utf16().collect();
    assert_eq!(b, expected.as_slice());

    let mut b = TextBuf8::new();
    b.extend(['a', 'b']);
    b.extend(["cd", "ef"]);
    assert_eq!(b, b"abcdef");
}

#[test]
fn test_tbuf_macro() {
    let b: TextBuf8 = tbuf!();
    assert!(b.is_empty());

    let b: TextBuf8 = tbuf!("hello");
    assert_eq!(b, b"hello");

    let b: TextBuf32 = tbuf!("hi");
    assert_eq!(b, &[b'h' as u32, b'i' as u32]);

    let b: TextBuf8 = tbuf!('x'; 4);
    assert_eq!(b, b"xxxx");
}

#[test]
fn test_default_and_mem_take() {
    let mut b = TextBuf8::from_slice(b"content");
    let taken = std::mem::take(&mut b);
    assert_eq!(taken, b"content");
    assert!(b.is_empty());
    assert!(b.is_short());
}

#[test]
fn test_hash_and_borrow() {
    use std::collections::HashSet;
    let mut set: HashSet<TextBuf8> = HashSet::new();
    set.insert(TextBuf8::from_slice(b"alpha"));
    set.insert(TextBuf8::from_slice(b"beta"));
    assert!(set.contains(&b"alpha"[..]));
    assert!(!set.contains(&b"gamma"[..]));
}

#[test]
fn test_unit_widths() {
    let mut b = TextBuf16::new();
    b.push("a🦀");
    assert_eq!(b.len(), 3); //one unit plus a surrogate pair
    assert_eq!(TextBuf16::MIN_CAPACITY, TextBuf8::MIN_CAPACITY / 2);

    let mut b = TextBuf32::new();
    b.push("a🦀");
    assert_eq!(b.len(), 2);
    assert_eq!(b.pop(), Some('🦀'));
}

#[test]
fn test_stateful_allocator_value() {
    use textbuf::{Counting, Global};
    let mut b: TextBuf<u8, Counting<Global>> = TextBuf::new_in(Counting::new(Global));
    b.append("x", 50);
    assert_eq!(b.len(), 50);
    assert!(b.allocator().allocs() >= 1);
}
