use crate::allocator::{Allocator, Global};
use crate::unit::Unit;
use crate::TextBuf;

//the size hints are lower bounds in source items, which is also a lower
//bound in destination units for every supported source type.

impl<U: Unit, A: Allocator> Extend<char> for TextBuf<U, A> {
    fn extend<I: IntoIterator<Item = char>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(self.len() + iter.size_hint().0);
        for c in iter {
            self.push(c);
        }
    }
}

impl<'a, U: Unit, A: Allocator> Extend<&'a char> for TextBuf<U, A> {
    fn extend<I: IntoIterator<Item = &'a char>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, U: Unit, A: Allocator> Extend<&'a str> for TextBuf<U, A> {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for s in iter {
            self.push(s);
        }
    }
}

impl<U: Unit> FromIterator<char> for TextBuf<U, Global> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        let iter = iter.into_iter();
        let mut buf = TextBuf::with_capacity(iter.size_hint().0);
        for c in iter {
            buf.push(c);
        }
        buf
    }
}

impl<'a, U: Unit> FromIterator<&'a char> for TextBuf<U, Global> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = &'a char>,
    {
        iter.into_iter().copied().collect()
    }
}

impl<'a, U: Unit> FromIterator<&'a str> for TextBuf<U, Global> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut buf = TextBuf::new();
        buf.extend(iter);
        buf
    }
}
