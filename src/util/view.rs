use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Write;
use std::iter::Iterator;
use std::marker::PhantomData;

/// Types that can be viewed as a fixed-length little-endian byte sequence.
pub trait Viewable: Sized {
    fn size() -> usize;
    fn view(buf: &[u8]) -> Self;
}

impl Viewable for u8 {
    fn size() -> usize { 1 }
    fn view(buf: &[u8]) -> u8 { buf[0] }
}

impl Viewable for u16 {
    fn size() -> usize { 2 }
    fn view(buf: &[u8]) -> u16 {
        buf[0] as u16 | (buf[1] as u16) << 8
    }
}

impl Viewable for i16 {
    fn size() -> usize { 2 }
    fn view(buf: &[u8]) -> i16 { <u16 as Viewable>::view(buf) as i16 }
}

impl Viewable for u32 {
    fn size() -> usize { 4 }
    fn view(buf: &[u8]) -> u32 {
        buf[0] as u32 | (buf[1] as u32) << 8 | (buf[2] as u32) << 16 | (buf[3] as u32) << 24
    }
}

impl Viewable for i32 {
    fn size() -> usize { 4 }
    fn view(buf: &[u8]) -> i32 { <u32 as Viewable>::view(buf) as i32 }
}

impl Viewable for f32 {
    fn size() -> usize { 4 }
    fn view(buf: &[u8]) -> f32 { f32::from_bits(<u32 as Viewable>::view(buf)) }
}

impl<T,S> Viewable for (T,S) where
    T: Viewable,
    S: Viewable
{
    fn size() -> usize { <T as Viewable>::size() + <S as Viewable>::size() }
    fn view(buf: &[u8]) -> (T,S) {
        let split = <T as Viewable>::size();
        let t = <T as Viewable>::view(&buf[..split]);
        let s = <S as Viewable>::view(&buf[split..]);
        (t,s)
    }
}

impl<T,S,P> Viewable for (T,S,P) where
    T: Viewable,
    S: Viewable,
    P: Viewable,
{
    fn size() -> usize { <(T,(S,P)) as Viewable>::size() }
    fn view(buf: &[u8]) -> (T,S,P) {
        let (t,(s,p)) = <(T,(S,P)) as Viewable>::view(buf);
        (t,s,p)
    }
}

/// A byte buffer interpreted as an array of Viewable elements.
pub struct View<'a, T> {
    buf: &'a [u8],
    _marker: PhantomData<fn() -> T>,
}

// Not derived: that would require T: Copy.
impl<'a, T> Copy for View<'a, T> {}
impl<'a, T> Clone for View<'a, T> {
    fn clone(&self) -> Self { *self }
}

impl<'a, T: Viewable> View<'a, T> {
    pub fn from_buf(buf: &[u8]) -> View<T> {
        let size = <T as Viewable>::size();
        assert!(size == 0 || buf.len() % size == 0);
        View { buf, _marker: PhantomData }
    }

    pub fn len(&self) -> usize {
        let size = <T as Viewable>::size();
        self.buf.len() / size
    }
}

impl<'a, T: Viewable + Debug> Debug for View<'a, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "View [")?;
        let mut first = true;
        for x in *self {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", x)?;
            first = false;
        }
        f.write_char(']')
    }
}

impl<'a, T: Viewable> Iterator for View<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.buf.is_empty() {
            None
        } else {
            let size = <T as Viewable>::size();
            let item = <T as Viewable>::view(&self.buf[0..size]);
            self.buf = &self.buf[size..];
            Some(item)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl<'a, T: Viewable> ExactSizeIterator for View<'a, T> {}

#[test]
fn test_little_endian() {
    let buf = [0x01, 0x02, 0xfe, 0xff, 0x00, 0x00, 0x80, 0x3f];
    let v: View<u16> = View::from_buf(&buf[..4]);
    assert_eq!(v.collect::<Vec<_>>(), vec![0x0201, 0xfffe]);
    let v: View<i16> = View::from_buf(&buf[..4]);
    assert_eq!(v.len(), 2);
    assert_eq!(v.last(), Some(-2));
    let v: View<f32> = View::from_buf(&buf[4..]);
    assert_eq!(v.collect::<Vec<_>>(), vec![1.0]);
}
