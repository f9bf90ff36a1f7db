use crate::errors::Result;
use crate::util::view::{View, Viewable};
use std::fmt;
use std::ops::Add;

/// A pointer into a buffer of bytes. Used for binary file parsing.
///
/// Moving the cursor is unchecked; every read is checked against the end of
/// the buffer and fails with `OutOfRange` instead of panicking.
#[derive(Copy, Clone)]
pub struct Cur<'a> {
    buf_: &'a [u8],
    pos_: usize,
}

impl<'a> Cur<'a> {
    pub fn new(buf: &[u8]) -> Cur {
        Cur { buf_: buf, pos_: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos_
    }

    /// The whole underlying buffer, regardless of position.
    pub fn buf(&self) -> &'a [u8] {
        self.buf_
    }

    pub fn next<T: Viewable>(&mut self) -> Result<T> {
        let buf = self.next_n_u8s(<T as Viewable>::size())?;
        Ok(<T as Viewable>::view(buf))
    }

    pub fn nth<T: Viewable>(&self, n: usize) -> Result<T> {
        let size = <T as Viewable>::size();
        let mut cur = *self;
        match n.checked_mul(size) {
            Some(skip) => cur.jump_forward(skip),
            None => out_of_range!("element {} at {:#x} overflows", n, self.pos_),
        }
        cur.next::<T>()
    }

    pub fn next_n<T: Viewable>(&mut self, n: usize) -> Result<View<'a, T>> {
        let size = <T as Viewable>::size();
        let len = match n.checked_mul(size) {
            Some(len) => len,
            None => out_of_range!("{} elements at {:#x} overflows", n, self.pos_),
        };
        let buf = self.next_n_u8s(len)?;
        Ok(View::from_buf(buf))
    }

    pub fn next_n_u8s(&mut self, n: usize) -> Result<&'a [u8]> {
        let end_pos = match self.pos_.checked_add(n) {
            Some(end) if end <= self.buf_.len() => end,
            _ => out_of_range!(
                "read of {} bytes at {:#x} runs past the end of the {} byte buffer",
                n, self.pos_, self.buf_.len(),
            ),
        };
        let res = &self.buf_[self.pos_ .. end_pos];
        self.pos_ = end_pos;
        Ok(res)
    }

    pub fn jump_forward(&mut self, amt: usize) {
        self.pos_ = self.pos_.saturating_add(amt);
    }
}

impl<'a> Add<usize> for Cur<'a> {
    type Output = Cur<'a>;

    fn add(self, amt: usize) -> Cur<'a> {
        let mut cur = self;
        cur.jump_forward(amt);
        cur
    }
}

impl<'a> Add<u16> for Cur<'a> {
    type Output = Cur<'a>;
    fn add(self, amt: u16) -> Cur<'a> { self + amt as usize }
}

impl<'a> fmt::Debug for Cur<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Cur {{ pos: {} }}", self.pos())
    }
}

/// Converts a file offset (stored as a signed int) into a cursor at that
/// offset from the start of `base`'s buffer.
pub fn at_offset<'a>(base: Cur<'a>, off: i32) -> Result<Cur<'a>> {
    if off < 0 || off as usize > base.buf().len() {
        out_of_range!("offset {:#x} outside the {} byte buffer", off, base.buf().len());
    }
    Ok(Cur::new(base.buf()) + off as usize)
}

/// Cursor at the start of a table of `n` records of `size` bytes stored at
/// `off`. Fails unless the whole table is inside the buffer, so `n` can be
/// trusted afterwards.
pub fn table_at<'a>(base: Cur<'a>, off: i32, n: usize, size: usize) -> Result<Cur<'a>> {
    let table = at_offset(base, off)?;
    let len = match n.checked_mul(size) {
        Some(len) => len,
        None => out_of_range!("table of {} records of {} bytes overflows", n, size),
    };
    let mut end = table;
    end.next_n_u8s(len)?;
    Ok(table)
}

/// Converts a stored element count into a `usize`, rejecting negatives.
pub fn count(what: &str, n: i32) -> Result<usize> {
    if n < 0 {
        bad_format!("negative {} count: {}", what, n);
    }
    Ok(n as usize)
}

#[test]
fn test_reads_are_bounds_checked() {
    let buf = [1, 0, 2, 0, 3];
    let mut cur = Cur::new(&buf);
    assert_eq!(cur.next::<u16>().unwrap(), 1);
    assert_eq!(cur.nth::<u16>(0).unwrap(), 2);
    assert!(cur.nth::<u16>(1).is_err());
    assert!(cur.next_n::<u16>(2).is_err());
    assert_eq!(cur.pos(), 2);
    assert!((cur + 10usize).next::<u8>().is_err());
}

#[test]
fn test_at_offset() {
    let buf = [0u8; 8];
    let cur = Cur::new(&buf) + 3usize;
    assert_eq!(at_offset(cur, 4).unwrap().pos(), 4);
    assert!(at_offset(cur, -1).is_err());
    assert!(at_offset(cur, 9).is_err());
    assert!(count("bone", -2).is_err());
}

#[test]
fn test_table_at() {
    let buf = [0u8; 16];
    let cur = Cur::new(&buf);
    assert_eq!(table_at(cur, 4, 3, 4).unwrap().pos(), 4);
    assert!(table_at(cur, 4, 4, 4).is_err());
    assert!(table_at(cur, 0, usize::max_value(), 2).is_err());
}
