/// Kind of a primitive group in a mesh's command stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimKind {
    Fan,
    Strip,
}

/// Builder for a triangle index buffer.
///
/// Consumes fan/strip primitive groups and produces a list of triangle
/// indices (suitable for GL_TRIANGLES). The builder is only concerned
/// with the topology and doesn't need to know anything about the
/// vertices (like their position, etc.).
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    pub indices: Vec<u32>,
    cur_kind: PrimKind,
    /// Indices emitted for the current group so far.
    group: Vec<u32>,
    /// Number of vertices pushed into the current group.
    group_len: usize,
}

impl IndexBuilder {
    pub fn new() -> IndexBuilder {
        IndexBuilder {
            indices: vec![],
            cur_kind: PrimKind::Strip,
            group: vec![],
            group_len: 0,
        }
    }

    /// Begin new primitive group. Automatically closes any
    /// previous primitive group.
    pub fn begin(&mut self, kind: PrimKind) {
        self.end();
        self.cur_kind = kind;
    }

    /// Add the vertex at output position `idx` to the current group.
    pub fn push(&mut self, idx: u32) {
        let j = self.group_len;
        let g = &mut self.group;

        if j > 2 {
            let len = g.len();
            match self.cur_kind {
                // Triangle strip
                //  1---3---5
                //   \ / \ / \
                //    0---2---4
                // Every other triangle is flipped to keep the winding.
                PrimKind::Strip => {
                    if j % 2 == 0 {
                        let (a, b) = (g[len - 3], g[len - 1]);
                        g.extend_from_slice(&[a, b]);
                    } else {
                        let (a, b) = (g[len - 1], g[len - 2]);
                        g.extend_from_slice(&[a, b]);
                    }
                }

                // Triangle fan
                //  2---3---4
                //   \  |  /
                //    \ | /
                //      0---1
                PrimKind::Fan => {
                    let (a, b) = (g[0], g[len - 1]);
                    g.extend_from_slice(&[a, b]);
                }
            }
        }

        g.push(idx);
        self.group_len += 1;
    }

    /// End current primitive group and write its triangles to `indices`.
    /// A group with fewer than three vertices makes no triangles.
    pub fn end(&mut self) {
        if self.group_len >= 3 {
            self.indices.extend_from_slice(&self.group);
        } else if self.group_len != 0 {
            debug!("dropping degenerate primitive group of {} vertices", self.group_len);
        }
        self.group.clear();
        self.group_len = 0;
    }

    pub fn done(mut self) -> Vec<u32> {
        self.end();
        self.indices
    }
}

#[cfg(test)]
fn build(kind: PrimKind, n: u32) -> Vec<u32> {
    let mut b = IndexBuilder::new();
    b.begin(kind);
    for i in 0..n {
        b.push(i);
    }
    b.done()
}

#[test]
fn test_fan() {
    assert_eq!(build(PrimKind::Fan, 4), vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(build(PrimKind::Fan, 5), vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
}

#[test]
fn test_strip() {
    assert_eq!(build(PrimKind::Strip, 5), vec![0, 1, 2, 2, 1, 3, 2, 3, 4]);
    assert_eq!(
        build(PrimKind::Strip, 6),
        vec![0, 1, 2, 2, 1, 3, 2, 3, 4, 4, 3, 5],
    );
}

#[test]
fn test_triangle_count() {
    for &kind in &[PrimKind::Fan, PrimKind::Strip] {
        for n in 0..10 {
            let expected = if n >= 3 { n - 2 } else { 0 };
            assert_eq!(build(kind, n).len() as u32, 3 * expected, "{:?} of {}", kind, n);
        }
    }
}

#[test]
fn test_groups_are_independent() {
    let mut b = IndexBuilder::new();
    b.begin(PrimKind::Fan);
    for i in 0..4 { b.push(i); }
    b.begin(PrimKind::Strip);
    for i in 4..6 { b.push(i); }
    b.begin(PrimKind::Strip);
    for i in 6..10 { b.push(i); }
    assert_eq!(b.done(), vec![0, 1, 2, 0, 2, 3, 6, 7, 8, 8, 7, 9]);
}
