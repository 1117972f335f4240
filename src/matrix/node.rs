/// Position of a node in the arena of a [`Matrix`](super::Matrix).
pub type NodeIndex = usize;

/// A single cell of the toroidal matrix.
///
/// Every field is an index into the same arena, so relinking a node is a
/// handful of plain array writes.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Node {
    pub left: NodeIndex,
    pub right: NodeIndex,
    pub up: NodeIndex,
    pub down: NodeIndex,
    /// The header node of the column this node is threaded through. Headers
    /// (and the root) point at themselves.
    pub top: NodeIndex,
}

impl Node {
    /// A node that forms a ring of length one in both directions.
    pub fn new_self_ref(index: NodeIndex, top: NodeIndex) -> Self {
        Node {
            left: index,
            right: index,
            up: index,
            down: index,
            top,
        }
    }
}

// NOTE: Each of these reads both neighbour indices before writing either, so
// they remain correct when the left and right (or up and down) neighbours are
// the same node.
pub fn unlink_horizontal(nodes: &mut [Node], index: NodeIndex) {
    let Node { left, right, .. } = nodes[index];

    nodes[left].right = right;
    nodes[right].left = left;
}

pub fn relink_horizontal(nodes: &mut [Node], index: NodeIndex) {
    let Node { left, right, .. } = nodes[index];

    nodes[left].right = index;
    nodes[right].left = index;
}

pub fn unlink_vertical(nodes: &mut [Node], index: NodeIndex) {
    let Node { up, down, .. } = nodes[index];

    nodes[up].down = down;
    nodes[down].up = up;
}

pub fn relink_vertical(nodes: &mut [Node], index: NodeIndex) {
    let Node { up, down, .. } = nodes[index];

    nodes[up].down = index;
    nodes[down].up = index;
}

macro_rules! insert_direction {
    ($name:ident, $direction:ident, $opposite:ident) => {
        /// Splice `new` into the ring next to `anchor`, on the
        #[doc = concat!("`", stringify!($direction), "` side.")]
        pub fn $name(nodes: &mut [Node], anchor: NodeIndex, new: NodeIndex) {
            let neighbor = nodes[anchor].$direction;

            nodes[new].$direction = neighbor;
            nodes[new].$opposite = anchor;
            nodes[neighbor].$opposite = new;
            nodes[anchor].$direction = new;
        }
    };
}

insert_direction!(insert_above, up, down);

insert_direction!(insert_left, left, right);

/// The ways to walk a ring. The search itself only walks forward; the
/// backward directions are used to check ring symmetry in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[cfg(test)]
    Left,
    Right,
    #[cfg(test)]
    Up,
    Down,
}

impl Direction {
    fn step(self, node: &Node) -> NodeIndex {
        match self {
            #[cfg(test)]
            Direction::Left => node.left,
            Direction::Right => node.right,
            #[cfg(test)]
            Direction::Up => node.up,
            Direction::Down => node.down,
        }
    }
}

/// Walks a ring starting after `origin`, stopping when it comes back around.
/// The origin itself is never yielded.
#[derive(Debug)]
pub struct Ring<'n> {
    nodes: &'n [Node],
    origin: NodeIndex,
    current: NodeIndex,
    direction: Direction,
}

impl<'n> Ring<'n> {
    pub fn new(nodes: &'n [Node], origin: NodeIndex, direction: Direction) -> Self {
        Ring {
            nodes,
            origin,
            current: origin,
            direction,
        }
    }
}

impl Iterator for Ring<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.direction.step(&self.nodes[self.current]);

        if next == self.origin {
            None
        } else {
            self.current = next;

            Some(next)
        }
    }
}
