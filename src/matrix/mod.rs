//! Arena-backed toroidal matrix used by the [`QuotaSolver`](crate::QuotaSolver).
//!
//! Node `0` is the root of the ring of primary column headers, nodes
//! `1..=columns` are the column headers (primary first, then secondary), and
//! the nodes of every inserted row follow. Secondary headers are never linked
//! into the root ring, so anything walking it only ever sees primary columns.

mod node;

pub use node::NodeIndex;

use node::{
    insert_above, insert_left, relink_horizontal, relink_vertical, unlink_horizontal,
    unlink_vertical, Direction, Node, Ring,
};

/// Index of the root node.
pub const ROOT: NodeIndex = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    nodes: Vec<Node>,
    /// Number of nodes currently threaded through each column.
    sizes: Vec<usize>,
    /// Row id of every data node, indexed by `node - first_data_node`.
    node_rows: Vec<usize>,
    primary_columns: usize,
}

impl Matrix {
    /// Create a matrix with all column headers in place and room for
    /// `data_nodes` further nodes without reallocating.
    pub fn with_capacity(
        primary_columns: usize,
        secondary_columns: usize,
        data_nodes: usize,
    ) -> Self {
        let columns = primary_columns + secondary_columns;
        let mut nodes = Vec::with_capacity(1 + columns + data_nodes);

        nodes.push(Node::new_self_ref(ROOT, ROOT));
        for column in 0..columns {
            let header = column + 1;
            nodes.push(Node::new_self_ref(header, header));

            if column < primary_columns {
                insert_left(&mut nodes, ROOT, header);
            }
        }

        log::debug!(
            "Allocated matrix with [{}] primary columns, [{}] secondary columns and room for \
             [{}] data nodes.",
            primary_columns,
            secondary_columns,
            data_nodes
        );

        Matrix {
            nodes,
            sizes: vec![0; columns],
            node_rows: Vec::with_capacity(data_nodes),
            primary_columns,
        }
    }

    #[inline]
    fn first_data_node(&self) -> NodeIndex {
        self.sizes.len() + 1
    }

    /// Number of columns, primary and secondary.
    pub fn num_columns(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_primary(&self, column: usize) -> bool {
        column < self.primary_columns
    }

    #[inline]
    pub fn header(column: usize) -> NodeIndex {
        column + 1
    }

    #[inline]
    pub fn column_of(&self, node: NodeIndex) -> usize {
        self.nodes[node].top - 1
    }

    #[inline]
    pub fn row_of(&self, node: NodeIndex) -> usize {
        self.node_rows[node - self.first_data_node()]
    }

    #[inline]
    pub fn size(&self, column: usize) -> usize {
        self.sizes[column]
    }

    #[inline]
    pub fn down(&self, node: NodeIndex) -> NodeIndex {
        self.nodes[node].down
    }

    #[inline]
    pub fn right(&self, node: NodeIndex) -> NodeIndex {
        self.nodes[node].right
    }

    #[inline]
    pub fn left(&self, node: NodeIndex) -> NodeIndex {
        self.nodes[node].left
    }

    /// Return true if no primary column is left uncovered.
    pub fn is_exhausted(&self) -> bool {
        self.nodes[ROOT].right == ROOT
    }

    /// Return an iterator over the uncovered primary columns, in ring order.
    pub fn uncovered_columns(&self) -> impl Iterator<Item = usize> + '_ {
        Ring::new(&self.nodes, ROOT, Direction::Right).map(|header| header - 1)
    }

    /// Return an iterator over the nodes still threaded through `column`, top
    /// to bottom.
    pub fn nodes_in_column(&self, column: usize) -> impl Iterator<Item = NodeIndex> + '_ {
        Ring::new(&self.nodes, Self::header(column), Direction::Down)
    }

    /// Return an iterator over the other nodes of the row containing `node`,
    /// left to right.
    #[cfg(test)]
    pub fn row_neighbors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        Ring::new(&self.nodes, node, Direction::Right)
    }

    /// Return true if every uncovered primary column's size matches the
    /// length of its vertical ring.
    pub fn sizes_match_rings(&self) -> bool {
        self.uncovered_columns()
            .all(|column| self.nodes_in_column(column).count() == self.size(column))
    }

    /// Thread a new row through the given columns.
    ///
    /// Each node is placed at the bottom of its column and the nodes are
    /// linked into their own horizontal ring in the given order. The caller
    /// is responsible for validating `columns` first, an invalid index here
    /// corrupts the rings.
    pub fn push_row(&mut self, columns: &[usize], row: usize) -> NodeIndex {
        debug_assert!(!columns.is_empty());

        let first = self.nodes.len();
        for (offset, &column) in columns.iter().enumerate() {
            debug_assert!(column < self.num_columns());

            let index = first + offset;
            let header = Self::header(column);
            self.nodes.push(Node::new_self_ref(index, header));
            self.node_rows.push(row);

            insert_above(&mut self.nodes, header, index);
            self.sizes[column] += 1;

            if offset > 0 {
                insert_left(&mut self.nodes, first, index);
            }
        }

        first
    }

    /// Remove `column` from the header ring, along with every row that
    /// passes through it from all the other columns those rows touch.
    pub fn cover(&mut self, column: usize) {
        let header = Self::header(column);
        unlink_horizontal(&mut self.nodes, header);

        let mut row_node = self.nodes[header].down;
        while row_node != header {
            let mut node = self.nodes[row_node].right;
            while node != row_node {
                unlink_vertical(&mut self.nodes, node);
                self.sizes[self.nodes[node].top - 1] -= 1;

                node = self.nodes[node].right;
            }

            row_node = self.nodes[row_node].down;
        }
    }

    /// Undo the matching [`cover`](Self::cover) call, walking both rings in
    /// the opposite direction.
    pub fn uncover(&mut self, column: usize) {
        let header = Self::header(column);

        let mut row_node = self.nodes[header].up;
        while row_node != header {
            let mut node = self.nodes[row_node].left;
            while node != row_node {
                self.sizes[self.nodes[node].top - 1] += 1;
                relink_vertical(&mut self.nodes, node);

                node = self.nodes[node].left;
            }

            row_node = self.nodes[row_node].up;
        }

        relink_horizontal(&mut self.nodes, header);
    }
}
