//! Logical table grid built from `rowspan`/`colspan` markup.
//!
//! `TableMatrix` resolves a table's rows and cells into a 2-D occupancy grid:
//! each cell is placed at the first free column of its row (left-to-right,
//! top-to-bottom), carried rowspans block columns in later rows, and
//! conflicting claims from malformed markup resolve last-write-wins. The grid
//! is a throwaway: table-editing commands build one per operation against the
//! current tree and discard it.
//!
//! Span optimization is split in two per the plan/apply pattern: `span_plan`
//! computes the minimal declared spans over the immutable grid, and
//! `apply_span_plan` writes the resulting attributes back to the tree. A span
//! only shrinks where the cell does not actually own the covered coordinates
//! (rows stolen by a conflicting claim, or rows past the last real `<tr>`),
//! so spans that describe the real shape always survive and the optimized
//! table resolves to the same ownership pattern.

use crate::dom::{Id, Node, find_node_by_id_mut};

/// Logical position and span of one `<td>`/`<th>`, keyed by node id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableCellRef {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub cell: Id,
}

/// One coordinate of the dense matrix: which cell covers it, and whether the
/// coordinate is that cell's origin (top-left corner of its span).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixSlot {
    pub is_origin: bool,
    /// Index into [`TableMatrix::cells`].
    pub cell: usize,
}

/// One entry of a span-minimization plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpanChange {
    pub cell: Id,
    pub row_span: usize,
    pub col_span: usize,
}

#[derive(Debug)]
pub struct TableMatrix {
    cells: Vec<TableCellRef>,
    /// Ownership grid (cell indices), row-major, padded to uniform width.
    grid: Vec<Vec<Option<usize>>>,
    /// Rows backed by an actual `<tr>`; the grid may be taller when declared
    /// rowspans overhang the table.
    real_rows: usize,
}

impl TableMatrix {
    /// Resolve `table` into an occupancy grid. Walks direct `<tr>` children
    /// plus rows inside section elements, in document order. Never fails:
    /// a node without rows yields an empty matrix.
    pub fn from_table(table: &Node) -> Self {
        let mut cells: Vec<TableCellRef> = Vec::new();
        let mut grid: Vec<Vec<Option<usize>>> = Vec::new();
        let mut real_rows = 0usize;

        for row_node in table_rows(table) {
            let row = real_rows;
            real_rows += 1;
            if grid.len() <= row {
                grid.resize(row + 1, Vec::new());
            }

            for cell_node in row_node.children() {
                if !(cell_node.is_element_named("td") || cell_node.is_element_named("th")) {
                    continue;
                }
                let row_span = cell_node.span_attribute("rowspan") as usize;
                let col_span = cell_node.span_attribute("colspan") as usize;
                let col = first_free_column(&grid[row]);

                let index = cells.len();
                cells.push(TableCellRef {
                    row,
                    col,
                    row_span,
                    col_span,
                    cell: cell_node.id(),
                });

                // Claim the full span, overwriting earlier claims from
                // malformed markup (last write wins).
                if grid.len() < row + row_span {
                    grid.resize(row + row_span, Vec::new());
                }
                for covered_row in grid.iter_mut().skip(row).take(row_span) {
                    if covered_row.len() < col + col_span {
                        covered_row.resize(col + col_span, None);
                    }
                    for slot in covered_row.iter_mut().skip(col).take(col_span) {
                        if slot.is_some() {
                            log::debug!(
                                target: "editml.table",
                                "overlapping span claim at cell {index}, last write wins"
                            );
                        }
                        *slot = Some(index);
                    }
                }
            }
        }

        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut grid {
            row.resize(width, None);
        }

        log::debug!(
            target: "editml.table",
            "resolved table: {} cells, {}x{} grid, {} real rows",
            cells.len(),
            grid.len(),
            width,
            real_rows
        );

        Self {
            cells,
            grid,
            real_rows,
        }
    }

    pub fn cells(&self) -> &[TableCellRef] {
        &self.cells
    }

    /// Grid width in logical columns.
    pub fn width(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Grid height, including rows that exist only because a declared rowspan
    /// overhangs the last `<tr>`.
    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Number of rows backed by an actual `<tr>`.
    pub fn real_rows(&self) -> usize {
        self.real_rows
    }

    /// The sparse view: a cell reference only at its origin coordinate.
    pub fn origin_at(&self, row: usize, col: usize) -> Option<&TableCellRef> {
        let index = (*self.grid.get(row)?.get(col)?)?;
        let cell = &self.cells[index];
        (cell.row == row && cell.col == col).then_some(cell)
    }

    /// The dense view: every coordinate annotated with its covering cell.
    /// Coordinates no cell covers (ragged rows) stay `None`.
    pub fn full_matrix(&self) -> Vec<Vec<Option<MatrixSlot>>> {
        self.grid
            .iter()
            .enumerate()
            .map(|(row, slots)| {
                slots
                    .iter()
                    .enumerate()
                    .map(|(col, slot)| {
                        slot.map(|index| {
                            let cell = &self.cells[index];
                            MatrixSlot {
                                is_origin: cell.row == row && cell.col == col,
                                cell: index,
                            }
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Ownership pattern over real rows, keyed by cell node id. Two matrices
    /// with equal occupancy describe the same logical table shape.
    pub fn occupancy(&self) -> Vec<Vec<Option<Id>>> {
        self.grid
            .iter()
            .take(self.real_rows)
            .map(|slots| {
                slots
                    .iter()
                    .map(|slot| slot.map(|index| self.cells[index].cell))
                    .collect()
            })
            .collect()
    }

    /// Compute the span-minimizing canonicalization: for each cell, the
    /// declared spans shrink to the coordinates the cell actually owns.
    /// Returns only the cells whose spans change; an empty plan means the
    /// table is already canonical.
    pub fn span_plan(&self) -> Vec<SpanChange> {
        let mut plan = Vec::new();
        for (index, cell) in self.cells.iter().enumerate() {
            let (row_span, col_span) = self.minimal_span(index, cell);
            if row_span != cell.row_span || col_span != cell.col_span {
                plan.push(SpanChange {
                    cell: cell.cell,
                    row_span,
                    col_span,
                });
            }
        }
        log::debug!(
            target: "editml.table",
            "span plan: {} of {} cells change",
            plan.len(),
            self.cells.len()
        );
        plan
    }

    fn minimal_span(&self, index: usize, cell: &TableCellRef) -> (usize, usize) {
        let owns = |row: usize, col: usize| {
            self.grid
                .get(row)
                .and_then(|slots| slots.get(col))
                .copied()
                .flatten()
                == Some(index)
        };

        // Trailing rows past the last real <tr>, or fully claimed by other
        // cells, contribute nothing to the shape this cell owns.
        let mut row_span = cell.row_span;
        while row_span > 1 {
            let last = cell.row + row_span - 1;
            let overhang = last >= self.real_rows;
            let owns_any = (cell.col..cell.col + cell.col_span).any(|col| owns(last, col));
            if overhang || !owns_any {
                row_span -= 1;
            } else {
                break;
            }
        }

        // Same for trailing column strips.
        let mut col_span = cell.col_span;
        while col_span > 1 {
            let last = cell.col + col_span - 1;
            let owns_any = (cell.row..cell.row + row_span).any(|row| owns(row, last));
            if !owns_any {
                col_span -= 1;
            } else {
                break;
            }
        }

        (row_span, col_span)
    }
}

/// Write a span plan back to the live table: declared `rowspan`/`colspan`
/// attributes are updated, and removed entirely when the span is 1.
pub fn apply_span_plan(table: &mut Node, plan: &[SpanChange]) {
    for change in plan {
        let Some(cell) = find_node_by_id_mut(table, change.cell) else {
            log::debug!(target: "editml.table", "plan cell {:?} not in table", change.cell);
            continue;
        };
        write_span(cell, "rowspan", change.row_span);
        write_span(cell, "colspan", change.col_span);
    }
}

fn write_span(cell: &mut Node, attr: &str, span: usize) {
    if span <= 1 {
        cell.remove_attribute(attr);
    } else {
        cell.set_attribute(attr, Some(&span.to_string()));
    }
}

fn first_free_column(row: &[Option<usize>]) -> usize {
    row.iter()
        .position(Option::is_none)
        .unwrap_or(row.len())
}

/// Direct `<tr>` children plus rows inside `<thead>`/`<tbody>`/`<tfoot>`, in
/// document order.
fn table_rows(table: &Node) -> Vec<&Node> {
    let mut rows = Vec::new();
    for child in table.children() {
        if child.is_element_named("tr") {
            rows.push(child);
        } else if child.is_element_named("thead")
            || child.is_element_named("tbody")
            || child.is_element_named("tfoot")
        {
            rows.extend(child.children().iter().filter(|n| n.is_element_named("tr")));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::assign_node_ids;

    /// Build a `<table>` from rows of `(rowspan, colspan)` declarations, with
    /// node ids assigned.
    fn make_table(rows: &[&[(u32, u32)]]) -> Node {
        let mut table = Node::element("table");
        for row in rows {
            let mut tr = Node::element("tr");
            for (row_span, col_span) in *row {
                let mut td = Node::element("td");
                if *row_span > 1 {
                    td.set_attribute("rowspan", Some(&row_span.to_string()));
                }
                if *col_span > 1 {
                    td.set_attribute("colspan", Some(&col_span.to_string()));
                }
                tr.append_child(td);
            }
            table.append_child(tr);
        }
        assign_node_ids(&mut table);
        table
    }

    fn owner_ids(matrix: &TableMatrix) -> Vec<Vec<Option<Id>>> {
        matrix.occupancy()
    }

    #[test]
    fn plain_grid_has_one_origin_per_coordinate() {
        let table = make_table(&[&[(1, 1), (1, 1)], &[(1, 1), (1, 1)]]);
        let matrix = TableMatrix::from_table(&table);
        assert_eq!(matrix.width(), 2);
        assert_eq!(matrix.height(), 2);
        assert_eq!(matrix.cells().len(), 4);
        for row in 0..2 {
            for col in 0..2 {
                let cell = matrix.origin_at(row, col).expect("origin everywhere");
                assert_eq!((cell.row, cell.col), (row, col));
            }
        }
    }

    #[test]
    fn carried_rowspan_shifts_later_rows_right() {
        // [ A | B ]      A has rowspan 2; row 2's first cell C must land in
        // [ A | C ]      column 1, not column 0.
        let table = make_table(&[&[(2, 1), (1, 1)], &[(1, 1)]]);
        let matrix = TableMatrix::from_table(&table);
        let a = matrix.cells()[0];
        let c = matrix.cells()[2];
        assert_eq!((a.row, a.col, a.row_span), (0, 0, 2));
        assert_eq!((c.row, c.col), (1, 1));
    }

    #[test]
    fn full_matrix_covers_span_interiors() {
        let table = make_table(&[&[(2, 2), (1, 1)], &[(1, 1)]]);
        let matrix = TableMatrix::from_table(&table);
        let full = matrix.full_matrix();

        // Cell 0 spans 2x2 anchored at (0,0).
        for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            let slot = full[row][col].expect("covered");
            assert_eq!(slot.cell, 0);
            assert_eq!(slot.is_origin, (row, col) == (0, 0));
            let cell = matrix.cells()[slot.cell];
            assert!(cell.row <= row && row < cell.row + cell.row_span);
            assert!(cell.col <= col && col < cell.col + cell.col_span);
        }
        assert_eq!(full[0][2].expect("cell B").cell, 1);
        assert_eq!(full[1][2].expect("cell C").cell, 2);
    }

    #[test]
    fn ragged_rows_leave_unowned_coordinates() {
        let table = make_table(&[&[(1, 1), (1, 1)], &[(1, 1)]]);
        let matrix = TableMatrix::from_table(&table);
        let full = matrix.full_matrix();
        assert!(full[1][1].is_none());
    }

    #[test]
    fn overhanging_rowspan_extends_the_grid() {
        let table = make_table(&[&[(3, 1)]]);
        let matrix = TableMatrix::from_table(&table);
        assert_eq!(matrix.height(), 3);
        assert_eq!(matrix.real_rows(), 1);
        assert!(matrix.full_matrix()[2][0].is_some());
    }

    #[test]
    fn overlapping_claims_resolve_last_write_wins() {
        // Row 1: A, B(rowspan 2), C. Row 2: D(colspan 2) lands at column 0
        // and its span crosses B's carried coordinate at (1,1).
        let table = make_table(&[&[(1, 1), (2, 1), (1, 1)], &[(1, 2)]]);
        let matrix = TableMatrix::from_table(&table);
        let full = matrix.full_matrix();
        let d = 3;
        assert_eq!(full[1][0].expect("D origin").cell, d);
        assert_eq!(full[1][1].expect("stolen from B").cell, d);
        assert!(!full[1][1].expect("stolen from B").is_origin);
    }

    #[test]
    fn span_plan_is_empty_for_canonical_tables() {
        let table = make_table(&[&[(2, 1), (1, 1)], &[(1, 1)]]);
        let matrix = TableMatrix::from_table(&table);
        assert!(matrix.span_plan().is_empty(), "required spans are preserved");

        let unit = make_table(&[&[(1, 1)]]);
        assert!(TableMatrix::from_table(&unit).span_plan().is_empty());
    }

    #[test]
    fn span_plan_trims_overhanging_rowspan() {
        let table = make_table(&[&[(3, 1)], &[(1, 1)]]);
        let matrix = TableMatrix::from_table(&table);
        let plan = matrix.span_plan();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].row_span, 2);
        assert_eq!(plan[0].col_span, 1);
    }

    #[test]
    fn span_plan_trims_spans_lost_to_conflicts() {
        let table = make_table(&[&[(1, 1), (2, 1), (1, 1)], &[(1, 2)]]);
        let matrix = TableMatrix::from_table(&table);
        let plan = matrix.span_plan();
        let b = matrix.cells()[1];
        assert_eq!(plan, vec![SpanChange { cell: b.cell, row_span: 1, col_span: 1 }]);
    }

    #[test]
    fn apply_span_plan_rewrites_attributes() {
        let mut table = make_table(&[&[(3, 1)], &[(1, 1)]]);
        let plan = TableMatrix::from_table(&table).span_plan();
        apply_span_plan(&mut table, &plan);

        let td = &table.children()[0].children()[0];
        assert_eq!(td.get_attribute("rowspan"), Some("2"));
        assert!(!td.has_attribute("colspan"));
    }

    #[test]
    fn optimized_table_resolves_to_identical_occupancy() {
        let tables = [
            make_table(&[&[(1, 1), (2, 1), (1, 1)], &[(1, 2)]]),
            make_table(&[&[(3, 1), (1, 1)], &[(1, 1)]]),
            make_table(&[&[(2, 2), (1, 1)], &[(1, 1)], &[(1, 3)]]),
        ];
        for mut table in tables {
            let before = TableMatrix::from_table(&table);
            let occupancy_before = owner_ids(&before);
            apply_span_plan(&mut table, &before.span_plan());
            let after = TableMatrix::from_table(&table);
            assert_eq!(owner_ids(&after), occupancy_before);
            assert!(
                after.span_plan().is_empty(),
                "optimization is idempotent"
            );
        }
    }

    #[test]
    fn rows_inside_sections_are_walked_in_order() {
        let mut table = Node::element("table");
        let mut thead = Node::element("thead");
        let mut tr = Node::element("tr");
        tr.append_child(Node::element("th"));
        thead.append_child(tr);
        table.append_child(thead);
        let mut tbody = Node::element("tbody");
        let mut tr = Node::element("tr");
        tr.append_child(Node::element("td"));
        tbody.append_child(tr);
        table.append_child(tbody);
        assign_node_ids(&mut table);

        let matrix = TableMatrix::from_table(&table);
        assert_eq!(matrix.real_rows(), 2);
        assert_eq!(matrix.cells().len(), 2);
    }

    #[test]
    fn non_cell_children_are_skipped_without_panicking() {
        let mut table = Node::element("table");
        let mut tr = Node::element("tr");
        tr.append_child(Node::text("\n  "));
        tr.append_child(Node::element("td"));
        tr.append_child(Node::Comment {
            id: Id(0),
            text: "x".to_string(),
        });
        table.append_child(tr);
        assign_node_ids(&mut table);

        let matrix = TableMatrix::from_table(&table);
        assert_eq!(matrix.cells().len(), 1);
    }

    #[test]
    fn empty_table_yields_empty_matrix() {
        let matrix = TableMatrix::from_table(&Node::element("table"));
        assert_eq!(matrix.width(), 0);
        assert_eq!(matrix.height(), 0);
        assert!(matrix.cells().is_empty());
        assert!(matrix.span_plan().is_empty());
    }
}
