//! JSON-backed table fixtures.
//!
//! A fixture describes a table by its cell span declarations and the
//! expected ownership pattern as letter grids: cell `k` (document order) is
//! letter `A + k`, unowned coordinates are `.`.

use editml::{Node, assign_node_ids};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TableFixture {
    pub name: String,
    /// Rows of `[rowspan, colspan]` cell declarations.
    pub rows: Vec<Vec<[u32; 2]>>,
    /// Expected ownership over real rows, one string per row.
    pub occupancy: Vec<String>,
    /// Expected `[rowspan, colspan]` per cell after span optimization;
    /// omitted when the table is already canonical.
    #[serde(default)]
    pub optimized_spans: Option<Vec<[u32; 2]>>,
}

pub fn load_fixtures(json: &str) -> Vec<TableFixture> {
    serde_json::from_str(json).unwrap_or_else(|err| panic!("invalid table fixture JSON: {err}"))
}

/// Build the fixture's `<table>` tree with node ids assigned.
pub fn build_table(fixture: &TableFixture) -> Node {
    let mut table = Node::element("table");
    for row in &fixture.rows {
        let mut tr = Node::element("tr");
        for [row_span, col_span] in row {
            let mut td = Node::element("td");
            if *row_span != 1 {
                td.set_attribute("rowspan", Some(&row_span.to_string()));
            }
            if *col_span != 1 {
                td.set_attribute("colspan", Some(&col_span.to_string()));
            }
            tr.append_child(td);
        }
        table.append_child(tr);
    }
    assign_node_ids(&mut table);
    table
}

/// Decode an occupancy letter grid into per-coordinate cell indices.
pub fn decode_occupancy(rows: &[String]) -> Vec<Vec<Option<usize>>> {
    rows.iter()
        .map(|row| {
            row.chars()
                .map(|ch| match ch {
                    '.' => None,
                    'A'..='Z' => Some(ch as usize - 'A' as usize),
                    other => panic!("invalid occupancy char {other:?}"),
                })
                .collect()
        })
        .collect()
}
