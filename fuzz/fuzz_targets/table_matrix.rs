#![no_main]

use editml::{
    Deserializer, Node, RendererQuirks, TableMatrix, apply_span_plan, assign_node_ids,
};
use libfuzzer_sys::fuzz_target;

fn tables(node: &Node, out: &mut Vec<Node>) {
    if node.is_element_named("table") {
        out.push(node.clone());
    }
    for child in node.children() {
        tables(child, out);
    }
}

// Build a matrix from every table in arbitrary markup, apply the span plan,
// and check that rebuilding reproduces the same occupancy.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let mut root = Node::fragment();
    Deserializer::new(RendererQuirks::None).deserialize(input, &mut root);
    assign_node_ids(&mut root);
    let mut found = Vec::new();
    for child in root.children() {
        tables(child, &mut found);
    }
    for mut table in found {
        let before = TableMatrix::from_table(&table);
        let occupancy = before.occupancy();
        let plan = before.span_plan();
        apply_span_plan(&mut table, &plan);
        let after = TableMatrix::from_table(&table);
        assert_eq!(after.occupancy(), occupancy);
        assert!(after.span_plan().is_empty());
    }
});
