#![no_main]

use editml::{Deserializer, HtmlSerializer, MarkupSerializer, Node, RendererQuirks};
use libfuzzer_sys::fuzz_target;

// Deserialize arbitrary markup, serialize it, and deserialize the result
// again. None of the stages may panic, and the serialized form must be
// re-parseable.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    for quirks in [RendererQuirks::None, RendererQuirks::LegacyAnchorWorkaround] {
        let deserializer = Deserializer::new(quirks);
        let mut root = Node::fragment();
        deserializer.deserialize(input, &mut root);
        let html = HtmlSerializer.serialize(&root);
        let mut reparsed = Node::fragment();
        deserializer.deserialize(&html, &mut reparsed);
    }
});
