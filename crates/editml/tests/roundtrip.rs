//! Deserialize→serialize round trips. The contract is semantic equivalence
//! after whitespace normalization, not byte equality; the exact-output cases
//! below are the canonicalization rules themselves.

use editml::{
    Deserializer, HtmlSerializer, MarkupSerializer, Node, RendererQuirks, SerializeOptions,
    XhtmlSerializer,
};
use editml_test_support::normalize_markup;

fn roundtrip_html(input: &str) -> String {
    roundtrip_with(input, RendererQuirks::None, &HtmlSerializer)
}

fn roundtrip_with(
    input: &str,
    quirks: RendererQuirks,
    serializer: &impl MarkupSerializer,
) -> String {
    let mut root = Node::fragment();
    Deserializer::new(quirks).deserialize(input, &mut root);
    serializer.serialize(&root)
}

#[test]
fn empty_paragraph_canonicalizes_exactly() {
    assert_eq!(roundtrip_html("<p></p>"), "<p>&nbsp;</p>\n");
    assert_eq!(roundtrip_html("<p>&nbsp;</p>"), "<p>&nbsp;</p>\n");
    assert_eq!(roundtrip_html("<p>   </p>"), "<p>&nbsp;</p>\n");
}

#[test]
fn non_breaking_space_survives_as_entity() {
    let out = roundtrip_html("<p>a&nbsp;b</p>");
    assert!(out.contains("a&nbsp;b"), "got: {out}");
}

#[test]
fn literal_nbsp_character_encodes_as_entity() {
    let out = roundtrip_html("<p>a\u{00A0}b</p>");
    assert!(out.contains("a&nbsp;b"), "got: {out}");
}

#[test]
fn table_gains_explicit_tbody() {
    let out = roundtrip_html("<table><tr><td>x</td></tr></table>");
    assert_eq!(
        normalize_markup(&out),
        "<table><tbody><tr><td>x</td></tr></tbody></table>"
    );
}

#[test]
fn serialization_is_a_fixed_point_after_one_pass() {
    let inputs = [
        "<p></p>",
        "<h1>Title</h1>\n<p>Body text with <b>bold</b> runs.</p>",
        "<table><tr><td>a</td><td rowspan=\"2\">b</td></tr><tr><td>c</td></tr></table>",
        "<ul><li>one</li><li>two</li></ul>",
        "<p>1 &lt; 2 &amp; 3 &gt; 2</p>",
    ];
    for input in inputs {
        let once = roundtrip_html(input);
        let twice = roundtrip_html(&once);
        assert_eq!(
            normalize_markup(&twice),
            normalize_markup(&once),
            "not a fixed point for {input}"
        );
    }
}

#[test]
fn xhtml_round_trip_closes_void_elements() {
    let input = "<p>a<br>b</p>";
    let short = roundtrip_with(
        input,
        RendererQuirks::None,
        &XhtmlSerializer::new(SerializeOptions {
            use_short_tags: true,
        }),
    );
    assert_eq!(short, "<p>a<br />b</p>\n");
    let long = roundtrip_with(
        input,
        RendererQuirks::None,
        &XhtmlSerializer::new(SerializeOptions {
            use_short_tags: false,
        }),
    );
    assert_eq!(long, "<p>a<br></br>b</p>\n");
}

#[test]
fn shadow_attributes_never_reach_the_output() {
    let out = roundtrip_html("<p><a href=\"https://example.com\">x</a></p>");
    assert!(!out.contains("data-original-href"), "got: {out}");
    assert!(out.contains("href=\"https://example.com\""), "got: {out}");

    let out = roundtrip_html("<p><img src=\"pic.png\"></p>");
    assert!(!out.contains("data-original-src"), "got: {out}");
}

#[test]
fn anchor_workaround_round_trips_to_the_same_anchor() {
    let input = "<p><a name=\"section-2\"></a>after</p>";
    let out = roundtrip_with(input, RendererQuirks::LegacyAnchorWorkaround, &HtmlSerializer);
    assert_eq!(out, "<p><a name=\"section-2\"></a>after</p>\n");
}

#[test]
fn text_entities_are_re_encoded_on_output() {
    let out = roundtrip_html("<p>1 &lt; 2 &amp; 3 &gt; 2</p>");
    assert_eq!(out, "<p>1 &lt; 2 &amp; 3 &gt; 2</p>\n");
}

#[test]
fn nested_structure_survives_semantically() {
    let input = "<div>\n  <h2>Head</h2>\n  <p>One <i>two</i> three</p>\n</div>";
    let out = roundtrip_html(input);
    assert_eq!(
        normalize_markup(&out),
        "<div><h2>Head</h2><p>One <i>two</i> three</p></div>"
    );
}
