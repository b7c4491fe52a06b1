//! DOM-independent core of a rich-text editor: start-tag and stream parsing,
//! HTML/XHTML fragment serialization, and the logical table grid behind
//! row/colspan editing commands.
//!
//! Everything here is synchronous, CPU-bound string/tree work with a
//! best-effort error model: malformed markup is parsed as far as it goes,
//! structural anomalies resolve deterministically (last write wins), and no
//! public operation panics or returns an error type. Parse failures surface
//! as `None`.

pub mod dom;
#[cfg(any(test, feature = "dom-snapshot"))]
pub mod snapshot;

mod deserializer;
mod entities;
mod serializer;
mod stream;
mod table;
mod tag;

pub use crate::deserializer::{
    ANCHOR_MARKER_CLASS, ANCHOR_NAME_ATTR, Deserializer, FILLER_ATTR, ORIGINAL_HREF_ATTR,
    ORIGINAL_SRC_ATTR, RendererQuirks,
};
pub use crate::dom::{Id, Node, NodeId, assign_node_ids, find_node_by_id, find_node_by_id_mut};
pub use crate::serializer::{HtmlSerializer, MarkupSerializer, SerializeOptions, XhtmlSerializer};
pub use crate::stream::{IdentityTransform, TokenTransform, parse_html};
pub use crate::table::{MatrixSlot, SpanChange, TableCellRef, TableMatrix, apply_span_plan};
pub use crate::tag::{ParsedTag, TagAttribute, parse_tag};
