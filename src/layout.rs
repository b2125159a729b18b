//! Block layout for the headless page: every element spans the full width
//! and children stack top to bottom.

use crate::dom::{Document, NodeId, Rect};
use crate::markup::{LIGHTBOX_CLASS, REVEAL_ATTR};

/// Height given to empty reveal sections (text blocks in a real page).
pub const PLACEHOLDER_HEIGHT: f64 = 240.0;

/// Height of an image of intrinsic size `w`x`h` scaled to `width`.
pub fn aspect_height(width: f64, w: u32, h: u32) -> f64 {
    if w == 0 {
        return 0.0;
    }
    width * f64::from(h) / f64::from(w)
}

fn intrinsic_size(doc: &Document, img: NodeId) -> Option<(u32, u32)> {
    let w = doc.attr(img, "width")?.parse().ok()?;
    let h = doc.attr(img, "height")?.parse().ok()?;
    Some((w, h))
}

fn leaf_height(doc: &Document, node: NodeId, width: f64) -> f64 {
    if doc.tag(node) == Some("img") {
        return intrinsic_size(doc, node)
            .map(|(w, h)| aspect_height(width, w, h))
            .unwrap_or(PLACEHOLDER_HEIGHT);
    }
    if doc.has_attr(node, REVEAL_ATTR) {
        PLACEHOLDER_HEIGHT
    } else {
        0.0
    }
}

/// Lay out `node` and its subtree starting at `top`. Hidden elements and the
/// fixed-position lightbox take no space. Returns the bottom edge.
pub fn layout_block(doc: &mut Document, node: NodeId, top: f64, width: f64) -> f64 {
    if doc.has_attr(node, "hidden") || doc.has_class(node, LIGHTBOX_CLASS) {
        doc.set_rect(node, Rect::new(0.0, top, width, 0.0));
        return top;
    }
    let children = doc.children(node).to_vec();
    let bottom = if children.is_empty() {
        top + leaf_height(doc, node, width)
    } else {
        children
            .into_iter()
            .fold(top, |y, child| layout_block(doc, child, y, width))
    };
    doc.set_rect(node, Rect::new(0.0, top, width, bottom - top));
    bottom
}

/// Lay out the whole document. Returns the page height.
pub fn layout_page(doc: &mut Document, width: f64) -> f64 {
    let body = doc.body();
    layout_block(doc, body, 0.0, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ImageDescriptor;
    use crate::items;

    #[test]
    fn items_stack_by_aspect_ratio() {
        let mut doc = Document::new();
        let body = doc.body();
        let first = items::stream_item(&mut doc, &ImageDescriptor::new("a.jpg"));
        let second = items::feature_item(&mut doc, &ImageDescriptor::new("b.jpg"));
        doc.append_child(body, first);
        doc.append_child(body, second);

        let height = layout_page(&mut doc, 400.0);
        assert_eq!(doc.rect(first), Some(Rect::new(0.0, 0.0, 400.0, 300.0)));
        assert_eq!(doc.rect(second), Some(Rect::new(0.0, 300.0, 400.0, 250.0)));
        assert_eq!(height, 550.0);
    }

    #[test]
    fn hidden_elements_take_no_space() {
        let mut doc = Document::new();
        let body = doc.body();
        let loading = doc.create_element("div");
        doc.set_attr(loading, "hidden", "");
        doc.set_attr(loading, REVEAL_ATTR, "");
        doc.append_child(body, loading);
        assert_eq!(layout_page(&mut doc, 400.0), 0.0);
    }
}
