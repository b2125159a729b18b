//! Names of the page roles the components bind to, plus a skeleton page
//! carrying every role.

use crate::dom::{Document, NodeId};

pub const REVEAL_ATTR: &str = "data-reveal";
pub const VISIBLE_CLASS: &str = "visible";

pub const STREAM_ITEM_CLASS: &str = "stream-item";
pub const GALLERY_ITEM_CLASS: &str = "gallery-item";
pub const FEATURE_ITEM_CLASS: &str = "gallery-item--feature";

pub const LIGHTBOX_CLASS: &str = "lightbox";
pub const LIGHTBOX_IMAGE_CLASS: &str = "lightbox-image";
pub const LIGHTBOX_CLOSE_CLASS: &str = "lightbox-close";
pub const LIGHTBOX_NAV_CLASS: &str = "lightbox-nav";
pub const LIGHTBOX_TRIGGER_CLASS: &str = "lightbox-trigger";
pub const OPEN_CLASS: &str = "open";

/// Attribute carrying an activation control's navigation key.
pub const NAV_KEY_ATTR: &str = "data-src";

pub const STREAM_ID: &str = "home-stream";
pub const STREAM_LOADING_ID: &str = "stream-loading";
pub const STREAM_SENTINEL_ID: &str = "stream-sentinel";
pub const GALLERY_FEATURE_ID: &str = "gallery-feature";
pub const GALLERY_GRID_ID: &str = "gallery-grid";

fn child(doc: &mut Document, parent: NodeId, tag: &str, class: Option<&str>) -> NodeId {
    let node = doc.create_element(tag);
    if let Some(class) = class {
        doc.set_attr(node, "class", class);
    }
    doc.append_child(parent, node);
    node
}

/// Build a document with every role present: an intro section tagged for
/// reveal, the gallery slots, the home stream with its loading indicator
/// and sentinel, and the lightbox.
pub fn skeleton() -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    let intro = child(&mut doc, body, "section", Some("intro"));
    doc.set_attr(intro, REVEAL_ATTR, "");

    let gallery = child(&mut doc, body, "section", Some("gallery"));
    let feature = child(&mut doc, gallery, "div", Some("gallery-feature"));
    doc.set_attr(feature, "id", GALLERY_FEATURE_ID);
    let grid = child(&mut doc, gallery, "div", Some("gallery-grid"));
    doc.set_attr(grid, "id", GALLERY_GRID_ID);

    let stream_section = child(&mut doc, body, "section", Some("stream"));
    let stream = child(&mut doc, stream_section, "div", Some("stream-list"));
    doc.set_attr(stream, "id", STREAM_ID);
    let loading = child(&mut doc, stream_section, "div", Some("stream-loading"));
    doc.set_attr(loading, "id", STREAM_LOADING_ID);
    doc.set_attr(loading, "hidden", "");
    let sentinel = child(&mut doc, stream_section, "div", Some("stream-sentinel"));
    doc.set_attr(sentinel, "id", STREAM_SENTINEL_ID);
    doc.set_attr(sentinel, "aria-hidden", "true");

    let lightbox = child(&mut doc, body, "div", Some(LIGHTBOX_CLASS));
    doc.set_attr(lightbox, "aria-hidden", "true");
    doc.set_attr(lightbox, "role", "dialog");
    let close = child(&mut doc, lightbox, "button", Some(LIGHTBOX_CLOSE_CLASS));
    doc.set_attr(close, "aria-label", "Close");
    let prev = child(&mut doc, lightbox, "button", Some("lightbox-nav prev"));
    doc.set_attr(prev, "aria-label", "Previous image");
    let image = child(&mut doc, lightbox, "img", Some(LIGHTBOX_IMAGE_CLASS));
    doc.set_attr(image, "alt", "");
    let next = child(&mut doc, lightbox, "button", Some("lightbox-nav next"));
    doc.set_attr(next, "aria-label", "Next image");

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_carries_every_role() {
        let doc = skeleton();
        for id in [
            STREAM_ID,
            STREAM_LOADING_ID,
            STREAM_SENTINEL_ID,
            GALLERY_FEATURE_ID,
            GALLERY_GRID_ID,
        ] {
            assert!(doc.find_by_id(id).is_some(), "missing #{id}");
        }
        assert!(doc.find_first_by_classes(&[LIGHTBOX_NAV_CLASS, "prev"]).is_some());
        assert!(doc.find_first_by_classes(&[LIGHTBOX_NAV_CLASS, "next"]).is_some());
        assert_eq!(doc.find_by_attr(REVEAL_ATTR).len(), 1);
    }
}
