//! Element builders for stream, grid, and feature items.

use crate::catalog::ImageDescriptor;
use crate::dom::{Document, NodeId};
use crate::markup::{
    FEATURE_ITEM_CLASS, GALLERY_ITEM_CLASS, LIGHTBOX_TRIGGER_CLASS, NAV_KEY_ATTR, REVEAL_ATTR,
    STREAM_ITEM_CLASS,
};

/// Intrinsic size of stream and grid images.
pub const ITEM_SIZE: (u32, u32) = (1200, 900);
/// Intrinsic size of the feature image.
pub const FEATURE_SIZE: (u32, u32) = (1600, 1000);

fn image(doc: &mut Document, descriptor: &ImageDescriptor, (width, height): (u32, u32)) -> NodeId {
    let img = doc.create_element("img");
    doc.set_attr(img, "src", descriptor.src.as_str());
    doc.set_attr(img, "alt", descriptor.alt_or_default());
    doc.set_attr(img, "loading", "lazy");
    doc.set_attr(img, "decoding", "async");
    doc.set_attr(img, "width", width.to_string());
    doc.set_attr(img, "height", height.to_string());
    img
}

fn container(doc: &mut Document, classes: &[&str]) -> NodeId {
    let figure = doc.create_element("figure");
    for class in classes {
        doc.add_class(figure, class);
    }
    doc.set_attr(figure, REVEAL_ATTR, "");
    figure
}

fn trigger(doc: &mut Document, descriptor: &ImageDescriptor) -> NodeId {
    let button = doc.create_element("button");
    doc.set_attr(button, "class", LIGHTBOX_TRIGGER_CLASS);
    doc.set_attr(button, "type", "button");
    doc.set_attr(button, NAV_KEY_ATTR, descriptor.src.as_str());
    doc.set_attr(
        button,
        "aria-label",
        format!("Open {}", descriptor.alt_or_default()),
    );
    button
}

/// `figure.stream-item[data-reveal] > img`
pub fn stream_item(doc: &mut Document, descriptor: &ImageDescriptor) -> NodeId {
    let figure = container(doc, &[STREAM_ITEM_CLASS]);
    let img = image(doc, descriptor, ITEM_SIZE);
    doc.append_child(figure, img);
    figure
}

/// `figure.gallery-item[data-reveal] > button.lightbox-trigger > img`
pub fn gallery_item(doc: &mut Document, descriptor: &ImageDescriptor) -> NodeId {
    let figure = container(doc, &[GALLERY_ITEM_CLASS]);
    let button = trigger(doc, descriptor);
    let img = image(doc, descriptor, ITEM_SIZE);
    doc.append_child(button, img);
    doc.append_child(figure, button);
    figure
}

/// Same shape as a gallery item, rendered at the larger feature size.
pub fn feature_item(doc: &mut Document, descriptor: &ImageDescriptor) -> NodeId {
    let figure = container(doc, &[GALLERY_ITEM_CLASS, FEATURE_ITEM_CLASS]);
    let button = trigger(doc, descriptor);
    let img = image(doc, descriptor, FEATURE_SIZE);
    doc.append_child(button, img);
    doc.append_child(figure, button);
    figure
}
