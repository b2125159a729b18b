pub mod catalog;
pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod gesture;
pub mod items;
pub mod layout;
pub mod markup;
pub mod observer;
pub mod page;
pub mod tasks {
    pub mod gallery;
    pub mod lightbox;
    pub mod reveal;
    pub mod stream;
}
