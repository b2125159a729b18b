use crate::dom::NodeId;
use crate::gesture::Point;

/// Input delivered to the page by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Pointer activation; `target` is the innermost element hit.
    Click { target: NodeId },
    Key(Key),
    Touch {
        phase: TouchPhase,
        target: NodeId,
        point: Point,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Self::Escape,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            other => Self::Other(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
}
