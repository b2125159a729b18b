//! Touch gesture tracking and swipe classification for the lightbox.

/// Horizontal travel, in pixels, that must be exceeded to count as a swipe.
pub const SWIPE_X_THRESHOLD: f64 = 50.0;
/// Vertical travel, in pixels, that must be exceeded to count as a swipe.
pub const SWIPE_Y_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Prev,
    Next,
}

/// Per-gesture record, reset on every touch start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub start: Point,
    pub last: Point,
    pub started_on_control: bool,
}

impl Gesture {
    pub fn begin(at: Point, started_on_control: bool) -> Self {
        Self {
            start: at,
            last: at,
            started_on_control,
        }
    }

    pub fn track(&mut self, at: Point) {
        self.last = at;
    }

    pub fn delta(&self) -> (f64, f64) {
        (self.last.x - self.start.x, self.last.y - self.start.y)
    }

    /// Navigation step for the finished gesture, or `None` when it began on a
    /// lightbox control (the control's own click handles it).
    pub fn finish(&self) -> Option<Step> {
        if self.started_on_control {
            return None;
        }
        let (dx, dy) = self.delta();
        Some(classify(dx, dy))
    }
}

/// Map finger travel to a step. Thresholds are exclusive; anything that is
/// neither a horizontal nor a vertical swipe is a tap and advances.
pub fn classify(dx: f64, dy: f64) -> Step {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax > SWIPE_X_THRESHOLD && ax > ay {
        if dx > 0.0 { Step::Prev } else { Step::Next }
    } else if ay > SWIPE_Y_THRESHOLD {
        if dy > 0.0 { Step::Prev } else { Step::Next }
    } else {
        Step::Next
    }
}
