use crate::models::{DragSample, SwipeDirection};

/// Minimum drag distance, in logical pixels, for a positional swipe.
pub const DISTANCE_THRESHOLD: f32 = 50.0;
/// Minimum release velocity, in pixels per second, for a flick swipe.
pub const VELOCITY_THRESHOLD: f32 = 200.0;

/// Classify the release sample of a drag gesture into a terminal direction.
///
/// Returns `None` when no threshold is crossed; the caller is expected to
/// animate the card back to rest. The tie-break rules are deliberate:
/// a vertical swipe only wins when the vertical offset dominates the
/// horizontal one, otherwise right is checked before left.
pub fn classify(sample: DragSample) -> Option<SwipeDirection> {
    let swipe_right =
        sample.offset_x > DISTANCE_THRESHOLD || sample.velocity_x > VELOCITY_THRESHOLD;
    let swipe_left =
        sample.offset_x < -DISTANCE_THRESHOLD || sample.velocity_x < -VELOCITY_THRESHOLD;
    let swipe_up =
        sample.offset_y < -DISTANCE_THRESHOLD || sample.velocity_y < -VELOCITY_THRESHOLD;

    if swipe_up && sample.offset_y.abs() > sample.offset_x.abs() {
        Some(SwipeDirection::Up)
    } else if swipe_right {
        Some(SwipeDirection::Right)
    } else if swipe_left {
        Some(SwipeDirection::Left)
    } else {
        None
    }
}

/// Accumulates the samples of one continuous gesture. Only the release
/// sample decides the outcome; earlier samples are overwritten as the
/// pointer moves.
#[derive(Debug, Default)]
pub struct Gesture {
    last: Option<DragSample>,
}

impl Gesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: DragSample) {
        self.last = Some(sample);
    }

    /// Consume the gesture on pointer release.
    pub fn release(self) -> Option<SwipeDirection> {
        self.last.and_then(classify)
    }
}
