use shared::Label;

/// Scores strictly above this are labelled fake.
pub const FAKE_THRESHOLD: f32 = 0.5;

pub fn classify(score: f32) -> Label {
    if score > FAKE_THRESHOLD {
        Label::Fake
    } else {
        Label::Real
    }
}
