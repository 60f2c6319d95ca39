pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::collections::{BTreeMap, HashMap};

/// One frame of named joint angles, as produced by the angle calculator.
///
/// Keys follow `<limb>_<joint>` (e.g. `right_elbow`). A missing key and a
/// key mapped to `None` both mean "no reading" for that joint this frame.
pub trait AngleFrame {
    fn angle(&self, key: &str) -> Option<f32>;
}

impl AngleFrame for HashMap<String, Option<f32>> {
    fn angle(&self, key: &str) -> Option<f32> {
        self.get(key).copied().flatten()
    }
}

impl AngleFrame for BTreeMap<String, Option<f32>> {
    fn angle(&self, key: &str) -> Option<f32> {
        self.get(key).copied().flatten()
    }
}

impl<F: AngleFrame + ?Sized> AngleFrame for &F {
    fn angle(&self, key: &str) -> Option<f32> {
        (**self).angle(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_keys_read_as_none() {
        let mut frame: HashMap<String, Option<f32>> = HashMap::new();
        frame.insert("right_elbow".into(), Some(42.5));
        frame.insert("left_elbow".into(), None);
        assert_eq!(frame.angle("right_elbow"), Some(42.5));
        assert_eq!(frame.angle("left_elbow"), None);
        assert_eq!(frame.angle("right_knee"), None);
        assert_eq!((&frame).angle("right_elbow"), Some(42.5));
    }
}
