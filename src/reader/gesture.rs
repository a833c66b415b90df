use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved right-to-left: advance.
    Left,
    /// Finger moved left-to-right: go back.
    Right,
}

/// Swipe thresholds, measured in terminal cells for mouse drags.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Minimum horizontal travel.
    pub threshold: f32,
    /// Largest vertical travel still counted as a horizontal swipe.
    pub max_vertical_drift: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold: 10.0,
            max_vertical_drift: 4.0,
        }
    }
}

impl SwipeConfig {
    pub fn classify(&self, start: (f32, f32), end: (f32, f32)) -> Option<Swipe> {
        let dx = end.0 - start.0;
        let dy = end.1 - start.1;

        if dx.abs() <= self.threshold || dy.abs() >= self.max_vertical_drift {
            return None;
        }

        if dx < 0.0 {
            Some(Swipe::Left)
        } else {
            Some(Swipe::Right)
        }
    }
}

/// Pairs a press with its release.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
}

impl SwipeTracker {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    pub fn end(&mut self, x: f32, y: f32, config: &SwipeConfig) -> Option<Swipe> {
        let start = self.start.take()?;
        config.classify(start, (x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch() -> SwipeConfig {
        SwipeConfig {
            threshold: 50.0,
            max_vertical_drift: 100.0,
        }
    }

    #[test]
    fn test_horizontal_swipes() {
        let config = touch();
        assert_eq!(config.classify((300.0, 200.0), (200.0, 210.0)), Some(Swipe::Left));
        assert_eq!(config.classify((100.0, 200.0), (220.0, 180.0)), Some(Swipe::Right));
    }

    #[test]
    fn test_short_swipe_ignored() {
        let config = touch();
        assert_eq!(config.classify((100.0, 100.0), (150.0, 100.0)), None);
    }

    #[test]
    fn test_vertical_drift_rejects_swipe() {
        let config = touch();
        assert_eq!(config.classify((300.0, 100.0), (100.0, 250.0)), None);
    }

    #[test]
    fn test_terminal_defaults() {
        let config = SwipeConfig::default();
        assert_eq!(config.classify((40.0, 10.0), (25.0, 11.0)), Some(Swipe::Left));
        assert_eq!(config.classify((40.0, 10.0), (35.0, 10.0)), None);
    }

    #[test]
    fn test_tracker_needs_a_start() {
        let config = touch();
        let mut tracker = SwipeTracker::default();
        assert_eq!(tracker.end(0.0, 0.0, &config), None);

        tracker.begin(400.0, 50.0);
        assert_eq!(tracker.end(100.0, 60.0, &config), Some(Swipe::Left));
        assert_eq!(tracker.end(0.0, 60.0, &config), None);
    }
}
