use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{EmptyCourseError, Vec2};

/// A fixed point a vehicle should fly to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target {
    position: Vec2,
}

impl Target {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }

    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }
}

/// Non-empty cyclic sequence of targets shared by a whole generation.
///
/// Cloning a course is cheap: all clones share the same storage. Vehicles
/// never hold a course; they keep an index and receive the course on every
/// step.
///
/// ```
/// use hovolve_engine::{Course, Target};
///
/// let course = Course::new([Target::new(0.0, 0.0), Target::new(10.0, 0.0)]).unwrap();
/// assert_eq!(course.next_index(0), 1);
/// assert_eq!(course.next_index(1), 0);
/// assert!(Course::new(Vec::new()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Target>", into = "Vec<Target>")]
pub struct Course {
    targets: Arc<[Target]>,
}

impl Course {
    pub fn new<T>(targets: T) -> Result<Self, EmptyCourseError>
    where
        T: Into<Vec<Target>>,
    {
        let targets = targets.into();
        if targets.is_empty() {
            return Err(EmptyCourseError);
        }
        Ok(Self {
            targets: targets.into(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Returns the target at `index`, wrapping around the end of the course.
    #[must_use]
    pub fn target(&self, index: usize) -> &Target {
        &self.targets[index % self.targets.len()]
    }

    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.targets.len()
    }
}

impl Default for Course {
    fn default() -> Self {
        Self {
            targets: Arc::new([
                Target::new(775.0, 752.0),
                Target::new(814.0, 124.0),
                Target::new(509.0, 370.0),
                Target::new(894.0, 519.0),
                Target::new(194.0, 579.0),
                Target::new(611.0, 506.0),
                Target::new(600.0, 481.0),
                Target::new(188.0, 251.0),
            ]),
        }
    }
}

impl TryFrom<Vec<Target>> for Course {
    type Error = EmptyCourseError;

    fn try_from(targets: Vec<Target>) -> Result<Self, Self::Error> {
        Self::new(targets)
    }
}

impl From<Course> for Vec<Target> {
    fn from(course: Course) -> Self {
        course.targets.to_vec()
    }
}

/// Capture radius and dwell time deciding when a target counts as reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingParams {
    /// px
    pub capture_radius: f64,
    /// s
    pub dwell_time: f64,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self {
            capture_radius: 10.0,
            dwell_time: 0.5,
        }
    }
}

/// Per-vehicle progress along a [`Course`].
///
/// A target is reached once the vehicle has stayed strictly inside the
/// capture radius for strictly longer than the dwell time. Leaving the radius
/// before that discards the accumulated dwell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointProgress {
    target_index: usize,
    reached: u32,
    time_at_target: f64,
}

impl WaypointProgress {
    #[must_use]
    pub const fn target_index(&self) -> usize {
        self.target_index
    }

    #[must_use]
    pub const fn reached(&self) -> u32 {
        self.reached
    }

    #[must_use]
    pub const fn time_at_target(&self) -> f64 {
        self.time_at_target
    }

    /// Updates dwell state for a step of `dt` seconds ended at `distance` from
    /// the current target. Returns `true` when the vehicle advanced to the next
    /// target.
    pub fn update(
        &mut self,
        distance: f64,
        dt: f64,
        course: &Course,
        params: &TrackingParams,
    ) -> bool {
        if distance >= params.capture_radius || distance.is_nan() {
            self.time_at_target = 0.0;
            return false;
        }

        self.time_at_target += dt;
        if self.time_at_target <= params.dwell_time {
            return false;
        }

        self.target_index = course.next_index(self.target_index);
        self.reached += 1;
        self.time_at_target = 0.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.016;

    fn two_targets() -> Course {
        Course::new([Target::new(0.0, 0.0), Target::new(100.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_default_course_has_eight_targets() {
        let course = Course::default();
        assert_eq!(course.len(), 8);
        assert_eq!(course.target(0).position(), Vec2::new(775.0, 752.0));
        assert_eq!(course.target(8), course.target(0));
    }

    #[test]
    fn test_dwell_must_exceed_threshold() {
        let course = two_targets();
        let params = TrackingParams::default();
        let mut progress = WaypointProgress::default();

        // 31 steps = 0.496 s, not yet past 0.5 s
        for _ in 0..31 {
            assert!(!progress.update(2.0, DT, &course, &params));
        }
        assert_eq!(progress.reached(), 0);

        assert!(progress.update(2.0, DT, &course, &params));
        assert_eq!(progress.reached(), 1);
        assert_eq!(progress.target_index(), 1);
        assert_eq!(progress.time_at_target(), 0.0);
    }

    #[test]
    fn test_leaving_radius_resets_dwell() {
        let course = two_targets();
        let params = TrackingParams::default();
        let mut progress = WaypointProgress::default();

        for _ in 0..30 {
            progress.update(5.0, DT, &course, &params);
        }
        progress.update(10.0, DT, &course, &params);
        assert_eq!(progress.time_at_target(), 0.0);

        for _ in 0..30 {
            progress.update(5.0, DT, &course, &params);
        }
        assert_eq!(progress.reached(), 0);
    }

    #[test]
    fn test_advances_cyclically() {
        let course = two_targets();
        let params = TrackingParams {
            capture_radius: 10.0,
            dwell_time: 0.0,
        };
        let mut progress = WaypointProgress::default();
        let indices: Vec<usize> = (0..4)
            .map(|_| {
                progress.update(0.0, DT, &course, &params);
                progress.target_index()
            })
            .collect();
        assert_eq!(indices, vec![1, 0, 1, 0]);
        assert_eq!(progress.reached(), 4);
    }

    #[test]
    fn test_course_serde_validates() {
        let course: Course = serde_json::from_str(r#"[{"x":1.0,"y":2.0}]"#).unwrap();
        assert_eq!(course.target(0).position(), Vec2::new(1.0, 2.0));
        assert!(serde_json::from_str::<Course>("[]").is_err());
    }
}
