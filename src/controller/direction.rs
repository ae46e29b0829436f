//! # Direction Mapper Module
//!
//! Maps the touch sensor and the infrared proximity reading onto four
//! directional keys.
//!
//! ## Zones
//!
//! The proximity reading is folded, offset and cut into zones of
//! `bucket_width` units. With the default parameters (saturation 60,
//! zero offset 12, width 12):
//!
//! | Proximity | Adjusted | Bucket | Direction |
//! |-----------|----------|--------|-----------|
//! | 0 | -12 | -1 | none |
//! | 12 | 0 | 0 | Right |
//! | 24 | 12 | 1 | Up |
//! | 36 | 24 | 2 | Down |
//! | 48 | 36 | 3 | Left |
//! | 60 | 48 | 4 | none |
//! | > 60 | 0 | 0 | Right (saturated) |
//!
//! Rounding is to the nearest integer with ties to even, followed by
//! truncating integer division, so small negative offsets (down to -11)
//! still land in bucket 0.
//!
//! ## Usage
//!
//! ```
//! use funkin_ctrl::controller::direction::{Direction, DirectionMapper};
//!
//! let mapper = DirectionMapper::default();
//! assert_eq!(mapper.select(true, 24.0), Some(Direction::Up));
//! assert_eq!(mapper.select(false, 24.0), None);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::keys::KeyCode;
use super::toggle::KeyToggle;
use crate::error::Result;
use crate::inject::KeyInjector;

/// Default proximity above which a reading counts as saturated.
pub const DEFAULT_SATURATION_THRESHOLD: f32 = 60.0;

/// Default dead-zone offset subtracted from every reading.
pub const DEFAULT_ZERO_OFFSET: f32 = 12.0;

/// Default zone width in proximity units.
pub const DEFAULT_BUCKET_WIDTH: u32 = 12;

/// Number of directional keys.
pub const DIRECTION_COUNT: usize = 4;

/// One of the four directional keys, in toggle index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Right,
    Up,
    Down,
    Left,
}

impl Direction {
    /// All directions in toggle index order.
    pub const ALL: [Direction; DIRECTION_COUNT] =
        [Direction::Right, Direction::Up, Direction::Down, Direction::Left];

    /// Toggle index of this direction (0..=3).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Up => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Direction for a bucket, or `None` if the bucket is outside 0..=3.
    #[must_use]
    pub fn from_bucket(bucket: i64) -> Option<Self> {
        usize::try_from(bucket)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Calibration of the proximity-to-zone conversion.
///
/// # Examples
///
/// ```
/// use funkin_ctrl::controller::direction::MappingParams;
///
/// let params = MappingParams::default();
/// assert_eq!(params.bucket(12.0), Some(0));
/// assert_eq!(params.bucket(0.0), Some(-1));
/// assert_eq!(params.bucket(f32::NAN), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingParams {
    saturation_threshold: f32,
    zero_offset: f32,
    bucket_width: u32,
}

impl Default for MappingParams {
    fn default() -> Self {
        Self {
            saturation_threshold: DEFAULT_SATURATION_THRESHOLD,
            zero_offset: DEFAULT_ZERO_OFFSET,
            bucket_width: DEFAULT_BUCKET_WIDTH,
        }
    }
}

impl MappingParams {
    /// Creates mapping parameters.
    ///
    /// # Arguments
    ///
    /// * `saturation_threshold` - Readings above this fold back to `zero_offset`
    /// * `zero_offset` - Subtracted from every reading before bucketing
    /// * `bucket_width` - Zone width. Zero is raised to 1.
    #[must_use]
    pub fn new(saturation_threshold: f32, zero_offset: f32, bucket_width: u32) -> Self {
        Self {
            saturation_threshold,
            zero_offset,
            bucket_width: bucket_width.max(1),
        }
    }

    #[must_use]
    pub fn saturation_threshold(&self) -> f32 {
        self.saturation_threshold
    }

    #[must_use]
    pub fn zero_offset(&self) -> f32 {
        self.zero_offset
    }

    #[must_use]
    pub fn bucket_width(&self) -> u32 {
        self.bucket_width
    }

    /// Computes the zone index for a raw proximity reading.
    ///
    /// Returns `None` when the offset reading is not finite (NaN or a
    /// negative infinity); such readings select no direction.
    #[must_use]
    pub fn bucket(&self, proximity: f32) -> Option<i64> {
        let folded = if proximity > self.saturation_threshold {
            self.zero_offset
        } else {
            proximity
        };

        let adjusted = folded - self.zero_offset;
        if !adjusted.is_finite() {
            return None;
        }

        // `as` saturates for finite values beyond i64
        let rounded = adjusted.round_ties_even() as i64;
        Some(rounded / i64::from(self.bucket_width))
    }
}

/// Drives four directional [`KeyToggle`]s from sensor readings.
///
/// The selection is recomputed from scratch on every call; the toggles
/// suppress repeated presses and releases.
#[derive(Debug, Clone)]
pub struct DirectionMapper {
    params: MappingParams,
    toggles: [KeyToggle; DIRECTION_COUNT],
}

impl Default for DirectionMapper {
    fn default() -> Self {
        Self::new(
            MappingParams::default(),
            [KeyCode::Right, KeyCode::Up, KeyCode::Down, KeyCode::Left],
        )
    }
}

impl DirectionMapper {
    /// Creates a mapper with keys bound in `[right, up, down, left]` order.
    #[must_use]
    pub fn new(params: MappingParams, keys: [KeyCode; DIRECTION_COUNT]) -> Self {
        Self {
            params,
            toggles: keys.map(KeyToggle::new),
        }
    }

    #[must_use]
    pub fn params(&self) -> &MappingParams {
        &self.params
    }

    /// The four toggles in `[right, up, down, left]` order.
    #[must_use]
    pub fn toggles(&self) -> &[KeyToggle; DIRECTION_COUNT] {
        &self.toggles
    }

    /// Direction whose key is currently held, if any.
    #[must_use]
    pub fn active(&self) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.toggles[d.index()].is_down())
    }

    /// Pure selection for one tick.
    #[must_use]
    pub fn select(&self, touch_active: bool, proximity: f32) -> Option<Direction> {
        if !touch_active {
            return None;
        }
        self.params.bucket(proximity).and_then(Direction::from_bucket)
    }

    /// Applies one tick of sensor input to the four toggles.
    ///
    /// Exactly the selected direction is held afterwards; every other
    /// directional key is released. Returns the selection.
    ///
    /// # Errors
    ///
    /// Injection failures are returned as-is.
    pub fn update<I: KeyInjector + ?Sized>(
        &mut self,
        touch_active: bool,
        proximity: f32,
        injector: &mut I,
    ) -> Result<Option<Direction>> {
        let selected = self.select(touch_active, proximity);
        self.hold_only(selected, injector)?;
        Ok(selected)
    }

    /// Releases all four directional keys.
    pub fn release_all<I: KeyInjector + ?Sized>(&mut self, injector: &mut I) -> Result<()> {
        self.hold_only(None, injector)
    }

    fn hold_only<I: KeyInjector + ?Sized>(
        &mut self,
        selected: Option<Direction>,
        injector: &mut I,
    ) -> Result<()> {
        let previous = self.active();
        let target = selected.map(Direction::index);
        for (i, toggle) in self.toggles.iter_mut().enumerate() {
            toggle.set_down(target == Some(i), injector)?;
        }
        if previous != selected {
            debug!("Direction {:?} -> {:?}", previous, selected);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::mocks::{KeyEvent, RecordingInjector};
    use crate::inject::MockKeyInjector;

    fn held(mapper: &DirectionMapper) -> Vec<bool> {
        mapper.toggles().iter().map(KeyToggle::is_down).collect()
    }

    // ==================== MappingParams Tests ====================

    #[test]
    fn test_default_params() {
        let params = MappingParams::default();
        assert_eq!(params.saturation_threshold(), 60.0);
        assert_eq!(params.zero_offset(), 12.0);
        assert_eq!(params.bucket_width(), 12);
    }

    #[test]
    fn test_zero_bucket_width_raised_to_one() {
        let params = MappingParams::new(60.0, 12.0, 0);
        assert_eq!(params.bucket_width(), 1);
    }

    #[test]
    fn test_bucket_zone_centres() {
        let params = MappingParams::default();
        assert_eq!(params.bucket(12.0), Some(0));
        assert_eq!(params.bucket(24.0), Some(1));
        assert_eq!(params.bucket(36.0), Some(2));
        assert_eq!(params.bucket(48.0), Some(3));
        assert_eq!(params.bucket(60.0), Some(4));
    }

    #[test]
    fn test_bucket_truncates_toward_zero() {
        let params = MappingParams::default();
        // -11 / 12 truncates to 0
        assert_eq!(params.bucket(1.0), Some(0));
        // -11.4 rounds to -11
        assert_eq!(params.bucket(0.6), Some(0));
        // -11.6 rounds to -12
        assert_eq!(params.bucket(0.4), Some(-1));
        assert_eq!(params.bucket(0.0), Some(-1));
    }

    #[test]
    fn test_bucket_rounds_ties_to_even() {
        let params = MappingParams::new(60.0, 0.0, 3);
        // 2.5 -> 2 -> bucket 0 (ties away from zero would give 3 -> bucket 1)
        assert_eq!(params.bucket(2.5), Some(0));
        // 3.5 -> 4 -> bucket 1
        assert_eq!(params.bucket(3.5), Some(1));
    }

    #[test]
    fn test_bucket_saturation_folds_to_zero_offset() {
        let params = MappingParams::default();
        assert_eq!(params.bucket(60.5), Some(0));
        assert_eq!(params.bucket(100.0), Some(0));
        assert_eq!(params.bucket(f32::MAX), Some(0));
        assert_eq!(params.bucket(f32::INFINITY), Some(0));
    }

    #[test]
    fn test_bucket_non_finite() {
        let params = MappingParams::default();
        assert_eq!(params.bucket(f32::NAN), None);
        assert_eq!(params.bucket(f32::NEG_INFINITY), None);
    }

    #[test]
    fn test_bucket_huge_negative_is_negative() {
        let params = MappingParams::default();
        assert!(params.bucket(-1.0e30).unwrap() < 0);
    }

    // ==================== Direction Tests ====================

    #[test]
    fn test_direction_indices() {
        for (i, direction) in Direction::ALL.iter().enumerate() {
            assert_eq!(direction.index(), i);
            assert_eq!(Direction::from_bucket(i as i64), Some(*direction));
        }
    }

    #[test]
    fn test_direction_from_out_of_range_bucket() {
        assert_eq!(Direction::from_bucket(-1), None);
        assert_eq!(Direction::from_bucket(4), None);
        assert_eq!(Direction::from_bucket(i64::MAX), None);
        assert_eq!(Direction::from_bucket(i64::MIN), None);
    }

    // ==================== Selection Scenarios ====================

    #[test]
    fn test_scenario_right() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        let selected = mapper.update(true, 12.0, &mut injector).unwrap();
        assert_eq!(selected, Some(Direction::Right));
        assert_eq!(held(&mapper), vec![true, false, false, false]);
        assert_eq!(injector.events, vec![KeyEvent::Press(KeyCode::Right)]);
    }

    #[test]
    fn test_scenario_up() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        mapper.update(true, 24.0, &mut injector).unwrap();
        assert_eq!(held(&mapper), vec![false, true, false, false]);
    }

    #[test]
    fn test_scenario_down() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        mapper.update(true, 36.0, &mut injector).unwrap();
        assert_eq!(held(&mapper), vec![false, false, true, false]);
    }

    #[test]
    fn test_scenario_left() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        mapper.update(true, 48.0, &mut injector).unwrap();
        assert_eq!(held(&mapper), vec![false, false, false, true]);
        assert_eq!(mapper.active(), Some(Direction::Left));
    }

    #[test]
    fn test_scenario_below_dead_zone() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        let selected = mapper.update(true, 0.0, &mut injector).unwrap();
        assert_eq!(selected, None);
        assert_eq!(held(&mapper), vec![false; 4]);
        assert!(injector.events.is_empty());
    }

    #[test]
    fn test_scenario_touch_inactive() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        assert_eq!(mapper.update(false, 36.0, &mut injector).unwrap(), None);
        assert_eq!(held(&mapper), vec![false; 4]);
    }

    #[test]
    fn test_bucket_four_selects_nothing() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        mapper.update(true, 48.0, &mut injector).unwrap();
        mapper.update(true, 60.0, &mut injector).unwrap();
        assert_eq!(mapper.active(), None);
        assert_eq!(
            injector.events,
            vec![KeyEvent::Press(KeyCode::Left), KeyEvent::Release(KeyCode::Left)]
        );
    }

    #[test]
    fn test_nan_selects_nothing() {
        let mapper = DirectionMapper::default();
        assert_eq!(mapper.select(true, f32::NAN), None);
    }

    // ==================== Properties ====================

    #[test]
    fn test_touch_inactive_releases_any_prior_state() {
        for prior in Direction::ALL {
            let mut mapper = DirectionMapper::default();
            let mut injector = RecordingInjector::new();
            let proximity = 12.0 + 12.0 * prior.index() as f32;
            mapper.update(true, proximity, &mut injector).unwrap();
            assert_eq!(mapper.active(), Some(prior));

            for raw in [-5.0, 0.0, 12.0, 30.0, 48.0, 75.0] {
                mapper.update(false, raw, &mut injector).unwrap();
                assert_eq!(held(&mapper), vec![false; 4], "prior {:?}, raw {}", prior, raw);
            }
            assert!(injector.held().is_empty());
        }
    }

    #[test]
    fn test_saturated_readings_match_zero_offset() {
        let mapper = DirectionMapper::default();
        for raw in [60.01, 61.0, 80.0, 250.0, 1.0e9] {
            for touch in [true, false] {
                assert_eq!(mapper.select(touch, raw), mapper.select(touch, 12.0), "raw {}", raw);
            }
        }
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        for raw in [-3.0, 7.0, 12.0, 20.0, 33.3, 47.9, 55.0, 59.9, 90.0] {
            mapper.update(true, raw, &mut injector).unwrap();
            let state = held(&mapper);
            injector.take();

            mapper.update(true, raw, &mut injector).unwrap();
            assert_eq!(held(&mapper), state);
            assert!(injector.events.is_empty(), "second update at {} emitted events", raw);
        }
    }

    #[test]
    fn test_at_most_one_direction_held() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        let mut raw = -20.0_f32;
        while raw < 80.0 {
            mapper.update(true, raw, &mut injector).unwrap();
            let count = held(&mapper).into_iter().filter(|d| *d).count();
            assert!(count <= 1, "{} directions held at {}", count, raw);
            assert!(injector.held().len() <= 1);
            raw += 0.25;
        }
    }

    #[test]
    fn test_switching_direction_presses_new_and_releases_old() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        mapper.update(true, 36.0, &mut injector).unwrap();
        injector.take();

        mapper.update(true, 12.0, &mut injector).unwrap();
        // Toggles are visited in index order
        assert_eq!(
            injector.events,
            vec![KeyEvent::Press(KeyCode::Right), KeyEvent::Release(KeyCode::Down)]
        );
    }

    #[test]
    fn test_custom_key_bindings() {
        let mut mapper = DirectionMapper::new(
            MappingParams::default(),
            [KeyCode::D, KeyCode::W, KeyCode::S, KeyCode::A],
        );
        let mut injector = RecordingInjector::new();
        mapper.update(true, 24.0, &mut injector).unwrap();
        assert_eq!(injector.events, vec![KeyEvent::Press(KeyCode::W)]);
    }

    #[test]
    fn test_release_all() {
        let mut mapper = DirectionMapper::default();
        let mut injector = RecordingInjector::new();
        mapper.update(true, 24.0, &mut injector).unwrap();
        mapper.release_all(&mut injector).unwrap();
        assert_eq!(mapper.active(), None);
        assert!(injector.held().is_empty());
    }

    #[test]
    fn test_injection_failure_propagates() {
        let mut mapper = DirectionMapper::default();
        let mut injector = MockKeyInjector::new();
        injector.expect_press_key().returning(|_| {
            Err(crate::error::FunkinCtrlError::Injection("backend gone".to_string()))
        });

        let result = mapper.update(true, 12.0, &mut injector);
        assert!(result.is_err());
        assert_eq!(mapper.active(), None);
    }
}
