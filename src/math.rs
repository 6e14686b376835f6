use glam::Vec2;

/// 2D vector used throughout the simulation.
pub type Vector2 = Vec2;

/// Steering helpers on top of `glam::Vec2`.
///
/// Both operations are total: zero-length or non-finite input yields
/// `Vec2::ZERO` instead of NaN.
pub trait Steer {
    /// Clamp magnitude to at most `max`.
    fn limit(self, max: f32) -> Self;
    /// Rescale to exactly `magnitude`, keeping direction.
    fn with_magnitude(self, magnitude: f32) -> Self;
}

impl Steer for Vec2 {
    #[inline]
    fn limit(self, max: f32) -> Self {
        if !self.is_finite() || max <= 0.0 {
            return Vec2::ZERO;
        }
        let len_sq = self.length_squared();
        if len_sq > max * max {
            self * (max / len_sq.sqrt())
        } else {
            self
        }
    }

    #[inline]
    fn with_magnitude(self, magnitude: f32) -> Self {
        if !self.is_finite() {
            return Vec2::ZERO;
        }
        self.normalize_or_zero() * magnitude
    }
}
