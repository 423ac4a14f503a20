use super::types::Vec3;

/// Values a tween can interpolate between
pub trait Interpolate: Copy {
    fn interpolate(self, to: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for Vec3 {
    fn interpolate(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

/// Easing curves, mapping linear progress in 0..=1 to eased progress
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
}

impl Easing {
    pub fn apply(self, k: f32) -> f32 {
        let k = k.clamp(0.0, 1.0);
        match self {
            Easing::Linear => k,
            Easing::QuadraticIn => k * k,
            Easing::QuadraticOut => k * (2.0 - k),
            Easing::QuadraticInOut => {
                if k < 0.5 {
                    2.0 * k * k
                } else {
                    let k = k - 1.0;
                    1.0 - 2.0 * k * k
                }
            }
            Easing::CubicIn => k * k * k,
            Easing::CubicOut => {
                let k = k - 1.0;
                k * k * k + 1.0
            }
            Easing::CubicInOut => {
                if k < 0.5 {
                    4.0 * k * k * k
                } else {
                    let k = k - 1.0;
                    4.0 * k * k * k + 1.0
                }
            }
        }
    }
}

/// Result of advancing a tween by one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenStep<T> {
    Running(T),
    Finished(T),
}

impl<T: Copy> TweenStep<T> {
    pub fn value(&self) -> T {
        match *self {
            TweenStep::Running(value) | TweenStep::Finished(value) => value,
        }
    }
}

/// Time-based interpolation from one value to another
///
/// The clock starts on the first call to [`Tween::update`], so a tween built
/// between two frames begins at the next frame's timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T> {
    from: T,
    to: T,
    duration_ms: f64,
    easing: Easing,
    started_at: Option<f64>,
    finished: bool,
}

impl<T: Interpolate> Tween<T> {
    pub fn new(from: T, to: T, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            duration_ms,
            easing: Easing::default(),
            started_at: None,
            finished: false,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance to `now_ms`; a finished tween always yields exactly its target
    pub fn update(&mut self, now_ms: f64) -> TweenStep<T> {
        if self.finished {
            return TweenStep::Finished(self.to);
        }

        let started_at = *self.started_at.get_or_insert(now_ms);
        let elapsed = (now_ms - started_at).max(0.0);

        if self.duration_ms <= 0.0 || elapsed >= self.duration_ms {
            self.finished = true;
            return TweenStep::Finished(self.to);
        }

        let progress = self.easing.apply((elapsed / self.duration_ms) as f32);
        TweenStep::Running(self.from.interpolate(self.to, progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::QuadraticIn,
            Easing::QuadraticOut,
            Easing::QuadraticInOut,
            Easing::CubicIn,
            Easing::CubicOut,
            Easing::CubicInOut,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?}");
        }
    }

    #[test]
    fn test_in_out_curves_are_symmetric_at_midpoint() {
        assert!((Easing::QuadraticInOut.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clock_starts_on_first_update() {
        let mut tween = Tween::new(0.0_f32, 10.0, 1000.0);
        assert_eq!(tween.update(5000.0), TweenStep::Running(0.0));
        assert_eq!(tween.update(5500.0), TweenStep::Running(5.0));
        assert_eq!(tween.update(6000.0), TweenStep::Finished(10.0));
        assert!(tween.is_finished());
    }

    #[test]
    fn test_finished_value_is_exact_target() {
        let to = Vec3::new(0.0, 2.0, -0.25);
        let mut tween = Tween::new(Vec3::new(2.0, 2.0, 5.0), to, 2000.0).with_easing(Easing::CubicInOut);
        tween.update(0.0);
        tween.update(1234.5);
        assert_eq!(tween.update(2500.0), TweenStep::Finished(to));
        // later frames keep reporting the target
        assert_eq!(tween.update(9000.0).value(), to);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut tween = Tween::new(35.0_f32, 25.0, 0.0);
        assert_eq!(tween.update(16.0), TweenStep::Finished(25.0));
    }
}
