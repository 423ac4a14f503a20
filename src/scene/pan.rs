use super::camera::PerspectiveCamera;
use super::tween::{Easing, Tween};
use super::types::Vec3;
use crate::error::SceneError;
use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Target camera state for a pan
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    /// Euler rotation (XYZ order, radians)
    pub rotation: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl CameraPose {
    pub fn of(camera: &PerspectiveCamera) -> Self {
        Self {
            position: camera.position,
            rotation: camera.rotation,
            fov: camera.fov,
        }
    }
}

/// Three concurrent tweens (position, rotation, fov) driving one camera
pub struct CameraPan {
    position: Tween<Vec3>,
    rotation: Tween<Vec3>,
    fov: Tween<f32>,
    waiters: Vec<oneshot::Sender<()>>,
}

/// Build a pan from the camera's current state to `target` over `duration_ms`
///
/// Nothing moves until [`CameraPan::advance`] is called from the frame loop.
pub fn pan_camera_to_point(
    camera: &PerspectiveCamera,
    target: CameraPose,
    duration_ms: f64,
    easing: Easing,
) -> CameraPan {
    let start = CameraPose::of(camera);
    CameraPan {
        position: Tween::new(start.position, target.position, duration_ms).with_easing(easing),
        rotation: Tween::new(start.rotation, target.rotation, duration_ms).with_easing(easing),
        fov: Tween::new(start.fov, target.fov, duration_ms).with_easing(easing),
        waiters: Vec::new(),
    }
}

impl CameraPan {
    /// Signal that resolves once every tween of this pan has finished
    pub fn subscribe(&mut self) -> PanCompletion {
        let (sender, receiver) = oneshot::channel();
        self.waiters.push(sender);
        PanCompletion { receiver }
    }

    pub fn is_finished(&self) -> bool {
        self.position.is_finished() && self.rotation.is_finished() && self.fov.is_finished()
    }

    /// Apply this frame's values to `camera`; returns true once all three tweens are done
    pub fn advance(&mut self, now_ms: f64, camera: &mut PerspectiveCamera) -> bool {
        camera.position = self.position.update(now_ms).value();
        camera.rotation = self.rotation.update(now_ms).value();
        camera.fov = self.fov.update(now_ms).value();

        if !self.is_finished() {
            return false;
        }

        for waiter in self.waiters.drain(..) {
            // a dropped PanCompletion just means nobody is waiting
            let _ = waiter.send(());
        }
        true
    }
}

/// Completion signal for a camera pan
///
/// Resolves to `Err(SceneError::PanAborted)` if the pan is dropped first,
/// e.g. when the hosting page tears the scene down mid-flight.
#[must_use = "a PanCompletion does nothing unless awaited or polled"]
pub struct PanCompletion {
    receiver: oneshot::Receiver<()>,
}

impl Future for PanCompletion {
    type Output = Result<(), SceneError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| SceneError::PanAborted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::f32::consts::FRAC_PI_2;

    fn start_camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(35.0, 1.5, 0.1, 1000.0);
        camera.position = Vec3::new(2.0, 2.0, 5.0);
        camera.look_along(Vec3::new(-0.6, -0.6, -1.6));
        camera
    }

    fn table_pose() -> CameraPose {
        CameraPose {
            position: Vec3::new(0.0, 2.0, -0.25),
            rotation: Vec3::new(-FRAC_PI_2, 0.0, 0.0),
            fov: 25.0,
        }
    }

    fn run_to_end(camera: &mut PerspectiveCamera, easing: Easing) -> PerspectiveCamera {
        let mut pan = pan_camera_to_point(camera, table_pose(), 2000.0, easing);
        let mut now = 100.0;
        while !pan.advance(now, camera) {
            now += 16.6;
        }
        *camera
    }

    #[test]
    fn test_pan_moves_camera_gradually() {
        let mut camera = start_camera();
        let mut pan = pan_camera_to_point(&camera, table_pose(), 2000.0, Easing::Linear);

        assert!(!pan.advance(0.0, &mut camera));
        assert_eq!(camera.fov, 35.0);

        assert!(!pan.advance(1000.0, &mut camera));
        assert!((camera.fov - 30.0).abs() < 1e-4);
        assert!((camera.position - Vec3::new(1.0, 2.0, 2.375)).length() < 1e-4);
    }

    #[test]
    fn test_completion_fires_with_target_fov() {
        let mut camera = start_camera();
        let mut pan = pan_camera_to_point(&camera, table_pose(), 2000.0, Easing::CubicInOut);
        let mut done = pan.subscribe();

        pan.advance(0.0, &mut camera);
        assert!((&mut done).now_or_never().is_none());

        assert!(pan.advance(2000.0, &mut camera));
        assert!(matches!(done.now_or_never(), Some(Ok(()))));
        assert_eq!(camera.fov, 25.0);
        assert_eq!(camera.position, table_pose().position);
        assert_eq!(camera.rotation, table_pose().rotation);
    }

    #[test]
    fn test_independent_runs_converge_to_same_state() {
        let mut first = start_camera();
        let mut second = start_camera();
        let a = run_to_end(&mut first, Easing::Linear);
        let b = run_to_end(&mut second, Easing::QuadraticInOut);
        assert_eq!(a, b);
    }

    #[test]
    fn test_dropped_pan_aborts_completion() {
        let camera = start_camera();
        let mut pan = pan_camera_to_point(&camera, table_pose(), 2000.0, Easing::Linear);
        let done = pan.subscribe();
        drop(pan);
        assert!(matches!(
            futures::executor::block_on(done),
            Err(SceneError::PanAborted)
        ));
    }
}
