use gloo::render::{request_animation_frame, AnimationFrame};
use std::cell::RefCell;
use std::rc::Rc;

type FrameSlot = Rc<RefCell<Option<AnimationFrame>>>;

/// Self-rescheduling `requestAnimationFrame` loop
///
/// The pending frame handle is kept so the loop can be cancelled; dropping
/// the `AnimationLoop` stops it.
pub struct AnimationLoop {
    pending: FrameSlot,
}

impl AnimationLoop {
    /// Start calling `on_frame` with the frame timestamp (ms) once per display refresh
    pub fn start<F>(on_frame: F) -> Self
    where
        F: FnMut(f64) + 'static,
    {
        let pending: FrameSlot = Rc::new(RefCell::new(None));
        schedule(Rc::clone(&pending), Rc::new(RefCell::new(on_frame)));
        Self { pending }
    }

    /// Cancel the pending frame; no further callbacks run
    pub fn stop(&self) {
        // AnimationFrame cancels itself on drop
        self.pending.borrow_mut().take();
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule<F>(pending: FrameSlot, on_frame: Rc<RefCell<F>>)
where
    F: FnMut(f64) + 'static,
{
    let slot = Rc::clone(&pending);
    let frame = request_animation_frame(move |timestamp| {
        (on_frame.borrow_mut())(timestamp);
        // stop() from inside the callback leaves the slot empty
        if slot.borrow().is_some() {
            schedule(slot, on_frame);
        }
    });
    *pending.borrow_mut() = Some(frame);
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use gloo::timers::callback::Timeout;
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    async fn sleep(ms: u32) {
        let (sender, receiver) = oneshot::channel();
        let _timeout = Timeout::new(ms, move || {
            let _ = sender.send(());
        });
        let _ = receiver.await;
    }

    #[wasm_bindgen_test]
    async fn test_loop_runs_until_dropped() {
        let frames = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&frames);
        let animation = AnimationLoop::start(move |_| counter.set(counter.get() + 1));

        sleep(200).await;
        assert!(animation.pending.borrow().is_some());
        assert!(frames.get() > 0);

        drop(animation);
        let seen = frames.get();
        sleep(100).await;
        assert_eq!(frames.get(), seen);
    }

    #[wasm_bindgen_test]
    async fn test_stop_from_inside_callback() {
        let frames = Rc::new(Cell::new(0u32));
        let slot: Rc<RefCell<Option<AnimationLoop>>> = Rc::new(RefCell::new(None));

        let counter = Rc::clone(&frames);
        let handle = Rc::clone(&slot);
        let animation = AnimationLoop::start(move |_| {
            counter.set(counter.get() + 1);
            if let Some(animation) = handle.borrow().as_ref() {
                animation.stop();
            }
        });
        *slot.borrow_mut() = Some(animation);

        sleep(200).await;
        assert_eq!(frames.get(), 1);
        assert!(slot.borrow().as_ref().is_some_and(|a| a.pending.borrow().is_none()));
    }
}
