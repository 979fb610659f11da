use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::EffectError;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Repeating {
    handle: Rc<Cell<Option<i32>>>,
    _callback: Closure<dyn FnMut()>,
}

struct FrameLoop {
    handle: Rc<Cell<Option<i32>>>,
    running: Rc<Cell<bool>>,
    callback: FrameCallback,
}

/// Owns the intervals, timeouts and animation frames of one effect.
///
/// Callbacks stay alive as long as the schedule does; [`Schedule::clear`]
/// cancels every pending handle and drops the callbacks. Clearing twice is a
/// no-op, and dropping the schedule clears it.
#[derive(Default)]
pub struct Schedule {
    intervals: Vec<Repeating>,
    timeouts: Vec<Repeating>,
    frames: Vec<FrameLoop>,
}

impl Schedule {
    /// Run `tick` every `period_ms` until it returns `false` or the schedule
    /// is cleared.
    pub fn every<F>(&mut self, period_ms: i32, mut tick: F) -> Result<(), EffectError>
    where
        F: FnMut() -> bool + 'static,
    {
        let window = web_sys::window().ok_or(EffectError::NoWindow)?;
        let handle = Rc::new(Cell::new(None::<i32>));

        let callback = {
            let handle = handle.clone();
            Closure::<dyn FnMut()>::new(move || {
                if handle.get().is_none() {
                    return;
                }

                if !tick() {
                    if let (Some(id), Some(window)) = (handle.take(), web_sys::window()) {
                        window.clear_interval_with_handle(id);
                    }
                }
            })
        };

        let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            period_ms,
        )?;
        handle.set(Some(id));

        self.intervals.push(Repeating {
            handle,
            _callback: callback,
        });

        Ok(())
    }

    /// Run `run` once after `delay_ms`.
    pub fn after<F>(&mut self, delay_ms: i32, run: F) -> Result<(), EffectError>
    where
        F: FnOnce() + 'static,
    {
        let window = web_sys::window().ok_or(EffectError::NoWindow)?;
        let handle = Rc::new(Cell::new(None::<i32>));

        let callback = {
            let handle = handle.clone();
            let mut run = Some(run);
            Closure::<dyn FnMut()>::new(move || {
                handle.set(None);
                if let Some(run) = run.take() {
                    run();
                }
            })
        };

        let id = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay_ms.max(0),
        )?;
        handle.set(Some(id));

        self.timeouts.push(Repeating {
            handle,
            _callback: callback,
        });

        Ok(())
    }

    /// Drive `step` from `requestAnimationFrame` while it returns `true`.
    ///
    /// `step` receives the frame timestamp in milliseconds.
    pub fn animate<F>(&mut self, mut step: F) -> Result<(), EffectError>
    where
        F: FnMut(f64) -> bool + 'static,
    {
        let window = web_sys::window().ok_or(EffectError::NoWindow)?;
        let handle = Rc::new(Cell::new(None::<i32>));
        let running = Rc::new(Cell::new(true));
        let callback: FrameCallback = Rc::new(RefCell::new(None));

        {
            let handle = handle.clone();
            let running = running.clone();
            let next = callback.clone();

            *callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |now: f64| {
                handle.set(None);
                if !running.get() || !step(now) {
                    return;
                }

                let (Some(window), Ok(next)) = (web_sys::window(), next.try_borrow()) else {
                    return;
                };
                if let Some(cb) = next.as_ref() {
                    handle.set(
                        window
                            .request_animation_frame(cb.as_ref().unchecked_ref())
                            .ok(),
                    );
                }
            }));
        }

        if let Some(cb) = callback.borrow().as_ref() {
            handle.set(Some(
                window.request_animation_frame(cb.as_ref().unchecked_ref())?,
            ));
        }

        self.frames.push(FrameLoop {
            handle,
            running,
            callback,
        });

        Ok(())
    }

    pub fn is_idle(&self) -> bool {
        self.intervals.is_empty() && self.timeouts.is_empty() && self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        let window = web_sys::window();

        for interval in self.intervals.drain(..) {
            if let (Some(id), Some(window)) = (interval.handle.take(), window.as_ref()) {
                window.clear_interval_with_handle(id);
            }
        }

        for timeout in self.timeouts.drain(..) {
            if let (Some(id), Some(window)) = (timeout.handle.take(), window.as_ref()) {
                window.clear_timeout_with_handle(id);
            }
        }

        for frame in self.frames.drain(..) {
            frame.running.set(false);
            if let (Some(id), Some(window)) = (frame.handle.take(), window.as_ref()) {
                let _ = window.cancel_animation_frame(id);
            }
            // Breaks the closure's reference back to its own slot.
            if let Ok(mut slot) = frame.callback.try_borrow_mut() {
                slot.take();
            }
        }
    }
}

impl Drop for Schedule {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schedule")
            .field("intervals", &self.intervals.len())
            .field("timeouts", &self.timeouts.len())
            .field("frames", &self.frames.len())
            .finish()
    }
}
