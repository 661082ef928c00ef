/// Lifecycle of the per-frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Disposed,
}

/// Frame counter with an explicit stop flag.
///
/// The loop starts running and can only move to [`LoopState::Disposed`];
/// there is no pause. Callers ask [`FrameLoop::begin_frame`] before doing any
/// per-frame work and stop scheduling once it returns `None`.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: LoopState,
    frame: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Running,
            frame: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Start the next frame and return its number, or `None` once disposed.
    pub fn begin_frame(&mut self) -> Option<u64> {
        match self.state {
            LoopState::Running => {
                self.frame += 1;
                Some(self.frame)
            }
            LoopState::Disposed => None,
        }
    }

    /// Stop the loop. Returns `true` only on the transition.
    pub fn dispose(&mut self) -> bool {
        let was_running = self.is_running();
        self.state = LoopState::Disposed;
        was_running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running_at_frame_zero() {
        let fl = FrameLoop::new();
        assert_eq!(fl.state(), LoopState::Running);
        assert_eq!(fl.frame(), 0);
    }

    #[test]
    fn frames_are_numbered_from_one() {
        let mut fl = FrameLoop::new();
        assert_eq!(fl.begin_frame(), Some(1));
        assert_eq!(fl.begin_frame(), Some(2));
        assert_eq!(fl.frame(), 2);
    }

    #[test]
    fn dispose_stops_the_loop_for_good() {
        let mut fl = FrameLoop::new();
        fl.begin_frame();
        assert!(fl.dispose());
        assert!(!fl.dispose());
        for _ in 0..10 {
            assert_eq!(fl.begin_frame(), None);
        }
        assert_eq!(fl.frame(), 1);
        assert_eq!(fl.state(), LoopState::Disposed);
    }
}
