/// Frame timing snapshot.
///
/// Animation is frame-based, so the index is the only clock the demos read.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameTime {
    /// Frames ticked before this one.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks so far.
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let ft = FrameTime {
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_starts_at_zero_and_increments() {
        let mut clock = FrameClock::new();
        let indices: Vec<u64> = (0..4).map(|_| clock.tick().frame_index).collect();
        assert_eq!(indices, [0, 1, 2, 3]);
        assert_eq!(clock.frames(), 4);
    }

    #[test]
    fn index_wraps_instead_of_overflowing() {
        let mut clock = FrameClock {
            frame_index: u64::MAX,
        };
        assert_eq!(clock.tick().frame_index, u64::MAX);
        assert_eq!(clock.frames(), 0);
    }
}
