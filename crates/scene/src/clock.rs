use std::time::Instant;

/// Wall-clock timer for animation. Elapsed time only ever grows.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since the clock was created.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let clock = Clock::new();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
        assert!(a >= 0.0);
    }
}
