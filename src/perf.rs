//! Render stage timings, compiled in with the `perf` feature.
//!
//! Each stage reports its input size and elapsed time as a `debug` event on
//! the `httpeek::perf` target, so `HTTPEEK_LOG=httpeek::perf=debug` shows
//! only these.

#[cfg(feature = "perf")]
use std::time::Instant;

#[cfg(feature = "perf")]
pub struct StageTimer {
    stage: &'static str,
    input_bytes: usize,
    start: Instant,
}

#[cfg(feature = "perf")]
impl Drop for StageTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::debug!(
            target: "httpeek::perf",
            stage = self.stage,
            input_bytes = self.input_bytes,
            micros = elapsed.as_micros() as u64,
            "render stage finished"
        );
    }
}

/// Time a stage until the returned guard is dropped.
#[cfg(feature = "perf")]
pub fn stage(stage: &'static str, input_bytes: usize) -> StageTimer {
    StageTimer {
        stage,
        input_bytes,
        start: Instant::now(),
    }
}

#[cfg(not(feature = "perf"))]
pub struct StageTimer;

#[cfg(not(feature = "perf"))]
#[inline]
pub fn stage(_stage: &'static str, _input_bytes: usize) -> StageTimer {
    StageTimer
}
