use crate::constants::LOG_THROTTLE_WINDOW_MS;

/// Rate limiter for repeated per-frame error logs.
#[derive(Clone, Debug)]
pub struct LogThrottle {
    window_ms: f64,
    last_ms: Option<f64>,
    suppressed: u32,
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new(LOG_THROTTLE_WINDOW_MS)
    }
}

impl LogThrottle {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms: window_ms.max(0.0),
            last_ms: None,
            suppressed: 0,
        }
    }

    /// `Some(n)` when a log line may be written now, `n` being the number of
    /// messages swallowed since the previous one.
    pub fn should_log(&mut self, now_ms: f64) -> Option<u32> {
        let allowed = match self.last_ms {
            None => true,
            Some(last) => !now_ms.is_finite() || now_ms - last >= self.window_ms || now_ms < last,
        };
        if allowed {
            self.last_ms = Some(now_ms);
            Some(std::mem::take(&mut self.suppressed))
        } else {
            self.suppressed = self.suppressed.saturating_add(1);
            None
        }
    }

    pub fn suppressed(&self) -> u32 {
        self.suppressed
    }
}
