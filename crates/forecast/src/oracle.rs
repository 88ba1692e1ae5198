use std::collections::VecDeque;

/// Observed base fees kept for trend estimation.
pub const BASE_FEE_WINDOW: usize = 10;

/// 0.1 Gwei, used before any head has been observed.
pub const DEFAULT_BASE_FEE: u128 = 100_000_000;

/// Rolling window of observed base fees with a coarse next-block estimate:
/// one EIP-1559 step (12.5%) in the direction of the window's trend.
#[derive(Debug, Default)]
pub struct BaseFeeOracle {
    window: VecDeque<u128>
}

impl BaseFeeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, base_fee: u128) {
        self.window.push_back(base_fee);
        while self.window.len() > BASE_FEE_WINDOW {
            self.window.pop_front();
        }
    }

    /// Base fee of the most recent observed head.
    pub fn last_observed(&self) -> Option<u128> {
        self.window.back().copied()
    }

    pub fn estimate_next(&self) -> u128 {
        let (Some(&first), Some(&last)) = (self.window.front(), self.window.back()) else {
            return DEFAULT_BASE_FEE
        };

        if last > first {
            last + last / 8
        } else {
            last - last / 8
        }
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GWEI: u128 = 1_000_000_000;

    #[test]
    fn empty_window_returns_floor() {
        assert_eq!(BaseFeeOracle::new().estimate_next(), DEFAULT_BASE_FEE);
    }

    #[test]
    fn rising_trend_steps_up() {
        let mut oracle = BaseFeeOracle::new();
        oracle.record(8 * GWEI);
        oracle.record(10 * GWEI);
        // 10 gwei + 12.5%
        assert_eq!(oracle.estimate_next(), 11_250_000_000);
    }

    #[test]
    fn falling_trend_steps_down() {
        let mut oracle = BaseFeeOracle::new();
        oracle.record(12 * GWEI);
        oracle.record(8 * GWEI);
        assert_eq!(oracle.estimate_next(), 7 * GWEI);
    }

    #[test]
    fn flat_window_steps_down() {
        let mut oracle = BaseFeeOracle::new();
        oracle.record(8 * GWEI);
        oracle.record(8 * GWEI);
        assert_eq!(oracle.estimate_next(), 7 * GWEI);
    }

    #[test]
    fn window_is_bounded() {
        let mut oracle = BaseFeeOracle::new();
        for i in 0..20u128 {
            oracle.record(i * GWEI);
        }
        assert_eq!(oracle.window.len(), BASE_FEE_WINDOW);
        // oldest surviving entry is observation 10
        assert_eq!(*oracle.window.front().unwrap(), 10 * GWEI);
        assert_eq!(oracle.last_observed(), Some(19 * GWEI));
    }

    #[test]
    fn clear_resets_to_floor() {
        let mut oracle = BaseFeeOracle::new();
        oracle.record(50 * GWEI);
        oracle.clear();
        assert_eq!(oracle.estimate_next(), DEFAULT_BASE_FEE);
    }
}
