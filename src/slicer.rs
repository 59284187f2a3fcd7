use crate::error::{PrepError, Result};
use serde::{Deserialize, Serialize};

/// Windowing parameters shared by every file of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Samples per window.
    pub window_size: usize,
    /// Step between window starts, as a fraction of `window_size`.
    pub stride: f64,
    /// Minimum number of remaining samples needed to emit one more window.
    pub minlength: usize,
}

impl WindowConfig {
    /// Builds a config whose `minlength` is half a window, rounded up.
    pub fn new(window_size: usize, stride: f64) -> Self {
        Self {
            window_size,
            stride,
            minlength: default_minlength(window_size),
        }
    }

    pub fn offset(&self) -> usize {
        (self.window_size as f64 * self.stride).floor() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(PrepError::InvalidConfig("window_size must be positive".to_string()));
        }
        if !(self.stride > 0.0 && self.stride <= 1.0) {
            return Err(PrepError::InvalidConfig(format!(
                "stride must be in (0, 1], got {}",
                self.stride
            )));
        }
        if self.offset() == 0 {
            return Err(PrepError::InvalidConfig(format!(
                "window_size {} with stride {} gives a zero step",
                self.window_size, self.stride
            )));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new(256, 0.5)
    }
}

/// Smallest integer `m` with `n < m` equivalent to `n < 0.5 * window_size`.
pub fn default_minlength(window_size: usize) -> usize {
    (window_size + 1) / 2
}

/// Row-major table of equally sized windows.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowTable {
    window_size: usize,
    data: Vec<f32>,
}

impl WindowTable {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            data: Vec::new(),
        }
    }

    pub fn from_raw(window_size: usize, data: Vec<f32>) -> Self {
        debug_assert!(window_size == 0 || data.len() % window_size == 0);
        Self { window_size, data }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn rows(&self) -> usize {
        if self.window_size == 0 {
            0
        } else {
            self.data.len() / self.window_size
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.window_size;
        &self.data[start..start + self.window_size]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.window_size.max(1))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Appends `segment` as one row, zero-padding it on the right.
    fn push_padded(&mut self, segment: &[f32]) {
        self.data.extend_from_slice(segment);
        let pad = self.window_size - segment.len();
        self.data.resize(self.data.len() + pad, 0.0);
    }
}

/// Number of windows `slice_into` produces for a signal of `n_samples`.
pub fn count_windows(n_samples: usize, config: &WindowConfig) -> usize {
    let offset = config.offset();
    if offset == 0 {
        return 0;
    }
    (0..n_samples)
        .step_by(offset)
        .take_while(|&beg| n_samples - beg >= config.minlength)
        .count()
}

/// Slices `signal` into windows appended to `table`, returning how many were added.
///
/// Start positions advance by `config.offset()`. The sweep stops at the first
/// start whose remaining tail is shorter than `minlength`; a tail that is at
/// least `minlength` but shorter than a full window is zero-padded.
pub fn slice_into(signal: &[f32], config: &WindowConfig, table: &mut WindowTable) -> usize {
    let n_samples = signal.len();
    let offset = config.offset();
    if offset == 0 {
        return 0;
    }

    let before = table.rows();
    table.data.reserve(count_windows(n_samples, config) * config.window_size);

    for beg in (0..n_samples).step_by(offset) {
        if n_samples - beg < config.minlength {
            break;
        }
        let end = beg + config.window_size;
        if end <= n_samples {
            table.data.extend_from_slice(&signal[beg..end]);
        } else {
            table.push_padded(&signal[beg..]);
        }
    }

    table.rows() - before
}

/// Slices one signal into a fresh table.
pub fn slice_signal(signal: &[f32], config: &WindowConfig) -> WindowTable {
    let mut table = WindowTable::new(config.window_size);
    slice_into(signal, config, &mut table);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f32> {
        (1..=n).map(|x| x as f32).collect()
    }

    fn cfg(window_size: usize, stride: f64, minlength: usize) -> WindowConfig {
        WindowConfig {
            window_size,
            stride,
            minlength,
        }
    }

    #[test]
    fn test_half_stride_with_padded_tail() {
        let table = slice_signal(&ramp(10), &cfg(4, 0.5, 2));
        assert_eq!(table.rows(), 5);
        assert_eq!(table.row(0), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(table.row(1), &[3.0, 4.0, 5.0, 6.0]);
        assert_eq!(table.row(2), &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(table.row(3), &[7.0, 8.0, 9.0, 10.0]);
        assert_eq!(table.row(4), &[9.0, 10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shorter_than_minlength_yields_nothing() {
        let table = slice_signal(&ramp(3), &cfg(8, 0.5, 4));
        assert!(table.is_empty());
        assert_eq!(table.rows(), 0);
        assert_eq!(count_windows(3, &cfg(8, 0.5, 4)), 0);
        assert!(slice_signal(&[], &cfg(8, 0.5, 0)).is_empty());
    }

    #[test]
    fn test_exact_window_unit_stride() {
        let signal = ramp(4);
        let table = slice_signal(&signal, &cfg(4, 1.0, 2));
        assert_eq!(table.rows(), 1);
        assert_eq!(table.row(0), signal.as_slice());
    }

    #[test]
    fn test_unit_stride_does_not_overlap() {
        let table = slice_signal(&ramp(12), &cfg(4, 1.0, 4));
        assert_eq!(table.rows(), 3);
        assert_eq!(table.row(1), &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(table.row(2), &[9.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_padding_is_exact_zero() {
        // 9 samples: multiple of offset 3, not of window 6.
        let signal = vec![-1.5f32; 9];
        let table = slice_signal(&signal, &cfg(6, 0.5, 3));
        assert_eq!(table.rows(), 3);
        let last = table.row(2);
        assert_eq!(&last[..3], &[-1.5, -1.5, -1.5]);
        assert!(last[3..].iter().all(|&x| x == 0.0 && x.is_sign_positive()));
    }

    #[test]
    fn test_cutoff_stops_the_sweep() {
        // remaining tail at beg=8 is 2 < minlength 3, so nothing after it either
        let table = slice_signal(&ramp(10), &cfg(4, 0.5, 3));
        assert_eq!(table.rows(), 4);
        assert_eq!(table.row(3), &[7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_minlength_above_window_size_never_pads() {
        let config = cfg(4, 0.5, 6);
        let table = slice_signal(&ramp(10), &config);
        assert_eq!(table.rows(), 3);
        assert!(table.iter_rows().all(|row| row.iter().all(|&x| x != 0.0)));
    }

    #[test]
    fn test_count_matches_slicing() {
        let config = cfg(5, 0.4, 2);
        for n in 0..40 {
            assert_eq!(count_windows(n, &config), slice_signal(&ramp(n), &config).rows());
        }
    }

    #[test]
    fn test_slice_into_appends() {
        let config = cfg(4, 0.5, 2);
        let mut table = WindowTable::new(4);
        assert_eq!(slice_into(&ramp(10), &config, &mut table), 5);
        assert_eq!(slice_into(&ramp(6), &config, &mut table), 3);
        assert_eq!(table.rows(), 8);
        assert_eq!(table.row(5), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_config_validation() {
        assert!(WindowConfig::default().validate().is_ok());
        assert!(cfg(0, 0.5, 0).validate().is_err());
        assert!(cfg(4, 0.0, 2).validate().is_err());
        assert!(cfg(4, 1.5, 2).validate().is_err());
        assert!(cfg(4, 0.2, 2).validate().is_err());
        assert_eq!(cfg(256, 0.5, 128).offset(), 128);
    }

    #[test]
    fn test_default_minlength() {
        assert_eq!(default_minlength(256), 128);
        assert_eq!(default_minlength(255), 128);
        assert_eq!(WindowConfig::new(4, 0.5).minlength, 2);
    }
}
