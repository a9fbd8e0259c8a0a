//! Simple moving averages over a close-price column

use std::num::NonZeroUsize;

pub const SMA_SHORT_WINDOW: usize = 20;
pub const SMA_LONG_WINDOW: usize = 50;

/// Trailing simple moving average, one output per input value.
///
/// The window ends at the current value inclusive. The first `window - 1`
/// outputs are `None`. Each defined output is the sum of its own window
/// divided by the window length; nothing carries over between windows, so the
/// result depends only on `values`.
pub fn simple_moving_average(values: &[f64], window: NonZeroUsize) -> Vec<Option<f64>> {
    let window = window.get();
    let mut averages = Vec::with_capacity(values.len());

    averages.extend(std::iter::repeat(None).take(window.saturating_sub(1).min(values.len())));
    averages.extend(
        values
            .windows(window)
            .map(|slice| Some(slice.iter().sum::<f64>() / window as f64)),
    );

    averages
}

/// SMA with one of the fixed dashboard windows
pub fn sma_with_window(values: &[f64], window: usize) -> Vec<Option<f64>> {
    match NonZeroUsize::new(window) {
        Some(window) => simple_moving_average(values, window),
        None => vec![None; values.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_output_length_matches_input() {
        for len in [0, 1, 19, 20, 21, 55] {
            assert_eq!(sma_with_window(&ramp(len), SMA_SHORT_WINDOW).len(), len);
            assert_eq!(sma_with_window(&ramp(len), SMA_LONG_WINDOW).len(), len);
        }
    }

    #[test]
    fn test_undefined_until_window_is_full() {
        let sma20 = sma_with_window(&ramp(55), SMA_SHORT_WINDOW);
        assert!(sma20[..19].iter().all(Option::is_none));
        assert!(sma20[19..].iter().all(Option::is_some));

        let sma50 = sma_with_window(&ramp(55), SMA_LONG_WINDOW);
        assert!(sma50[..49].iter().all(Option::is_none));
        assert!(sma50[49..].iter().all(Option::is_some));
    }

    #[test]
    fn test_linear_ramp_values() {
        let closes = ramp(55);
        let sma20 = sma_with_window(&closes, SMA_SHORT_WINDOW);
        let sma50 = sma_with_window(&closes, SMA_LONG_WINDOW);

        assert_eq!(sma20[19], Some(109.5));
        assert_eq!(sma20[54], Some(144.5));
        assert_eq!(sma50[49], Some(124.5));
        assert_eq!(sma50[54], Some(129.5));
    }

    #[test]
    fn test_matches_direct_mean_of_trailing_window() {
        let closes: Vec<f64> = (0..60).map(|i| ((i * 37) % 11) as f64 * 1.25 + 50.0).collect();
        let sma20 = sma_with_window(&closes, SMA_SHORT_WINDOW);

        for i in 19..closes.len() {
            let expected = closes[i - 19..=i].iter().sum::<f64>() / 20.0;
            assert_eq!(sma20[i], Some(expected));
        }
    }

    #[test]
    fn test_short_input_is_all_undefined() {
        assert_eq!(sma_with_window(&[101.5], SMA_SHORT_WINDOW), vec![None]);
        assert!(sma_with_window(&[], SMA_LONG_WINDOW).is_empty());
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let closes = [3.0, 4.5, 6.0];
        let sma = simple_moving_average(&closes, NonZeroUsize::new(1).unwrap());
        assert_eq!(sma, vec![Some(3.0), Some(4.5), Some(6.0)]);
    }

    #[test]
    fn test_zero_window_yields_no_values() {
        assert_eq!(sma_with_window(&[1.0, 2.0], 0), vec![None, None]);
    }
}
