//! Atomic layer: pure stepping math for size animations
//!
//! Nothing here touches a timer or a target, so every rule of the
//! animation can be checked with plain unit tests.

use super::geometry::{Axis, Size};
use crate::config::AnimationOptions;

/// Smallest per-tick step while still converging, in pixels
pub const MIN_STEP: f64 = 2.0;

/// Largest per-tick step, in pixels
pub const MAX_STEP: f64 = 50.0;

/// Completion tolerance in pixels when `lazy` is set
pub const LAZY_TOLERANCE: i32 = 2;

/// Axes the options leave active, in `Width, Height` order
pub fn active_axes(options: &AnimationOptions) -> impl Iterator<Item = Axis> + '_ {
    Axis::ALL.into_iter().filter(move |axis| match axis {
        Axis::Width => !options.ignore_width,
        Axis::Height => !options.ignore_height,
    })
}

/// Compute the next value of one axis
///
/// The step is `|delta| / speed_divisor` clamped to `[MIN_STEP, MAX_STEP]`,
/// then the result is clamped so it always moves at least one pixel toward
/// `target` and never passes it.
pub fn next_position(current: i32, target: i32, speed_divisor: f64) -> i32 {
    // i64 so the full i32 range cannot overflow
    let delta = i64::from(target) - i64::from(current);
    if delta == 0 {
        return current;
    }

    let magnitude = (delta.abs() as f64 / speed_divisor).clamp(MIN_STEP, MAX_STEP);
    let step = if delta > 0 { magnitude } else { -magnitude };
    let next = (f64::from(current) + step) as i64;

    let next = if delta > 0 {
        next.clamp(i64::from(current) + 1, i64::from(target))
    } else {
        next.clamp(i64::from(target), i64::from(current) - 1)
    };
    // within [current, target], so it fits
    next as i32
}

/// Compute the next size; ignored axes keep their current value
pub fn next_size(current: Size, target: Size, options: &AnimationOptions) -> Size {
    active_axes(options).fold(current, |size, axis| {
        size.with(
            axis,
            next_position(current.get(axis), target.get(axis), options.speed_divisor),
        )
    })
}

#[inline]
pub fn axis_settled(current: i32, target: i32, lazy: bool) -> bool {
    if lazy {
        (current - target).abs() <= LAZY_TOLERANCE
    } else {
        current == target
    }
}

/// True once every active axis is settled on its target
pub fn is_complete(current: Size, target: Size, options: &AnimationOptions) -> bool {
    active_axes(options).all(|axis| axis_settled(current.get(axis), target.get(axis), options.lazy))
}

/// The exact final size: target on active axes, current on ignored ones
pub fn snap(current: Size, target: Size, options: &AnimationOptions) -> Size {
    active_axes(options).fold(current, |size, axis| size.with(axis, target.get(axis)))
}

/// Percentage of travel from `original` toward `target`, in `[0, 100]`
///
/// Each active axis contributes its travelled fraction clamped to `[0, 1]`;
/// the result is the mean over active axes. An axis whose original already
/// equals its target counts as done only while it sits on the target.
/// With no active axis the animation is trivially complete.
pub fn progress(original: Size, current: Size, target: Size, options: &AnimationOptions) -> f64 {
    let mut total = 0.0;
    let mut axes = 0u32;

    for axis in active_axes(options) {
        let span = i64::from(target.get(axis)) - i64::from(original.get(axis));
        let travelled = i64::from(current.get(axis)) - i64::from(original.get(axis));

        let fraction = if span == 0 {
            if current.get(axis) == target.get(axis) { 1.0 } else { 0.0 }
        } else {
            (travelled as f64 / span as f64).clamp(0.0, 1.0)
        };

        total += fraction;
        axes += 1;
    }

    if axes == 0 {
        100.0
    } else {
        100.0 * total / f64::from(axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> AnimationOptions {
        AnimationOptions::default()
    }

    #[test]
    fn test_next_position_sequence() {
        // 100 -> 200 at divisor 6: 16.67, 14, 11.67, 9.83 ... truncated
        let mut width = 100;
        let mut seen = vec![width];
        while width != 200 {
            width = next_position(width, 200, 6.0);
            seen.push(width);
        }
        assert_eq!(&seen[..5], &[100, 116, 130, 141, 150]);
        assert_eq!(*seen.last().unwrap(), 200);
    }

    #[test]
    fn test_next_position_zero_delta() {
        assert_eq!(next_position(42, 42, 6.0), 42);
    }

    #[test]
    fn test_next_position_extreme_values() {
        assert_eq!(next_position(i32::MIN, i32::MAX, 6.0), i32::MIN + 50);
        assert_eq!(next_position(i32::MAX, i32::MIN, 6.0), i32::MAX - 50);
        assert_eq!(next_position(i32::MAX - 1, i32::MAX, 6.0), i32::MAX);
        assert_eq!(next_position(-3, -10, 6.0), -5);
    }

    #[test]
    fn test_step_bounds() {
        for divisor in [1.0, 3.0, 6.0, 12.5, 100.0] {
            for (start, target) in [(0i32, 1000), (1000, 0), (50, 53), (10, 7), (0, 5000), (300, 301)] {
                let mut current = start;
                let mut ticks = 0;
                while current != target {
                    let remaining = (target - current).abs();
                    let next = next_position(current, target, divisor);
                    let step = (next - current).abs();

                    assert!(step >= 1, "stalled at {} toward {}", current, target);
                    assert!(step <= MAX_STEP as i32, "step {} too large", step);
                    if remaining >= MIN_STEP as i32 {
                        assert!(step >= MIN_STEP as i32, "step {} too small", step);
                    }

                    current = next;
                    ticks += 1;
                    assert!(ticks < 10_000);
                }
            }
        }
    }

    #[test]
    fn test_monotonic_without_overshoot() {
        for (start, target) in [(0i32, 777), (777, 0), (5, 6), (6, 5), (100, 98)] {
            let mut current = start;
            let mut distance = (target - current).abs();
            while current != target {
                current = next_position(current, target, 6.0);
                let new_distance = (target - current).abs();
                assert!(new_distance < distance);
                if target > start {
                    assert!(current <= target);
                } else {
                    assert!(current >= target);
                }
                distance = new_distance;
            }
        }
    }

    #[test]
    fn test_large_distance_capped() {
        assert_eq!(next_position(0, 10_000, 6.0), 50);
        assert_eq!(next_position(10_000, 0, 6.0), 9_950);
    }

    #[test]
    fn test_next_size_respects_ignored_axis() {
        let opts = AnimationOptions {
            ignore_width: true,
            ..options()
        };
        let next = next_size(Size::new(100, 100), Size::new(300, 200), &opts);
        assert_eq!(next.width, 100);
        assert_eq!(next.height, 116);
    }

    #[test]
    fn test_is_complete_exact_and_lazy() {
        let target = Size::new(200, 100);
        assert!(is_complete(target, target, &options()));
        assert!(!is_complete(Size::new(199, 100), target, &options()));

        let lazy = AnimationOptions {
            lazy: true,
            ..options()
        };
        assert!(is_complete(Size::new(198, 102), target, &lazy));
        assert!(!is_complete(Size::new(197, 100), target, &lazy));
    }

    #[test]
    fn test_is_complete_ignores_masked_axes() {
        let opts = AnimationOptions {
            ignore_height: true,
            ..options()
        };
        assert!(is_complete(Size::new(200, 5), Size::new(200, 100), &opts));

        let both = AnimationOptions {
            ignore_width: true,
            ignore_height: true,
            ..options()
        };
        assert!(is_complete(Size::new(0, 0), Size::new(500, 500), &both));
    }

    #[test]
    fn test_snap_keeps_ignored_axis() {
        let opts = AnimationOptions {
            ignore_width: true,
            ..options()
        };
        assert_eq!(
            snap(Size::new(10, 98), Size::new(50, 100), &opts),
            Size::new(10, 100)
        );
    }

    #[test]
    fn test_progress_single_axis() {
        let opts = AnimationOptions {
            ignore_height: true,
            ..options()
        };
        let original = Size::new(100, 100);
        let target = Size::new(200, 100);

        assert_eq!(progress(original, original, target, &opts), 0.0);
        assert!((progress(original, Size::new(150, 100), target, &opts) - 50.0).abs() < 1e-9);
        assert_eq!(progress(original, target, target, &opts), 100.0);
    }

    #[test]
    fn test_progress_two_axes_average() {
        let original = Size::new(0, 0);
        let target = Size::new(100, 200);

        // width done, height untouched: each axis is worth 50
        assert!((progress(original, Size::new(100, 0), target, &options()) - 50.0).abs() < 1e-9);
        assert_eq!(progress(original, target, target, &options()), 100.0);
    }

    #[test]
    fn test_progress_shrinking_and_clamped() {
        let original = Size::new(200, 200);
        let target = Size::new(100, 100);

        assert!((progress(original, Size::new(150, 150), target, &options()) - 50.0).abs() < 1e-9);
        // past the target after a retarget still reads as complete
        assert_eq!(progress(original, Size::new(50, 50), target, &options()), 100.0);
        // moved away from the target reads as zero
        assert_eq!(progress(original, Size::new(250, 250), target, &options()), 0.0);
    }

    #[test]
    fn test_progress_zero_span_axis() {
        let original = Size::new(100, 100);
        let target = Size::new(200, 100);
        // height has nothing to travel and sits on target
        assert!((progress(original, Size::new(150, 100), target, &options()) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_full_range_span() {
        let original = Size::new(i32::MIN, 0);
        let target = Size::new(i32::MAX, 0);
        let opts = AnimationOptions {
            ignore_height: true,
            ..options()
        };
        assert!((progress(original, Size::new(0, 0), target, &opts) - 50.0).abs() < 1e-6);
        assert_eq!(progress(original, target, target, &opts), 100.0);
    }

    #[test]
    fn test_progress_no_active_axis() {
        let opts = AnimationOptions {
            ignore_width: true,
            ignore_height: true,
            ..options()
        };
        assert_eq!(
            progress(Size::new(1, 1), Size::new(1, 1), Size::new(9, 9), &opts),
            100.0
        );
    }
}
