//! Table geometry
//!
//! Pure functions of the configuration and canvas size. Nothing here depends
//! on page content, so the layout is stable across refreshes.

use alloc::vec::Vec;

/// Compute per-column widths
///
/// A column has an explicit width when `explicit` has a non-zero entry at
/// its position. Explicit widths are taken in column order and clamped to
/// the space left on the canvas. The remaining width is split evenly among
/// the other columns, the first `remaining % n` of them getting one extra
/// unit. With no shared columns, the last non-zero column absorbs whatever
/// is left so the table always spans the canvas.
pub fn column_widths(columns: usize, explicit: &[u16], total: i32) -> Vec<i32> {
    let total = total.max(0);
    let mut widths = Vec::with_capacity(columns);
    let mut used = 0i32;
    let mut implicit = 0i32;

    for i in 0..columns {
        match explicit.get(i).copied().filter(|w| *w > 0) {
            Some(w) => {
                let w = i32::from(w).min(total - used);
                used += w;
                widths.push(w);
            }
            None => {
                implicit += 1;
                widths.push(-1);
            }
        }
    }

    let remaining = total - used;
    if implicit > 0 {
        let base = remaining / implicit;
        let mut extra = remaining % implicit;
        for w in widths.iter_mut().filter(|w| **w < 0) {
            *w = base;
            if extra > 0 {
                *w += 1;
                extra -= 1;
            }
        }
    } else if remaining > 0 {
        if let Some(last) = widths.iter_mut().rev().find(|w| **w > 0) {
            *last += remaining;
        }
    }
    widths
}

/// Number of data rows that fit below the title and header bands
pub fn row_capacity(height: i32, line_height: u16, title: bool, header: bool) -> usize {
    if line_height == 0 || height <= 0 {
        return 0;
    }
    let lines = (height / i32::from(line_height)) as usize;
    lines
        .saturating_sub(usize::from(title))
        .saturating_sub(usize::from(header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use proptest::prelude::*;

    #[test]
    fn test_even_split() {
        assert_eq!(column_widths(3, &[], 300), vec![100, 100, 100]);
    }

    #[test]
    fn test_remainder_goes_to_first_columns() {
        assert_eq!(column_widths(3, &[], 302), vec![101, 101, 100]);
    }

    #[test]
    fn test_explicit_then_shared() {
        assert_eq!(column_widths(2, &[100], 320), vec![100, 220]);
        assert_eq!(column_widths(3, &[0, 50], 250), vec![100, 50, 100]);
    }

    #[test]
    fn test_explicit_clamped_to_canvas() {
        assert_eq!(column_widths(3, &[200, 200], 300), vec![200, 100, 0]);
    }

    #[test]
    fn test_all_explicit_last_absorbs_rest() {
        assert_eq!(column_widths(2, &[50, 60], 200), vec![50, 150]);
        assert_eq!(column_widths(3, &[50, 60, 0], 110), vec![50, 60, 0]);
    }

    #[test]
    fn test_no_columns() {
        assert!(column_widths(0, &[10], 100).is_empty());
    }

    #[test]
    fn test_row_capacity() {
        assert_eq!(row_capacity(240, 40, false, false), 6);
        assert_eq!(row_capacity(240, 40, true, true), 4);
        assert_eq!(row_capacity(239, 40, false, true), 4);
        assert_eq!(row_capacity(30, 40, true, true), 0);
        assert_eq!(row_capacity(100, 0, false, false), 0);
    }

    proptest! {
        #[test]
        fn prop_shared_columns_fill_and_balance(
            total in 0i32..2000,
            explicit in proptest::collection::vec(0u16..200, 0..8),
            extra in 1usize..8,
        ) {
            let columns = explicit.len() + extra;
            let widths = column_widths(columns, &explicit, total);
            prop_assert_eq!(widths.len(), columns);

            let is_shared = |i: usize| explicit.get(i).map_or(true, |w| *w == 0);
            let explicit_sum: i32 = (0..columns).filter(|i| !is_shared(*i)).map(|i| widths[i]).sum();
            let shared: Vec<i32> = (0..columns).filter(|i| is_shared(*i)).map(|i| widths[i]).collect();

            prop_assert!(explicit_sum <= total);
            prop_assert_eq!(shared.iter().sum::<i32>(), total - explicit_sum);

            let min = shared.iter().copied().min().unwrap_or(0);
            let max = shared.iter().copied().max().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }

        #[test]
        fn prop_widths_never_negative(
            total in -50i32..2000,
            explicit in proptest::collection::vec(0u16..400, 0..8),
            columns in 0usize..10,
        ) {
            let widths = column_widths(columns, &explicit, total);
            prop_assert!(widths.iter().all(|w| *w >= 0));
            prop_assert!(widths.iter().sum::<i32>() <= total.max(0));
        }
    }
}
