//! # Flex Solver
//!
//! A direct implementation of the flexbox subset the layout engine needs:
//! one line of items along a main axis with grow, shrink, gap and
//! justification. No wrapping, no baseline alignment, no ordering.
//!
//! ## Distribution Rules
//!
//! - Items start at their flex basis (usually the measured intrinsic size)
//! - Positive free space distributes proportionally to `grow` weights
//! - Negative free space shrinks items proportionally to
//!   `shrink × basis`, never below their minimum size; when every item is
//!   clamped at its minimum the line overflows and the caller clips
//! - Leftover space (no growers) is placed by justification; a single item
//!   under `space-between` sits at the start
//!
//! ## Determinism
//!
//! All arithmetic distributes integer dots by cumulative rounding: item
//! `i` receives `round(total × w₀..ᵢ₊₁) − round(total × w₀..ᵢ)`, so the
//! parts always sum to the whole and the result is independent of float
//! accumulation order.

use super::node::Justify;

/// One item on the main axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexItem {
    /// Starting main-axis size (flex-basis), in dots.
    pub basis: i32,
    /// Share of positive free space. 0 = stay at basis.
    pub grow: f32,
    /// Share of negative free space. The engine default is 1.
    pub shrink: f32,
    /// Lower clamp when shrinking.
    pub min: i32,
}

impl FlexItem {
    /// A rigid item: fixed at its basis.
    pub fn rigid(basis: i32) -> Self {
        Self {
            basis,
            grow: 0.0,
            shrink: 1.0,
            min: 0,
        }
    }

    /// A filling item: basis 0, grow 1 (the `fill` dimension).
    pub fn filling() -> Self {
        Self {
            basis: 0,
            grow: 1.0,
            shrink: 1.0,
            min: 0,
        }
    }
}

/// A solved main-axis slot, relative to the content-box origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub offset: i32,
    pub size: i32,
}

/// Round a float to the nearest integer, ties to even.
///
/// The mandated rounding mode for percentage→dot conversion; also used
/// for every fractional distribution below.
pub fn round_half_even(value: f64) -> i32 {
    let floor = value.floor();
    let frac = value - floor;
    let floor_i = floor as i32;
    if frac > 0.5 {
        floor_i + 1
    } else if frac < 0.5 {
        floor_i
    } else if floor_i % 2 == 0 {
        floor_i
    } else {
        floor_i + 1
    }
}

/// Distribute `total` dots over `weights` by cumulative rounding.
///
/// Returns one share per weight; shares sum exactly to `total` when the
/// weights are non-negative and not all zero.
fn distribute(total: i32, weights: &[f64]) -> Vec<i32> {
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return vec![0; weights.len()];
    }
    let mut shares = Vec::with_capacity(weights.len());
    let mut cumulative = 0.0;
    let mut assigned = 0;
    for &w in weights {
        cumulative += w;
        let up_to = round_half_even(total as f64 * cumulative / sum);
        shares.push(up_to - assigned);
        assigned = up_to;
    }
    shares
}

/// Solve one flex line.
///
/// `available` is the container's content-box main size; `gap` separates
/// adjacent items. Returns one slot per item, offsets relative to the
/// content-box start.
pub fn solve(items: &[FlexItem], available: i32, gap: i32, justify: Justify) -> Vec<Slot> {
    if items.is_empty() {
        return Vec::new();
    }

    let gaps_total = gap * (items.len() as i32 - 1);
    let basis_total: i32 = items.iter().map(|item| item.basis).sum();
    let free = available - basis_total - gaps_total;

    let mut sizes: Vec<i32> = items.iter().map(|item| item.basis).collect();

    if free > 0 {
        let weights: Vec<f64> = items.iter().map(|item| item.grow as f64).collect();
        for (size, extra) in sizes.iter_mut().zip(distribute(free, &weights)) {
            *size += extra;
        }
    } else if free < 0 {
        shrink(&mut sizes, items, -free);
    }

    // Justification places whatever space the items did not claim.
    let used: i32 = sizes.iter().sum::<i32>() + gaps_total;
    let leftover = (available - used).max(0);

    let (lead, between_extra) = match justify {
        Justify::Start => (0, vec![0; items.len().saturating_sub(1)]),
        Justify::Center => (leftover / 2, vec![0; items.len().saturating_sub(1)]),
        Justify::End => (leftover, vec![0; items.len().saturating_sub(1)]),
        Justify::SpaceBetween => {
            if items.len() < 2 {
                // A lone child under space-between sits at the start.
                (0, Vec::new())
            } else {
                let weights = vec![1.0; items.len() - 1];
                (0, distribute(leftover, &weights))
            }
        }
    };

    let mut slots = Vec::with_capacity(items.len());
    let mut cursor = lead;
    for (i, size) in sizes.into_iter().enumerate() {
        slots.push(Slot {
            offset: cursor,
            size,
        });
        cursor += size + gap;
        if let Some(extra) = between_extra.get(i) {
            cursor += extra;
        }
    }
    slots
}

/// Shrink items to absorb `deficit` dots, clamping at each item's minimum.
///
/// Weights follow CSS: `shrink × basis`, so large items give up more.
/// Items that hit their minimum freeze and the remainder redistributes
/// over the rest; when everything is frozen the line overflows.
fn shrink(sizes: &mut [i32], items: &[FlexItem], mut deficit: i32) {
    let mut frozen = vec![false; items.len()];

    while deficit > 0 {
        let weights: Vec<f64> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if frozen[i] {
                    0.0
                } else {
                    item.shrink as f64 * item.basis as f64
                }
            })
            .collect();
        if weights.iter().sum::<f64>() <= 0.0 {
            break;
        }

        let cuts = distribute(deficit, &weights);
        let mut clamped = false;
        for (i, cut) in cuts.into_iter().enumerate() {
            if frozen[i] || cut == 0 {
                continue;
            }
            let target = sizes[i] - cut;
            if target < items[i].min {
                deficit -= sizes[i] - items[i].min;
                sizes[i] = items[i].min;
                frozen[i] = true;
                clamped = true;
            } else {
                sizes[i] = target;
                deficit -= cut;
            }
        }
        if !clamped {
            break;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(2.4), 2);
        assert_eq!(round_half_even(2.6), 3);
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(3.5), 4);
        assert_eq!(round_half_even(-0.5), 0);
        assert_eq!(round_half_even(5.0), 5);
    }

    #[test]
    fn test_rigid_items_at_basis() {
        let slots = solve(
            &[FlexItem::rigid(100), FlexItem::rigid(200)],
            720,
            0,
            Justify::Start,
        );
        assert_eq!(
            slots,
            vec![
                Slot {
                    offset: 0,
                    size: 100
                },
                Slot {
                    offset: 100,
                    size: 200
                },
            ]
        );
    }

    #[test]
    fn test_single_grower_takes_free_space() {
        let slots = solve(
            &[
                FlexItem::rigid(100),
                FlexItem::filling(),
                FlexItem::rigid(200),
            ],
            720,
            0,
            Justify::Start,
        );
        assert_eq!(slots[1].size, 420);
        assert_eq!(slots[2].offset, 520);
        // The last item ends exactly at the content edge.
        assert_eq!(slots[2].offset + slots[2].size, 720);
    }

    #[test]
    fn test_grow_distribution_sums_exactly() {
        // 100 dots over three equal growers: 33/33/34 in some split.
        let items = [FlexItem::filling(), FlexItem::filling(), FlexItem::filling()];
        let slots = solve(&items, 100, 0, Justify::Start);
        let total: i32 = slots.iter().map(|s| s.size).sum();
        assert_eq!(total, 100);
        for slot in &slots {
            assert!((slot.size - 33).abs() <= 1);
        }
    }

    #[test]
    fn test_gap_accounted() {
        let slots = solve(
            &[FlexItem::rigid(50), FlexItem::rigid(50)],
            200,
            20,
            Justify::Start,
        );
        assert_eq!(slots[1].offset, 70);
    }

    #[test]
    fn test_shrink_proportional_to_basis() {
        // 300 + 100 into 200: deficit 200 splits 3:1.
        let slots = solve(
            &[FlexItem::rigid(300), FlexItem::rigid(100)],
            200,
            0,
            Justify::Start,
        );
        assert_eq!(slots[0].size, 150);
        assert_eq!(slots[1].size, 50);
    }

    #[test]
    fn test_shrink_respects_min() {
        let items = [
            FlexItem {
                basis: 300,
                grow: 0.0,
                shrink: 1.0,
                min: 280,
            },
            FlexItem::rigid(100),
        ];
        let slots = solve(&items, 200, 0, Justify::Start);
        assert_eq!(slots[0].size, 280);
        // The other item absorbs what it can; the line still overflows.
        assert!(slots[1].size < 100);
    }

    #[test]
    fn test_overflow_never_negative() {
        let items = [
            FlexItem {
                basis: 300,
                grow: 0.0,
                shrink: 1.0,
                min: 300,
            },
            FlexItem {
                basis: 200,
                grow: 0.0,
                shrink: 1.0,
                min: 200,
            },
        ];
        let slots = solve(&items, 100, 0, Justify::Start);
        assert_eq!(slots[0].size, 300);
        assert_eq!(slots[1].size, 200);
    }

    #[test]
    fn test_justify_center_and_end() {
        let centered = solve(&[FlexItem::rigid(100)], 300, 0, Justify::Center);
        assert_eq!(centered[0].offset, 100);

        let ended = solve(&[FlexItem::rigid(100)], 300, 0, Justify::End);
        assert_eq!(ended[0].offset, 200);
    }

    #[test]
    fn test_space_between() {
        let slots = solve(
            &[
                FlexItem::rigid(50),
                FlexItem::rigid(50),
                FlexItem::rigid(50),
            ],
            350,
            0,
            Justify::SpaceBetween,
        );
        assert_eq!(slots[0].offset, 0);
        assert_eq!(slots[1].offset, 150);
        assert_eq!(slots[2].offset, 300);
        assert_eq!(slots[2].offset + slots[2].size, 350);
    }

    #[test]
    fn test_space_between_single_child_at_start() {
        let slots = solve(&[FlexItem::rigid(100)], 400, 0, Justify::SpaceBetween);
        assert_eq!(slots[0].offset, 0);
    }

    #[test]
    fn test_growers_defeat_justification() {
        // With a grower there is no leftover, so justify is a no-op.
        let slots = solve(
            &[FlexItem::rigid(100), FlexItem::filling()],
            400,
            0,
            Justify::End,
        );
        assert_eq!(slots[0].offset, 0);
        assert_eq!(slots[1].offset + slots[1].size, 400);
    }

    #[test]
    fn test_empty_line() {
        assert!(solve(&[], 100, 0, Justify::Start).is_empty());
    }
}
