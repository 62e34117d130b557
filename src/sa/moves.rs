//! Bounded-window position swap moves.

use rand::Rng;

/// How far apart the two swapped positions may be.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveWindow {
    /// A fixed maximum span `k`.
    Fixed(usize),

    /// `max(round(fraction * n), floor)`: grows with the instance size.
    Scaled {
        /// Share of the city count used as the span.
        fraction: f64,
        /// Smallest span used on small instances.
        floor: usize,
    },
}

impl Default for MoveWindow {
    fn default() -> Self {
        MoveWindow::Scaled {
            fraction: 0.01,
            floor: 10,
        }
    }
}

impl MoveWindow {
    /// Resolves the window for an instance of `n` cities, never below 2.
    pub fn span_for(&self, n: usize) -> usize {
        let k = match *self {
            MoveWindow::Fixed(k) => k,
            MoveWindow::Scaled { fraction, floor } => {
                ((fraction * n as f64).round() as usize).max(floor)
            }
        };
        k.max(Swap::MIN_SPAN)
    }
}

/// Exchange of the cities at two interior tour positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    /// Lower position, in `[1, n - 3]`.
    pub first: usize,
    /// Upper position, in `[first + 2, min(first + k, n - 1)]`.
    pub second: usize,
}

impl Swap {
    /// Smallest allowed distance between the two positions. Adjacent
    /// positions would only reorder a single edge pair.
    pub const MIN_SPAN: usize = 2;

    pub fn span(&self) -> usize {
        self.second - self.first
    }
}

/// Samples swap moves for a tour of fixed size.
#[derive(Debug, Clone)]
pub struct MoveGenerator {
    cities: usize,
    window: usize,
}

impl MoveGenerator {
    /// Smallest instance that admits a swap with span of at least 2.
    pub const MIN_CITIES: usize = 4;

    /// Creates a generator for `cities` cities, or `None` when no valid swap
    /// exists (fewer than four cities).
    pub fn new(cities: usize, window: MoveWindow) -> Option<Self> {
        if cities < Self::MIN_CITIES {
            return None;
        }
        Some(Self {
            cities,
            window: window.span_for(cities),
        })
    }

    /// Effective maximum span `k`.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Draws one swap.
    ///
    /// The lower position is uniform over every position that still leaves
    /// room for a span of two before the closing anchor; the span is then
    /// uniform over `[2, min(k, n - 1 - first)]`. Both ranges are non-empty
    /// by construction, so no resampling is needed.
    pub fn propose<R: Rng>(&self, rng: &mut R) -> Swap {
        let n = self.cities;
        let first = rng.random_range(1..=n - 3);
        let max_span = self.window.min(n - 1 - first);
        debug_assert!(max_span >= Swap::MIN_SPAN);
        let span = rng.random_range(Swap::MIN_SPAN..=max_span);
        Swap {
            first,
            second: first + span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use proptest::prelude::*;

    #[test]
    fn test_degenerate_sizes_have_no_generator() {
        for n in 0..4 {
            assert!(MoveGenerator::new(n, MoveWindow::default()).is_none());
        }
        assert!(MoveGenerator::new(4, MoveWindow::default()).is_some());
    }

    #[test]
    fn test_four_cities_only_one_move() {
        let moves = MoveGenerator::new(4, MoveWindow::Fixed(50)).unwrap();
        let mut rng = create_rng(1);
        for _ in 0..100 {
            assert_eq!(
                moves.propose(&mut rng),
                Swap {
                    first: 1,
                    second: 3
                }
            );
        }
    }

    #[test]
    fn test_window_sizing() {
        assert_eq!(MoveWindow::default().span_for(100), 10);
        assert_eq!(MoveWindow::default().span_for(5000), 50);
        assert_eq!(MoveWindow::Fixed(0).span_for(100), 2);
        assert_eq!(MoveWindow::Fixed(7).span_for(100), 7);
        let scaled = MoveWindow::Scaled {
            fraction: 0.7,
            floor: 1,
        };
        assert_eq!(scaled.span_for(10), 7);
    }

    #[test]
    fn test_spans_cover_window() {
        let moves = MoveGenerator::new(200, MoveWindow::Fixed(5)).unwrap();
        let mut rng = create_rng(9);
        let mut seen = [false; 6];
        for _ in 0..2000 {
            seen[moves.propose(&mut rng).span()] = true;
        }
        assert_eq!(seen, [false, false, true, true, true, true]);
    }

    proptest! {
        #[test]
        fn prop_swap_is_interior_and_spread(
            n in 4usize..400,
            k in 0usize..60,
            seed in any::<u64>(),
        ) {
            let moves = MoveGenerator::new(n, MoveWindow::Fixed(k)).unwrap();
            let k = moves.window();
            let mut rng = create_rng(seed);
            for _ in 0..64 {
                let swap = moves.propose(&mut rng);
                prop_assert!(swap.first >= 1);
                prop_assert!(swap.second <= n - 1);
                prop_assert!(swap.span() >= 2, "span {} too small", swap.span());
                prop_assert!(swap.span() <= k);
            }
        }
    }
}
