//! Property Tests
//!
//! The result of a pipeline equals the left fold of its stages over the
//! assigned value, regardless of how many stages were registered before or
//! after completion.

use crate::*;
use proptest::prelude::*;

/// Affine map `x -> a * x + b`, non-commutative under composition
#[derive(Debug, Clone, Copy)]
struct Affine {
    a: i64,
    b: i64,
}

impl Affine {
    fn apply(self, x: i64) -> i64 {
        x.wrapping_mul(self.a).wrapping_add(self.b)
    }

    fn stage(self) -> impl Fn(&PipedFuture<i64>) -> Result<i64> + Send + Sync + 'static {
        move |f: &PipedFuture<i64>| Ok(self.apply(f.result(None)?))
    }
}

fn affine() -> impl Strategy<Value = Affine> {
    (-3i64..=3, -100i64..=100).prop_map(|(a, b)| Affine { a, b })
}

fn expected(start: i64, maps: &[Affine]) -> i64 {
    maps.iter().fold(start, |x, m| m.apply(x))
}

proptest! {
    #[test]
    fn prop_result_is_fold_of_stages(
        start in -1000i64..1000,
        maps in prop::collection::vec(affine(), 0..16),
    ) {
        let cell = PipedFuture::new();
        for m in &maps {
            cell.add_done_callback(m.stage()).unwrap();
        }
        cell.set_result(start).unwrap();
        prop_assert_eq!(cell.result(None).unwrap(), expected(start, &maps));
    }

    #[test]
    fn prop_split_registration_matches_fold(
        start in -1000i64..1000,
        maps in prop::collection::vec(affine(), 0..16),
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(maps.len() + 1);
        let cell = PipedFuture::new();
        for m in &maps[..at] {
            cell.add_done_callback(m.stage()).unwrap();
        }
        cell.set_result(start).unwrap();
        prop_assert_eq!(cell.result(None).unwrap(), expected(start, &maps[..at]));

        for m in &maps[at..] {
            cell.add_done_callback(m.stage()).unwrap();
        }
        prop_assert_eq!(cell.result(None).unwrap(), expected(start, &maps));
    }

    #[test]
    fn prop_splice_equals_concatenated_pipeline(
        start in -1000i64..1000,
        before in prop::collection::vec(affine(), 0..6),
        inner in prop::collection::vec(affine(), 0..6),
        after in prop::collection::vec(affine(), 0..6),
    ) {
        let embedded = PipedFuture::new();
        for m in &inner {
            embedded.add_done_callback(m.stage()).unwrap();
        }
        let host = PipedFuture::new();
        for m in &before {
            host.add_done_callback(m.stage()).unwrap();
        }
        host.add_done_future(embedded.clone()).unwrap();
        for m in &after {
            host.add_done_callback(m.stage()).unwrap();
        }
        host.set_result(start).unwrap();

        let mid = expected(start, &before);
        let through = expected(mid, &inner);
        prop_assert_eq!(embedded.result(None).unwrap(), through);
        prop_assert_eq!(host.result(None).unwrap(), expected(through, &after));
    }
}
