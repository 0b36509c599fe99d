/// Steers which member of a run of equal keys an operation targets.
///
/// Only meaningful while duplicates are enabled; with duplicates off every
/// operation behaves as [`Bias::Arbitrary`].
///
/// # Examples
///
/// ```
/// use rank_tree::{Bias, RankTreeMap};
///
/// let mut map = RankTreeMap::new();
/// map.set_allows_duplicates(true).unwrap();
/// map.set_insert_bias(Bias::Tail);
/// map.try_insert(7, "first").unwrap();
/// map.try_insert(7, "second").unwrap();
///
/// map.set_lookup_bias(Bias::Head);
/// assert_eq!(map.get(&7), Some(&"first"));
/// map.set_lookup_bias(Bias::Tail);
/// assert_eq!(map.get(&7), Some(&"second"));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Bias {
    /// Target the first member of the run.
    Head,
    /// Target whichever member the search lands on.
    #[default]
    Arbitrary,
    /// Target the last member of the run.
    Tail,
}

impl Bias {
    /// True for [`Bias::Head`].
    #[must_use]
    pub const fn is_head(self) -> bool {
        matches!(self, Bias::Head)
    }

    /// True for [`Bias::Tail`].
    #[must_use]
    pub const fn is_tail(self) -> bool {
        matches!(self, Bias::Tail)
    }
}
