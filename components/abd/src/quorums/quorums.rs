use std::collections::BTreeSet;
use std::fmt;
use std::iter::FromIterator;

/// quorum returns the majority size of `n` replicas.
/// Any two sets of at least this size out of `n` intersect.
pub fn quorum(n: usize) -> usize {
    n / 2 + 1
}

/// ReplicaSet is a set of replica indexes, i.e. positions in the configured replica list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplicaSet {
    ids: BTreeSet<usize>,
}

impl ReplicaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// range builds the set of indexes in `[start, end)`.
    pub fn range(start: usize, end: usize) -> Self {
        (start..end).collect()
    }

    /// all builds the set of every index of `n` replicas.
    pub fn all(n: usize) -> Self {
        Self::range(0, n)
    }

    pub fn insert(&mut self, idx: usize) -> bool {
        self.ids.insert(idx)
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.ids.contains(&idx)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.ids.iter().copied()
    }

    pub fn union(&self, other: &ReplicaSet) -> ReplicaSet {
        self.ids.union(&other.ids).copied().collect()
    }

    pub fn intersection(&self, other: &ReplicaSet) -> ReplicaSet {
        self.ids.intersection(&other.ids).copied().collect()
    }

    pub fn difference(&self, other: &ReplicaSet) -> ReplicaSet {
        self.ids.difference(&other.ids).copied().collect()
    }

    pub fn intersects(&self, other: &ReplicaSet) -> bool {
        self.ids.intersection(&other.ids).next().is_some()
    }

    /// is_majority_of checks if this set is large enough to be a quorum of `n` replicas.
    /// Indexes out of `[0, n)` do not count.
    pub fn is_majority_of(&self, n: usize) -> bool {
        self.ids.range(..n).count() >= quorum(n)
    }
}

impl FromIterator<usize> for ReplicaSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        ReplicaSet {
            ids: iter.into_iter().collect(),
        }
    }
}

impl From<&[usize]> for ReplicaSet {
    fn from(ids: &[usize]) -> Self {
        ids.iter().copied().collect()
    }
}

impl fmt::Display for ReplicaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.ids.iter().map(|i| i.to_string()).collect();
        write!(f, "{{{}}}", ids.join(", "))
    }
}

/// QuorumPartitions names the replica subsets used to inject failures.
///
/// With `n` replicas and majority `m`:
/// - bottom_majority: `[0, m)`
/// - bottom_minority: `[0, m-1)`
/// - top_majority: `[n-m, n)`
/// - top_minority: `[n-m+1, n)`
/// - inner_majority: `m` replicas starting at `(n-m)/2`
/// - outer_minority: all replicas not in inner_majority
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuorumPartitions {
    pub n: usize,
    pub majority: usize,
    pub all: ReplicaSet,
    pub bottom_majority: ReplicaSet,
    pub bottom_minority: ReplicaSet,
    pub top_majority: ReplicaSet,
    pub top_minority: ReplicaSet,
    pub inner_majority: ReplicaSet,
    pub outer_minority: ReplicaSet,
}

/// partitions computes the named subsets of `n` replicas.
/// It does not touch any connection; the result only depends on `n`.
pub fn partitions(n: usize) -> QuorumPartitions {
    let m = quorum(n);

    // n = 0 has no replica to partition; every set is empty.
    let m_in = m.min(n);
    let inner_start = (n - m_in) / 2;
    let inner_majority = ReplicaSet::range(inner_start, inner_start + m_in);

    QuorumPartitions {
        n,
        majority: m,
        all: ReplicaSet::all(n),
        bottom_majority: ReplicaSet::range(0, m_in),
        bottom_minority: ReplicaSet::range(0, m_in.saturating_sub(1)),
        top_majority: ReplicaSet::range(n - m_in, n),
        top_minority: ReplicaSet::range((n - m_in + 1).min(n), n),
        outer_minority: ReplicaSet::all(n)
            .iter()
            .filter(|i| !inner_majority.contains(*i))
            .collect(),
        inner_majority,
    }
}

/// intersects_live_majority checks if `set` shares at least one replica with `live`, given
/// that `live` is a majority of `n`.
///
/// A set that passes this check is guaranteed to observe anything `live` has stored.
pub fn intersects_live_majority(set: &ReplicaSet, live: &ReplicaSet, n: usize) -> bool {
    live.is_majority_of(n) && set.intersects(live)
}
