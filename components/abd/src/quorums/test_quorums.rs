use super::quorums::*;

#[cfg(test)]
use pretty_assertions::assert_eq;

#[test]
fn test_quorums() {
    let cases: Vec<(usize, usize)> = vec![
        (0, 1),
        (1, 1),
        (2, 2),
        (3, 2),
        (4, 3),
        (5, 3),
        (6, 4),
        (7, 4),
        (8, 5),
        (9, 5),
    ];

    for (n_replicas, q) in cases {
        assert_eq!(q, quorum(n_replicas), "quorum n={}", n_replicas);
    }
}

/// every_subset enumerates all subsets of `n` replicas.
fn every_subset(n: usize) -> Vec<ReplicaSet> {
    (0..(1u32 << n))
        .map(|bits| (0..n).filter(|i| bits & (1 << i) != 0).collect())
        .collect()
}

#[test]
fn test_majorities_intersect() {
    for n in 1..=7 {
        let majorities: Vec<ReplicaSet> = every_subset(n)
            .into_iter()
            .filter(|s| s.is_majority_of(n))
            .collect();

        assert!(!majorities.is_empty(), "n={}", n);

        for a in majorities.iter() {
            for b in majorities.iter() {
                assert!(a.intersects(b), "n={} {} {}", n, a, b);
                assert!(intersects_live_majority(a, b, n));
            }
        }
    }
}

#[test]
fn test_minority_does_not_guarantee_intersection() {
    let n = 5;
    let live: ReplicaSet = [0, 1, 2][..].into();
    let minority: ReplicaSet = [3, 4][..].into();

    assert!(!minority.is_majority_of(n));
    assert!(!intersects_live_majority(&minority, &live, n));

    // live is not a majority, so even an overlapping set is not safe.
    let small: ReplicaSet = [0, 1][..].into();
    assert!(!intersects_live_majority(&live, &small, n));
}

#[test]
fn test_replica_set() {
    let a = ReplicaSet::range(0, 3);
    let b = ReplicaSet::range(2, 5);

    assert_eq!(3, a.len());
    assert!(a.contains(2));
    assert!(!a.contains(3));
    assert!(a.intersects(&b));

    assert_eq!(ReplicaSet::all(5), a.union(&b));
    assert_eq!(ReplicaSet::range(2, 3), a.intersection(&b));
    assert_eq!(ReplicaSet::range(0, 2), a.difference(&b));
    assert_eq!("{0, 1, 2}", format!("{}", a));

    // indexes out of range do not make a majority.
    let outside: ReplicaSet = [0, 7, 8][..].into();
    assert!(!outside.is_majority_of(5));
}

#[test]
fn test_partitions_5() {
    let p = partitions(5);

    assert_eq!(3, p.majority);
    assert_eq!(ReplicaSet::all(5), p.all);
    assert_eq!(ReplicaSet::range(0, 3), p.bottom_majority);
    assert_eq!(ReplicaSet::range(0, 2), p.bottom_minority);
    assert_eq!(ReplicaSet::range(2, 5), p.top_majority);
    assert_eq!(ReplicaSet::range(3, 5), p.top_minority);
    assert_eq!(ReplicaSet::range(1, 4), p.inner_majority);
    assert_eq!(ReplicaSet::from(&[0, 4][..]), p.outer_minority);
}

#[test]
fn test_partitions_sizes() {
    for n in 1..=9 {
        let p = partitions(n);
        let m = quorum(n);

        assert!(p.bottom_majority.is_majority_of(n), "n={}", n);
        assert!(p.top_majority.is_majority_of(n), "n={}", n);
        assert!(p.inner_majority.is_majority_of(n), "n={}", n);

        assert_eq!(m, p.bottom_majority.len());
        assert_eq!(m, p.top_majority.len());
        assert_eq!(m, p.inner_majority.len());
        assert_eq!(m - 1, p.bottom_minority.len());
        assert_eq!(m - 1, p.top_minority.len());
        assert_eq!(n - m, p.outer_minority.len());

        assert!(!p.bottom_minority.is_majority_of(n));
        assert!(!p.top_minority.is_majority_of(n));
        assert!(!p.outer_minority.is_majority_of(n));

        assert!(!p.outer_minority.intersects(&p.inner_majority));
        assert_eq!(p.all, p.inner_majority.union(&p.outer_minority));
    }
}

#[test]
fn test_partitions_empty() {
    let p = partitions(0);
    assert!(p.all.is_empty());
    assert!(p.bottom_majority.is_empty());
    assert!(p.top_minority.is_empty());
    assert!(p.inner_majority.is_empty());
}
