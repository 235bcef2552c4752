use crate::abdpb::Label;

#[test]
fn test_label_order() {
    let cases: Vec<((i64, i64), (i64, i64))> = vec![
        ((0, 0), (0, 1)),
        ((0, 9), (1, 0)),
        ((1, 2), (1, 3)),
        ((1, 3), (2, 0)),
        ((5, 100), (6, 1)),
    ];

    for (a, b) in cases {
        let a = Label::from(a);
        let b = Label::from(b);
        assert!(a < b, "{} < {}", a, b);
        assert!(b > a, "{} > {}", b, a);
        assert_ne!(a, b);
    }
}

#[test]
fn test_label_sentinel() {
    let s = Label::sentinel();
    assert!(s.is_sentinel());
    assert_eq!(Label::new(0, 0), s);

    assert!(s < Label::new(0, 1));
    assert!(s < Label::new(1, 0));
    assert!(!Label::new(1, 0).is_sentinel());
}

#[test]
fn test_label_successor() {
    let l = Label::new(3, 7);
    let next = l.successor(2).unwrap();

    assert_eq!(Label::new(4, 2), next);
    assert!(next > l);

    // a successor beats any label with the same seq, whatever the writer.
    assert!(Label::new(3, i64::MAX) < l.successor(0).unwrap());
}

#[test]
fn test_label_successor_exhausted() {
    assert_eq!(None, Label::new(i64::MAX, 0).successor(1));
    assert_eq!(
        Some(Label::new(i64::MAX, 1)),
        Label::new(i64::MAX - 1, 9).successor(1)
    );

    let labels = vec![Label::new(1, 1), Label::new(i64::MAX, 3)];
    assert_eq!(None, Label::next_after(&labels, 1));
}

#[test]
fn test_label_max_of() {
    let labels = vec![Label::new(1, 5), Label::new(3, 1), Label::new(3, 0), Label::new(2, 9)];
    assert_eq!(Label::new(3, 1), Label::max_of(&labels));

    let empty: Vec<Label> = vec![];
    assert_eq!(Label::sentinel(), Label::max_of(&empty));
}

#[test]
fn test_label_next_after() {
    let labels = vec![Label::new(1, 5), Label::new(4, 1)];
    let next = Label::next_after(&labels, 3).unwrap();

    assert_eq!(Label::new(5, 3), next);
    for l in labels.iter() {
        assert!(next > *l);
    }

    // distinct writers never produce equal labels from the same observation.
    let a = Label::next_after(&labels, 1).unwrap();
    let b = Label::next_after(&labels, 2).unwrap();
    assert_ne!(a, b);
    assert!(a < b);
}
