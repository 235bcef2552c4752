use crate::abdpb::{Label, OpKind, Value};
use crate::store::*;
use crate::testutil::test_logger;

#[cfg(test)]
use pretty_assertions::assert_eq;

fn new_store() -> ReplicaStore {
    ReplicaStore::new("r0", &test_logger())
}

#[test]
fn test_store_read1_unwritten() {
    let sto = new_store();

    let slot = sto.read1(18).unwrap();
    assert_eq!(Slot::default(), slot);
    assert!(slot.label.is_sentinel());
    assert_eq!(None, slot.value);
}

#[test]
fn test_store_write_then_read1() {
    let sto = new_store();

    let a = sto.write(17, Label::new(1, 3), Value::int(1717)).unwrap();
    assert_eq!(Adoption::Adopted, a);

    assert_eq!(Slot::new(Label::new(1, 3), Value::int(1717)), sto.read1(17).unwrap());

    // other addresses are independent
    assert_eq!(Slot::default(), sto.read1(18).unwrap());
}

#[test]
fn test_store_adoption_rule() {
    let sto = new_store();

    // (label to offer, expected adoption, expected stored label, expected stored value)
    let cases: Vec<(Label, i64, Adoption, Label, i64)> = vec![
        (Label::new(2, 0), 20, Adoption::Adopted, Label::new(2, 0), 20),
        // equal label: no-op
        (Label::new(2, 0), 21, Adoption::Stale, Label::new(2, 0), 20),
        // lower label: no-op
        (Label::new(1, 9), 19, Adoption::Stale, Label::new(2, 0), 20),
        // same seq, greater writer id
        (Label::new(2, 1), 22, Adoption::Adopted, Label::new(2, 1), 22),
        (Label::new(5, 0), 50, Adoption::Adopted, Label::new(5, 0), 50),
    ];

    for (i, (label, v, want_adoption, want_label, want_value)) in cases.into_iter().enumerate() {
        let op = if i % 2 == 0 { OpKind::Write } else { OpKind::Read2 };
        let got = match op {
            OpKind::Write => sto.write(7, label, Value::int(v)),
            _ => sto.read2(7, label, Value::int(v)),
        };

        assert_eq!(Ok(want_adoption), got, "case {}", i);
        assert_eq!(
            Slot::new(want_label, Value::int(want_value)),
            sto.read1(7).unwrap(),
            "case {}",
            i
        );
    }
}

#[test]
fn test_store_adoption_idempotent() {
    let sto = new_store();
    let label = Label::new(4, 2);

    assert_eq!(Ok(Adoption::Adopted), sto.read2(9, label, Value::text("x")));
    let first = sto.read1(9).unwrap();

    assert_eq!(Ok(Adoption::Stale), sto.read2(9, label, Value::text("x")));
    assert_eq!(Ok(Adoption::Stale), sto.write(9, label, Value::text("x")));
    assert_eq!(first, sto.read1(9).unwrap());
}

#[test]
fn test_store_sentinel_label_never_adopted() {
    let sto = new_store();

    assert_eq!(Ok(Adoption::Stale), sto.write(3, Label::sentinel(), Value::int(1)));
    assert_eq!(Ok(Adoption::Stale), sto.read2(4, Label::sentinel(), Value::int(1)));
    assert_eq!(Slot::default(), sto.read1(3).unwrap());

    // stale offers and reads do not occupy any address
    assert!(sto.is_empty());

    sto.write(3, Label::new(1, 1), Value::int(1)).unwrap();
    assert_eq!(1, sto.len());
}

#[test]
fn test_store_capabilities() {
    let sto = new_store();
    assert_eq!(Capabilities::all(), sto.capabilities());

    sto.write(1000, Label::new(10, 0), Value::int(1)).unwrap();

    // everything disabled but read1
    sto.enable(Capabilities::new(false, true, false));
    assert_eq!(
        Err(StoreError::Disabled(OpKind::Write)),
        sto.write(1000, Label::new(11, 0), Value::int(1))
    );
    assert_eq!(
        Err(StoreError::Disabled(OpKind::Read2)),
        sto.read2(1000, Label::new(12, 0), Value::int(2))
    );
    assert_eq!(
        Slot::new(Label::new(10, 0), Value::int(1)),
        sto.read1(1000).unwrap()
    );

    // everything disabled but read2
    sto.enable(Capabilities::new(false, false, true));
    assert_eq!(Err(StoreError::Disabled(OpKind::Read1)), sto.read1(1000));
    assert_eq!(
        Ok(Adoption::Adopted),
        sto.read2(1000, Label::new(13, 0), Value::int(2))
    );

    sto.enable(Capabilities::all());
    assert_eq!(
        Slot::new(Label::new(13, 0), Value::int(2)),
        sto.read1(1000).unwrap()
    );

    sto.enable(Capabilities::none());
    for op in OpKind::all() {
        assert!(!sto.capabilities().allows(op));
    }
}

#[test]
fn test_store_disabled_error_display() {
    assert_eq!("read1 is disabled", format!("{}", StoreError::Disabled(OpKind::Read1)));
}

#[test]
fn test_store_labels_never_decrease() {
    let sto = new_store();

    let offers = vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
    let mut max = Label::sentinel();

    for (i, seq) in offers.into_iter().enumerate() {
        sto.write(1, Label::new(seq, 0), Value::int(i as i64)).unwrap();

        let stored = sto.read1(1).unwrap().label;
        assert!(stored >= max);
        max = stored;
    }

    assert_eq!(Label::new(9, 0), max);
}
