use crate::abdpb::OpKind;

quick_error! {
    /// StoreError is returned when a replica refuses an operation.
    #[derive(Debug, Eq, PartialEq)]
    pub enum StoreError {
        Disabled(op: OpKind) {
            display("{} is disabled", op)
        }
    }
}
