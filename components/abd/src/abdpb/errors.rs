use tonic::Status;

quick_error! {
    /// ProtocolError is a malformed request or reply.
    #[derive(Debug, Eq, PartialEq)]
    pub enum ProtocolError {
        LackOf(field: String) {
            display("lack of required field:{}", field)
        }

        UnknownRc(code: i32) {
            display("unknown rc:{}", code)
        }

        UnexpectedRc(rc: String, op: String) {
            display("unexpected rc:{} in {} reply", rc, op)
        }
    }
}

impl From<ProtocolError> for Status {
    fn from(e: ProtocolError) -> Self {
        Status::invalid_argument(format!("{}", e))
    }
}
