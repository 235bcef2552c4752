use std::fmt;

use crate::abdpb::value::Kind;
use crate::abdpb::Label;
use crate::abdpb::OpKind;
use crate::abdpb::Value;

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.seq, self.writer_id)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(Kind::Int(v)) => write!(f, "{}", v),
            Some(Kind::Text(ref v)) => write!(f, "{}", v),
            None => write!(f, "<none>"),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &str = self.into();
        write!(f, "{}", s)
    }
}
