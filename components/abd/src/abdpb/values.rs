use crate::abdpb::value::Kind;
use crate::abdpb::Value;

impl Value {
    pub fn int(v: i64) -> Self {
        Value {
            kind: Some(Kind::Int(v)),
        }
    }

    pub fn text<S: Into<String>>(v: S) -> Self {
        Value {
            kind: Some(Kind::Text(v.into())),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            Some(Kind::Int(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self.kind {
            Some(Kind::Text(ref v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// parse builds an integer value if `s` is a number, otherwise a text value.
    pub fn parse(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(v) => Value::int(v),
            Err(_) => Value::text(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::text(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::text(v)
    }
}
