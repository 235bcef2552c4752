use crate::abdpb::Label;
use crate::abdpb::WriterId;

impl Label {
    pub fn new(seq: i64, writer_id: WriterId) -> Self {
        Label { seq, writer_id }
    }

    /// sentinel is the label of a slot that has never been written.
    /// It is lower than any label a writer produces.
    pub fn sentinel() -> Self {
        Label::default()
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Label::sentinel()
    }

    /// successor returns a label greater than `self`, owned by `writer_id`.
    /// It returns None if `seq` is already `i64::MAX`.
    pub fn successor(&self, writer_id: WriterId) -> Option<Self> {
        let seq = self.seq.checked_add(1)?;
        Some(Label { seq, writer_id })
    }

    /// max_of returns the greatest label in `labels`, or the sentinel if there is none.
    pub fn max_of<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a Label>,
    {
        labels
            .into_iter()
            .copied()
            .max()
            .unwrap_or_else(Label::sentinel)
    }

    /// next_after returns a label strictly greater than every label in `labels`.
    pub fn next_after<'a, I>(labels: I, writer_id: WriterId) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Label>,
    {
        Label::max_of(labels).successor(writer_id)
    }
}
