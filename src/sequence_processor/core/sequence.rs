/// A single decoded read. Produced by a reader and dropped once every
/// processor has looked at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub data: Vec<u8>,
}

impl Sequence {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}
