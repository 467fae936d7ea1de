use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Fromln, AsRefln)]
pub struct OrderId(i64);

impl OrderId {
    pub fn new(id: impl Into<i64>) -> Self {
        Self(id.into())
    }
}
