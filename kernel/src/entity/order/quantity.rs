use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Fromln, AsRefln)]
pub struct OrderQuantity(i64);

impl OrderQuantity {
    pub fn new(quantity: impl Into<i64>) -> Self {
        Self(quantity.into())
    }
}
