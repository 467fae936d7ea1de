use vodca::{AsRefln, Fromln};

use crate::entity::OrderQuantity;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Fromln, AsRefln)]
pub struct BookStock(i64);

impl BookStock {
    pub fn new(stock: impl Into<i64>) -> Self {
        Self(stock.into())
    }

    pub fn covers(&self, quantity: &OrderQuantity) -> bool {
        let quantity: &i64 = quantity.as_ref();
        self.0 >= *quantity
    }

    /// Stock left after handing out `quantity`, which may be negative.
    pub fn after(&self, quantity: &OrderQuantity) -> i64 {
        let quantity: &i64 = quantity.as_ref();
        self.0 - *quantity
    }
}
