use std::str::FromStr;

use error_stack::Report;

use crate::KernelError;

const PENDING: &str = "pending";
const CONFIRMED: &str = "confirmed";
const CANCELLED: &str = "cancelled";

/// `Pending` is the only state an order can leave; the other two are terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => PENDING,
            OrderStatus::Confirmed => CONFIRMED,
            OrderStatus::Cancelled => CANCELLED,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }
}

impl FromStr for OrderStatus {
    type Err = Report<KernelError>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PENDING => Ok(OrderStatus::Pending),
            CONFIRMED => Ok(OrderStatus::Confirmed),
            CANCELLED => Ok(OrderStatus::Cancelled),
            _ => Err(Report::new(KernelError::Internal)
                .attach_printable(format!("Unknown order status: {s}"))),
        }
    }
}
