use time::OffsetDateTime;

use kernel::prelude::entity::{DestructOrder, DestructOrderDetail, Order, OrderDetail};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OrderDto {
    pub id: i64,
    pub book_id: i64,
    pub quantity: i64,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub confirmed_at: Option<OffsetDateTime>,
}

impl From<Order> for OrderDto {
    fn from(value: Order) -> Self {
        let DestructOrder {
            id,
            book_id,
            quantity,
            status,
            created_at,
            confirmed_at,
        } = value.into_destruct();
        Self {
            id: id.into(),
            book_id: book_id.into(),
            quantity: quantity.into(),
            status: status.as_str().to_string(),
            created_at: created_at.into(),
            confirmed_at: confirmed_at.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OrderDetailDto {
    pub order: OrderDto,
    pub book_title: String,
    pub book_author: Option<String>,
}

impl From<OrderDetail> for OrderDetailDto {
    fn from(value: OrderDetail) -> Self {
        let DestructOrderDetail {
            order,
            book_title,
            book_author,
        } = value.into_destruct();
        Self {
            order: order.into(),
            book_title: book_title.into(),
            book_author: book_author.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConfirmedOrderDto {
    pub order: OrderDto,
    pub remaining_stock: i64,
}

#[derive(Debug)]
pub struct GetOrderDto {
    pub id: i64,
}

#[derive(Debug)]
pub struct CreateOrderDto {
    pub book_id: Option<i64>,
    pub quantity: Option<i64>,
}

#[derive(Debug)]
pub struct ConfirmOrderDto {
    pub id: i64,
}

#[derive(Debug)]
pub struct CancelOrderDto {
    pub id: i64,
}
