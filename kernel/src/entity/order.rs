mod confirmed_at;
mod id;
mod quantity;
mod status;

pub use self::{confirmed_at::*, id::*, quantity::*, status::*};
use crate::entity::{BookAuthor, BookId, BookTitle, CreatedAt};
use destructure::Destructure;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Order {
    id: OrderId,
    book_id: BookId,
    quantity: OrderQuantity,
    status: OrderStatus,
    created_at: CreatedAt<Order>,
    confirmed_at: Option<ConfirmedAt>,
}

impl Order {
    pub fn new(
        id: OrderId,
        book_id: BookId,
        quantity: OrderQuantity,
        status: OrderStatus,
        created_at: CreatedAt<Order>,
        confirmed_at: Option<ConfirmedAt>,
    ) -> Self {
        Self {
            id,
            book_id,
            quantity,
            status,
            created_at,
            confirmed_at,
        }
    }
}

/// An order that has not been stored yet. New orders always start as pending.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct OrderDraft {
    book_id: BookId,
    quantity: OrderQuantity,
    created_at: CreatedAt<Order>,
}

impl OrderDraft {
    pub fn new(book_id: BookId, quantity: OrderQuantity, created_at: CreatedAt<Order>) -> Self {
        Self {
            book_id,
            quantity,
            created_at,
        }
    }
}

/// An order joined with the book it refers to.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct OrderDetail {
    order: Order,
    book_title: BookTitle,
    book_author: Option<BookAuthor>,
}

impl OrderDetail {
    pub fn new(order: Order, book_title: BookTitle, book_author: Option<BookAuthor>) -> Self {
        Self {
            order,
            book_title,
            book_author,
        }
    }
}
