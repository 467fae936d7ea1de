use time::OffsetDateTime;

use kernel::prelude::entity::{Book, DestructBook};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub stock: i64,
    pub created_at: OffsetDateTime,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            id,
            title,
            author,
            stock,
            created_at,
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            author: author.map(Into::into),
            stock: stock.into(),
            created_at: created_at.into(),
        }
    }
}

#[derive(Debug)]
pub struct GetBookDto {
    pub id: i64,
}

#[derive(Debug)]
pub struct SearchBookDto {
    pub query: Option<String>,
}

#[derive(Debug)]
pub struct CreateBookDto {
    pub title: String,
    pub author: Option<String>,
    pub stock: Option<i64>,
}

/// `None` leaves a field untouched; `author: Some(None)` clears the author.
#[derive(Debug)]
pub struct UpdateBookDto {
    pub id: i64,
    pub title: Option<String>,
    pub author: Option<Option<String>>,
    pub stock: Option<i64>,
}
