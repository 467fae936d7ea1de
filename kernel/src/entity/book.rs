mod author;
mod id;
mod stock;
mod title;

pub use self::{author::*, id::*, stock::*, title::*};
use crate::entity::common::CreatedAt;
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    author: Option<BookAuthor>,
    stock: BookStock,
    created_at: CreatedAt<Book>,
}

impl Book {
    pub fn new(
        id: BookId,
        title: BookTitle,
        author: Option<BookAuthor>,
        stock: BookStock,
        created_at: CreatedAt<Book>,
    ) -> Self {
        Self {
            id,
            title,
            author,
            stock,
            created_at,
        }
    }
}

/// A book that has not been stored yet and therefore has no id.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct BookDraft {
    title: BookTitle,
    author: Option<BookAuthor>,
    stock: BookStock,
    created_at: CreatedAt<Book>,
}

impl BookDraft {
    pub fn new(
        title: BookTitle,
        author: Option<BookAuthor>,
        stock: BookStock,
        created_at: CreatedAt<Book>,
    ) -> Self {
        Self {
            title,
            author,
            stock,
            created_at,
        }
    }
}

/// Partial update of a [`Book`]. `None` keeps the stored value.
///
/// `author` is doubly optional so that `Some(None)` clears it.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BookPatch {
    title: Option<BookTitle>,
    author: Option<Option<BookAuthor>>,
    stock: Option<BookStock>,
}

impl BookPatch {
    pub fn new(
        title: Option<BookTitle>,
        author: Option<Option<BookAuthor>>,
        stock: Option<BookStock>,
    ) -> Self {
        Self {
            title,
            author,
            stock,
        }
    }

    pub fn apply(self, book: &mut Book) {
        let Self {
            title,
            author,
            stock,
        } = self;
        book.substitute(|book| {
            if let Some(title) = title {
                *book.title = title;
            }
            if let Some(author) = author {
                *book.author = author;
            }
            if let Some(stock) = stock {
                *book.stock = stock;
            }
        });
    }
}
