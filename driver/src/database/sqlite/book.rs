use sqlx::SqliteConnection;
use time::OffsetDateTime;

use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{
    Book, BookAuthor, BookDraft, BookId, BookStock, BookTitle, CreatedAt, OrderQuantity,
};
use kernel::KernelError;

use crate::database::sqlite::SqliteTransaction;
use crate::error::ConvertError;

pub struct SqliteBookRepository;

#[async_trait::async_trait]
impl BookQuery for SqliteBookRepository {
    type Transaction = SqliteTransaction;

    async fn find_by_id(
        &self,
        con: &mut SqliteTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        SqliteBookInternal::find_by_id(con.connection()?, id).await
    }

    async fn search(
        &self,
        con: &mut SqliteTransaction,
        query: Option<&str>,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        SqliteBookInternal::search(con.connection()?, query).await
    }
}

#[async_trait::async_trait]
impl BookModifier for SqliteBookRepository {
    type Transaction = SqliteTransaction;

    async fn create(
        &self,
        con: &mut SqliteTransaction,
        book: &BookDraft,
    ) -> error_stack::Result<BookId, KernelError> {
        SqliteBookInternal::create(con.connection()?, book).await
    }

    async fn update(
        &self,
        con: &mut SqliteTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        SqliteBookInternal::update(con.connection()?, book).await
    }

    async fn decrease_stock(
        &self,
        con: &mut SqliteTransaction,
        id: &BookId,
        quantity: &OrderQuantity,
    ) -> error_stack::Result<Option<BookStock>, KernelError> {
        SqliteBookInternal::decrease_stock(con.connection()?, id, quantity).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: Option<String>,
    stock: i64,
    created_at: OffsetDateTime,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        Book::new(
            BookId::new(value.id),
            BookTitle::new(value.title),
            value.author.map(BookAuthor::new),
            BookStock::new(value.stock),
            CreatedAt::new(value.created_at),
        )
    }
}

/// Wraps `query` for `LIKE ... ESCAPE '\'` so wildcards in it match literally.
fn contains_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub(in crate::database) struct SqliteBookInternal;

impl SqliteBookInternal {
    async fn find_by_id(
        con: &mut SqliteConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=sqlite
            r#"
            SELECT id, title, author, stock, created_at
            FROM books
            WHERE id = ?
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn search(
        con: &mut SqliteConnection,
        query: Option<&str>,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = match query {
            None => {
                sqlx::query_as::<_, BookRow>(
                    // language=sqlite
                    r#"
                    SELECT id, title, author, stock, created_at
                    FROM books
                    ORDER BY id DESC
                    "#,
                )
                .fetch_all(con)
                .await
            }
            Some(query) => {
                let pattern = contains_pattern(query);
                sqlx::query_as::<_, BookRow>(
                    // language=sqlite
                    r#"
                    SELECT id, title, author, stock, created_at
                    FROM books
                    WHERE title LIKE ? ESCAPE '\' OR author LIKE ? ESCAPE '\'
                    ORDER BY id DESC
                    "#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(con)
                .await
            }
        }
        .convert_error()?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn create(
        con: &mut SqliteConnection,
        book: &BookDraft,
    ) -> error_stack::Result<BookId, KernelError> {
        let result = sqlx::query(
            // language=sqlite
            r#"
            INSERT INTO books (title, author, stock, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(book.title().as_ref())
        .bind(book.author().as_ref().map(AsRef::<String>::as_ref))
        .bind(book.stock().as_ref())
        .bind(book.created_at().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(BookId::new(result.last_insert_rowid()))
    }

    async fn update(
        con: &mut SqliteConnection,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=sqlite
            r#"
            UPDATE books
            SET title = ?, author = ?, stock = ?
            WHERE id = ?
            "#,
        )
        .bind(book.title().as_ref())
        .bind(book.author().as_ref().map(AsRef::<String>::as_ref))
        .bind(book.stock().as_ref())
        .bind(book.id().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn decrease_stock(
        con: &mut SqliteConnection,
        id: &BookId,
        quantity: &OrderQuantity,
    ) -> error_stack::Result<Option<BookStock>, KernelError> {
        let remaining = sqlx::query_scalar::<_, i64>(
            // language=sqlite
            r#"
            UPDATE books
            SET stock = stock - ?
            WHERE id = ? AND stock >= ?
            RETURNING stock
            "#,
        )
        .bind(quantity.as_ref())
        .bind(id.as_ref())
        .bind(quantity.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(remaining.map(BookStock::new))
    }
}
