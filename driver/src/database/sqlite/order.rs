use error_stack::Report;
use sqlx::SqliteConnection;
use time::OffsetDateTime;

use kernel::interface::query::OrderQuery;
use kernel::interface::update::OrderModifier;
use kernel::prelude::entity::{
    BookAuthor, BookId, BookTitle, ConfirmedAt, CreatedAt, Order, OrderDetail, OrderDraft,
    OrderId, OrderQuantity, OrderStatus,
};
use kernel::KernelError;

use crate::database::sqlite::SqliteTransaction;
use crate::error::ConvertError;

pub struct SqliteOrderRepository;

#[async_trait::async_trait]
impl OrderQuery for SqliteOrderRepository {
    type Transaction = SqliteTransaction;

    async fn find_by_id(
        &self,
        con: &mut SqliteTransaction,
        id: &OrderId,
    ) -> error_stack::Result<Option<Order>, KernelError> {
        SqliteOrderInternal::find_by_id(con.connection()?, id).await
    }

    async fn find_detail_by_id(
        &self,
        con: &mut SqliteTransaction,
        id: &OrderId,
    ) -> error_stack::Result<Option<OrderDetail>, KernelError> {
        SqliteOrderInternal::find_detail_by_id(con.connection()?, id).await
    }

    async fn find_all_details(
        &self,
        con: &mut SqliteTransaction,
    ) -> error_stack::Result<Vec<OrderDetail>, KernelError> {
        SqliteOrderInternal::find_all_details(con.connection()?).await
    }
}

#[async_trait::async_trait]
impl OrderModifier for SqliteOrderRepository {
    type Transaction = SqliteTransaction;

    async fn create(
        &self,
        con: &mut SqliteTransaction,
        order: &OrderDraft,
    ) -> error_stack::Result<OrderId, KernelError> {
        SqliteOrderInternal::create(con.connection()?, order).await
    }

    async fn confirm(
        &self,
        con: &mut SqliteTransaction,
        id: &OrderId,
        confirmed_at: &ConfirmedAt,
    ) -> error_stack::Result<bool, KernelError> {
        SqliteOrderInternal::confirm(con.connection()?, id, confirmed_at).await
    }

    async fn cancel(
        &self,
        con: &mut SqliteTransaction,
        id: &OrderId,
    ) -> error_stack::Result<bool, KernelError> {
        SqliteOrderInternal::cancel(con.connection()?, id).await
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    book_id: i64,
    qty: i64,
    status: String,
    created_at: OffsetDateTime,
    confirmed_at: Option<OffsetDateTime>,
}

impl TryFrom<OrderRow> for Order {
    type Error = Report<KernelError>;
    fn try_from(value: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order::new(
            OrderId::new(value.id),
            BookId::new(value.book_id),
            OrderQuantity::new(value.qty),
            value.status.parse::<OrderStatus>()?,
            CreatedAt::new(value.created_at),
            value.confirmed_at.map(ConfirmedAt::new),
        ))
    }
}

#[derive(sqlx::FromRow)]
struct OrderDetailRow {
    #[sqlx(flatten)]
    order: OrderRow,
    book_title: String,
    book_author: Option<String>,
}

impl TryFrom<OrderDetailRow> for OrderDetail {
    type Error = Report<KernelError>;
    fn try_from(value: OrderDetailRow) -> Result<Self, Self::Error> {
        Ok(OrderDetail::new(
            Order::try_from(value.order)?,
            BookTitle::new(value.book_title),
            value.book_author.map(BookAuthor::new),
        ))
    }
}

pub(in crate::database) struct SqliteOrderInternal;

impl SqliteOrderInternal {
    async fn find_by_id(
        con: &mut SqliteConnection,
        id: &OrderId,
    ) -> error_stack::Result<Option<Order>, KernelError> {
        let row = sqlx::query_as::<_, OrderRow>(
            // language=sqlite
            r#"
            SELECT id, book_id, qty, status, created_at, confirmed_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Order::try_from).transpose()
    }

    async fn find_detail_by_id(
        con: &mut SqliteConnection,
        id: &OrderId,
    ) -> error_stack::Result<Option<OrderDetail>, KernelError> {
        let row = sqlx::query_as::<_, OrderDetailRow>(
            // language=sqlite
            r#"
            SELECT o.id, o.book_id, o.qty, o.status, o.created_at, o.confirmed_at,
                   b.title AS book_title, b.author AS book_author
            FROM orders o
            JOIN books b ON o.book_id = b.id
            WHERE o.id = ?
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(OrderDetail::try_from).transpose()
    }

    async fn find_all_details(
        con: &mut SqliteConnection,
    ) -> error_stack::Result<Vec<OrderDetail>, KernelError> {
        let rows = sqlx::query_as::<_, OrderDetailRow>(
            // language=sqlite
            r#"
            SELECT o.id, o.book_id, o.qty, o.status, o.created_at, o.confirmed_at,
                   b.title AS book_title, b.author AS book_author
            FROM orders o
            JOIN books b ON o.book_id = b.id
            ORDER BY o.id DESC
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(OrderDetail::try_from).collect()
    }

    async fn create(
        con: &mut SqliteConnection,
        order: &OrderDraft,
    ) -> error_stack::Result<OrderId, KernelError> {
        let result = sqlx::query(
            // language=sqlite
            r#"
            INSERT INTO orders (book_id, qty, status, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(order.book_id().as_ref())
        .bind(order.quantity().as_ref())
        .bind(OrderStatus::Pending.as_str())
        .bind(order.created_at().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(OrderId::new(result.last_insert_rowid()))
    }

    async fn confirm(
        con: &mut SqliteConnection,
        id: &OrderId,
        confirmed_at: &ConfirmedAt,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=sqlite
            r#"
            UPDATE orders
            SET status = ?, confirmed_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(OrderStatus::Confirmed.as_str())
        .bind(confirmed_at.as_ref())
        .bind(id.as_ref())
        .bind(OrderStatus::Pending.as_str())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }

    async fn cancel(
        con: &mut SqliteConnection,
        id: &OrderId,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=sqlite
            r#"
            UPDATE orders
            SET status = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(OrderStatus::Cancelled.as_str())
        .bind(id.as_ref())
        .bind(OrderStatus::Pending.as_str())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }
}
