use error_stack::Report;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery, DependOnOrderQuery, OrderQuery};
use kernel::interface::update::{
    BookModifier, DependOnBookModifier, DependOnOrderModifier, OrderModifier,
};
use kernel::prelude::entity::{
    BookId, ConfirmedAt, CreatedAt, OrderDraft, OrderId, OrderQuantity,
};
use kernel::KernelError;

use crate::transfer::{
    CancelOrderDto, ConfirmOrderDto, ConfirmedOrderDto, CreateOrderDto, GetOrderDto,
    OrderDetailDto, OrderDto,
};

#[async_trait::async_trait]
pub trait GetOrderService: 'static + Sync + Send + DependOnOrderQuery {
    async fn get_order(&self, dto: GetOrderDto) -> error_stack::Result<OrderDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = OrderId::new(dto.id);
        let order = self
            .order_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound("not found")))?;

        Ok(OrderDto::from(order))
    }

    async fn get_order_detail(
        &self,
        dto: GetOrderDto,
    ) -> error_stack::Result<OrderDetailDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = OrderId::new(dto.id);
        let detail = self
            .order_query()
            .find_detail_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound("not found")))?;

        Ok(OrderDetailDto::from(detail))
    }

    async fn list_orders(&self) -> error_stack::Result<Vec<OrderDetailDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let details = self.order_query().find_all_details(&mut connection).await?;

        Ok(details.into_iter().map(OrderDetailDto::from).collect())
    }
}

impl<T> GetOrderService for T where T: DependOnOrderQuery {}

#[async_trait::async_trait]
pub trait CreateOrderService:
    'static + Sync + Send + DependOnBookQuery + DependOnOrderQuery + DependOnOrderModifier
{
    async fn create_order(
        &self,
        dto: CreateOrderDto,
    ) -> error_stack::Result<OrderDto, KernelError> {
        let book_id = dto
            .book_id
            .filter(|id| *id != 0)
            .map(BookId::new)
            .ok_or_else(|| Report::new(KernelError::Validation("book_id required")))?;
        let quantity = dto
            .quantity
            .filter(|quantity| *quantity > 0)
            .map(OrderQuantity::new)
            .ok_or_else(|| Report::new(KernelError::Validation("invalid qty")))?;

        let mut connection = self.database_connection().transact().await?;

        self.book_query()
            .find_by_id(&mut connection, &book_id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound("book not found")))?;

        let draft = OrderDraft::new(book_id, quantity, CreatedAt::now());
        let id = self.order_modifier().create(&mut connection, &draft).await?;
        let order = self
            .order_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::Internal).attach_printable("created order not readable")
            })?;

        connection.commit().await?;
        tracing::info!(
            order_id = i64::from(id),
            book_id = i64::from(book_id),
            qty = i64::from(quantity),
            "order placed"
        );
        Ok(OrderDto::from(order))
    }
}

impl<T> CreateOrderService for T where
    T: DependOnBookQuery + DependOnOrderQuery + DependOnOrderModifier
{
}

/// Debits stock for a pending order and marks it confirmed, all in one transaction.
///
/// Both writes are conditional, so a concurrent confirmation of the same order, or of
/// another order draining the same book, makes this one fail instead of overselling.
#[async_trait::async_trait]
pub trait ConfirmOrderService:
    'static
    + Sync
    + Send
    + DependOnBookQuery
    + DependOnBookModifier
    + DependOnOrderQuery
    + DependOnOrderModifier
{
    async fn confirm_order(
        &self,
        dto: ConfirmOrderDto,
    ) -> error_stack::Result<ConfirmedOrderDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = OrderId::new(dto.id);
        let order = self
            .order_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound("order not found")))?;
        if !order.status().is_pending() {
            return Err(Report::new(KernelError::Conflict("already processed")));
        }

        let book = self
            .book_query()
            .find_by_id(&mut connection, order.book_id())
            .await?
            .ok_or_else(|| Report::new(KernelError::Internal).attach_printable("book missing"))?;
        if !book.stock().covers(order.quantity()) {
            return Err(Report::new(KernelError::InsufficientStock {
                stock: i64::from(*book.stock()),
            }));
        }
        let expected = book.stock().after(order.quantity());

        let remaining = self
            .book_modifier()
            .decrease_stock(&mut connection, book.id(), order.quantity())
            .await?;
        let Some(remaining) = remaining else {
            let stock = self
                .book_query()
                .find_by_id(&mut connection, book.id())
                .await?
                .map_or(0, |book| i64::from(*book.stock()));
            connection.roll_back().await?;
            return Err(Report::new(KernelError::InsufficientStock { stock }));
        };

        let confirmed = self
            .order_modifier()
            .confirm(&mut connection, &id, &ConfirmedAt::now())
            .await?;
        if !confirmed {
            connection.roll_back().await?;
            return Err(Report::new(KernelError::Conflict("already processed")));
        }

        let order = self
            .order_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::Internal).attach_printable("confirmed order not readable")
            })?;
        connection.commit().await?;

        let remaining_stock = i64::from(remaining);
        if remaining_stock != expected {
            tracing::warn!(
                order_id = dto.id,
                expected,
                remaining_stock,
                "stock changed between check and decrement"
            );
        }
        tracing::info!(order_id = dto.id, remaining_stock, "order confirmed");

        Ok(ConfirmedOrderDto {
            order: OrderDto::from(order),
            remaining_stock,
        })
    }
}

impl<T> ConfirmOrderService for T where
    T: DependOnBookQuery + DependOnBookModifier + DependOnOrderQuery + DependOnOrderModifier
{
}

#[async_trait::async_trait]
pub trait CancelOrderService:
    'static + Sync + Send + DependOnOrderQuery + DependOnOrderModifier
{
    async fn cancel_order(
        &self,
        dto: CancelOrderDto,
    ) -> error_stack::Result<OrderDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = OrderId::new(dto.id);
        let order = self
            .order_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound("not found")))?;
        if !order.status().is_pending() {
            return Err(Report::new(KernelError::Conflict("cannot cancel")));
        }

        if !self.order_modifier().cancel(&mut connection, &id).await? {
            connection.roll_back().await?;
            return Err(Report::new(KernelError::Conflict("cannot cancel")));
        }

        let order = self
            .order_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::Internal).attach_printable("cancelled order not readable")
            })?;
        connection.commit().await?;

        tracing::info!(order_id = dto.id, "order cancelled");
        Ok(OrderDto::from(order))
    }
}

impl<T> CancelOrderService for T where T: DependOnOrderQuery + DependOnOrderModifier {}
