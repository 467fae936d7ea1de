use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{ConfirmedAt, OrderDraft, OrderId};
use crate::KernelError;

/// Status writes only apply to pending orders and report whether a row changed.
#[async_trait::async_trait]
pub trait OrderModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        order: &OrderDraft,
    ) -> error_stack::Result<OrderId, KernelError>;
    async fn confirm(
        &self,
        con: &mut Self::Transaction,
        id: &OrderId,
        confirmed_at: &ConfirmedAt,
    ) -> error_stack::Result<bool, KernelError>;
    async fn cancel(
        &self,
        con: &mut Self::Transaction,
        id: &OrderId,
    ) -> error_stack::Result<bool, KernelError>;
}

pub trait DependOnOrderModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type OrderModifier: OrderModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn order_modifier(&self) -> &Self::OrderModifier;
}
