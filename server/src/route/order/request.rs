use application::transfer::{CancelOrderDto, ConfirmOrderDto, CreateOrderDto, GetOrderDto};
use error_stack::Report;
use kernel::KernelError;
use serde_json::Value;

use crate::controller::TryIntake;
use crate::route::integer;

#[derive(Debug)]
pub struct CreateRequest(Value);

impl CreateRequest {
    pub fn new(body: Value) -> Self {
        Self(body)
    }
}

#[derive(Debug)]
pub struct GetRequest {
    id: String,
}

impl GetRequest {
    pub fn new(id: String) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct ConfirmRequest {
    id: String,
}

impl ConfirmRequest {
    pub fn new(id: String) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct CancelRequest {
    id: String,
}

impl CancelRequest {
    pub fn new(id: String) -> Self {
        Self { id }
    }
}

/// An id that does not parse names no order, so it fails like a missing row.
fn order_id(id: &str, missing: &'static str) -> Result<i64, Report<KernelError>> {
    id.parse()
        .map_err(|_| Report::new(KernelError::NotFound(missing)))
}

pub struct Transformer;

impl TryIntake<CreateRequest> for Transformer {
    type To = CreateOrderDto;
    type Error = Report<KernelError>;
    fn emit(&self, CreateRequest(body): CreateRequest) -> Result<Self::To, Self::Error> {
        let book_id = body
            .get("book_id")
            .and_then(integer)
            .filter(|id| *id != 0)
            .ok_or_else(|| Report::new(KernelError::Validation("book_id required")))?;
        let quantity = body
            .get("qty")
            .and_then(integer)
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| Report::new(KernelError::Validation("invalid qty")))?;
        Ok(CreateOrderDto {
            book_id: Some(book_id),
            quantity: Some(quantity),
        })
    }
}

impl TryIntake<GetRequest> for Transformer {
    type To = GetOrderDto;
    type Error = Report<KernelError>;
    fn emit(&self, GetRequest { id }: GetRequest) -> Result<Self::To, Self::Error> {
        Ok(GetOrderDto {
            id: order_id(&id, "not found")?,
        })
    }
}

impl TryIntake<ConfirmRequest> for Transformer {
    type To = ConfirmOrderDto;
    type Error = Report<KernelError>;
    fn emit(&self, ConfirmRequest { id }: ConfirmRequest) -> Result<Self::To, Self::Error> {
        Ok(ConfirmOrderDto {
            id: order_id(&id, "order not found")?,
        })
    }
}

impl TryIntake<CancelRequest> for Transformer {
    type To = CancelOrderDto;
    type Error = Report<KernelError>;
    fn emit(&self, CancelRequest { id }: CancelRequest) -> Result<Self::To, Self::Error> {
        Ok(CancelOrderDto {
            id: order_id(&id, "not found")?,
        })
    }
}
