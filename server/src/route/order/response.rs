use application::transfer::{ConfirmedOrderDto, OrderDetailDto, OrderDto};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;

use crate::controller::Exhaust;

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    id: i64,
    book_id: i64,
    #[serde(rename = "qty")]
    quantity: i64,
    status: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    confirmed_at: Option<OffsetDateTime>,
}

impl From<OrderDto> for OrderResponse {
    fn from(value: OrderDto) -> Self {
        Self {
            id: value.id,
            book_id: value.book_id,
            quantity: value.quantity,
            status: value.status,
            created_at: value.created_at,
            confirmed_at: value.confirmed_at,
        }
    }
}

impl IntoResponse for OrderResponse {
    fn into_response(self) -> axum::response::Response {
        (axum::http::StatusCode::OK, Json(self)).into_response()
    }
}

/// An order row listed together with its book.
#[derive(Debug, Serialize)]
pub struct OrderListingResponse {
    #[serde(flatten)]
    order: OrderResponse,
    book_title: String,
    book_author: Option<String>,
}

/// A single order with the title of its book.
#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    order: OrderResponse,
    book_title: String,
}

impl IntoResponse for OrderDetailResponse {
    fn into_response(self) -> axum::response::Response {
        (axum::http::StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    order: OrderResponse,
    remaining_stock: i64,
}

impl IntoResponse for ConfirmResponse {
    fn into_response(self) -> axum::response::Response {
        (axum::http::StatusCode::OK, Json(self)).into_response()
    }
}

pub struct Presenter;

impl Exhaust<OrderDto> for Presenter {
    type To = OrderResponse;
    fn emit(&self, input: OrderDto) -> Self::To {
        OrderResponse::from(input)
    }
}

impl Exhaust<OrderDetailDto> for Presenter {
    type To = OrderDetailResponse;
    fn emit(&self, input: OrderDetailDto) -> Self::To {
        OrderDetailResponse {
            order: input.order.into(),
            book_title: input.book_title,
        }
    }
}

impl Exhaust<Vec<OrderDetailDto>> for Presenter {
    type To = Json<Vec<OrderListingResponse>>;
    fn emit(&self, input: Vec<OrderDetailDto>) -> Self::To {
        let result = input
            .into_iter()
            .map(|detail| OrderListingResponse {
                order: detail.order.into(),
                book_title: detail.book_title,
                book_author: detail.book_author,
            })
            .collect::<Vec<_>>();

        Json::from(result)
    }
}

impl Exhaust<ConfirmedOrderDto> for Presenter {
    type To = ConfirmResponse;
    fn emit(&self, input: ConfirmedOrderDto) -> Self::To {
        ConfirmResponse {
            order: input.order.into(),
            remaining_stock: input.remaining_stock,
        }
    }
}
