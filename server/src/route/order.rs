mod request;
mod response;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::order::request::{
    CancelRequest, ConfirmRequest, CreateRequest, GetRequest, Transformer,
};
use crate::route::order::response::Presenter;
use crate::route::Created;
use application::service::{
    CancelOrderService, ConfirmOrderService, CreateOrderService, GetOrderService,
};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::Value;

pub trait OrderRouter {
    fn route_order(self) -> Self;
}

impl OrderRouter for Router<AppModule> {
    fn route_order(self) -> Self {
        self.route(
            "/orders",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), Presenter)
                    .bypass(|| async move { module.database().list_orders().await })
                    .await
                    .map_err(ErrorStatus::from)
            })
            .post(
                |State(module): State<AppModule>,
                 WithRejection(Json(body), _): WithRejection<Json<Value>, ErrorStatus>| async move {
                    Controller::new(Transformer, Presenter)
                        .try_intake(CreateRequest::new(body))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.database().create_order(dto).await })
                        .await
                        .map(Created)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/orders/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<String>| async move {
                    Controller::new(Transformer, Presenter)
                        .try_intake(GetRequest::new(id))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.database().get_order_detail(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/orders/:id/confirm",
            post(
                |State(module): State<AppModule>, Path(id): Path<String>| async move {
                    Controller::new(Transformer, Presenter)
                        .try_intake(ConfirmRequest::new(id))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.database().confirm_order(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/orders/:id/cancel",
            post(
                |State(module): State<AppModule>, Path(id): Path<String>| async move {
                    Controller::new(Transformer, Presenter)
                        .try_intake(CancelRequest::new(id))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.database().cancel_order(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}

#[cfg(test)]
mod test {
    use axum::http::{Method, StatusCode};
    use axum::Router;
    use kernel::KernelError;
    use serde_json::{json, Value};

    use crate::route::test::{app, send};

    async fn book(app: &Router, body: Value) -> Value {
        let (status, book) = send(app, Method::POST, "/books", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        book
    }

    async fn order(app: &Router, book_id: &Value, qty: i64) -> Value {
        let (status, order) = send(
            app,
            Method::POST,
            "/orders",
            Some(json!({ "book_id": book_id, "qty": qty })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        order
    }

    #[tokio::test]
    async fn confirm_twice() -> error_stack::Result<(), KernelError> {
        let app = app().await?;
        let dune = book(&app, json!({ "title": "Dune", "stock": 5 })).await;
        assert_eq!(dune["id"], 1);
        assert_eq!(dune["stock"], 5);

        let placed = order(&app, &dune["id"], 3).await;
        assert_eq!(placed["id"], 1);
        assert_eq!(placed["status"], "pending");
        assert_eq!(placed["qty"], 3);
        assert_eq!(placed["confirmed_at"], json!(null));

        let (status, confirmed) = send(&app, Method::POST, "/orders/1/confirm", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmed["order"]["status"], "confirmed");
        assert!(confirmed["order"]["confirmed_at"].is_string());
        assert_eq!(confirmed["remaining_stock"], 2);

        let (status, body) = send(&app, Method::POST, "/orders/1/confirm", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "already processed" }));

        let (_, stored) = send(&app, Method::GET, "/books/1", None).await;
        assert_eq!(stored["stock"], 2);
        Ok(())
    }

    #[tokio::test]
    async fn confirm_without_enough_stock() -> error_stack::Result<(), KernelError> {
        let app = app().await?;
        let x = book(&app, json!({ "title": "X", "stock": 1 })).await;
        let placed = order(&app, &x["id"], 5).await;

        let uri = format!("/orders/{}/confirm", placed["id"]);
        let (status, body) = send(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "insufficient stock", "stock": 1 }));

        let (_, stored) = send(&app, Method::GET, &format!("/books/{}", x["id"]), None).await;
        assert_eq!(stored["stock"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn cancel_transitions() -> error_stack::Result<(), KernelError> {
        let app = app().await?;
        let dune = book(&app, json!({ "title": "Dune", "stock": 5 })).await;
        let first = order(&app, &dune["id"], 1).await;
        let second = order(&app, &dune["id"], 1).await;

        let (status, _) =
            send(&app, Method::POST, &format!("/orders/{}/confirm", first["id"]), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) =
            send(&app, Method::POST, &format!("/orders/{}/cancel", first["id"]), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "cannot cancel" }));

        let (status, cancelled) =
            send(&app, Method::POST, &format!("/orders/{}/cancel", second["id"]), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "cancelled");

        let (status, body) =
            send(&app, Method::POST, &format!("/orders/{}/confirm", second["id"]), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "already processed" }));

        let (_, stored) = send(&app, Method::GET, "/books/1", None).await;
        assert_eq!(stored["stock"], 4);
        Ok(())
    }

    #[tokio::test]
    async fn create_order_errors() -> error_stack::Result<(), KernelError> {
        let app = app().await?;
        book(&app, json!({ "title": "Dune", "stock": 5 })).await;

        let cases = [
            (json!({ "qty": 1 }), StatusCode::BAD_REQUEST, "book_id required"),
            (json!({ "book_id": 1, "qty": 0 }), StatusCode::BAD_REQUEST, "invalid qty"),
            (json!({ "book_id": 9, "qty": 1 }), StatusCode::NOT_FOUND, "book not found"),
        ];
        for (body, expected_status, message) in cases {
            let (status, body) = send(&app, Method::POST, "/orders", Some(body)).await;
            assert_eq!(status, expected_status);
            assert_eq!(body, json!({ "error": message }));
        }

        let (status, body) = send(&app, Method::POST, "/orders/9/confirm", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "order not found" }));

        let (status, body) = send(&app, Method::POST, "/orders/x/cancel", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "not found" }));
        Ok(())
    }

    #[tokio::test]
    async fn list_and_get_include_book() -> error_stack::Result<(), KernelError> {
        let app = app().await?;
        let emma = json!({ "title": "Emma", "author": "Jane Austen", "stock": 3 });
        let emma = book(&app, emma).await;
        let first = order(&app, &emma["id"], 1).await;
        let second = order(&app, &emma["id"], 2).await;

        let (status, listed) = send(&app, Method::GET, "/orders", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["id"], second["id"]);
        assert_eq!(listed[1]["id"], first["id"]);
        assert_eq!(listed[0]["book_title"], "Emma");
        assert_eq!(listed[0]["book_author"], "Jane Austen");
        assert_eq!(listed[1]["qty"], 1);

        let (status, detail) =
            send(&app, Method::GET, &format!("/orders/{}", first["id"]), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["book_title"], "Emma");
        assert_eq!(detail["status"], "pending");
        assert!(detail.get("book_author").is_none());

        let (status, body) = send(&app, Method::GET, "/orders/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "not found" }));
        Ok(())
    }
}
