mod request;
mod response;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::book::request::{
    CreateRequest, GetRequest, SearchRequest, Transformer, UpdateRequest,
};
use crate::route::book::response::Presenter;
use crate::route::Created;
use application::service::{
    CreateBookService, GetBookService, SearchBookService, UpdateBookService,
};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::Value;

type SearchQuery = WithRejection<Query<SearchRequest>, ErrorStatus>;

pub trait BookRouter {
    fn route_book(self) -> Self;
}

impl BookRouter for Router<AppModule> {
    fn route_book(self) -> Self {
        self.route(
            "/books",
            get(
                |State(module): State<AppModule>,
                 WithRejection(Query(req), _): SearchQuery| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.database().search_books(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .post(
                |State(module): State<AppModule>,
                 WithRejection(Json(body), _): WithRejection<Json<Value>, ErrorStatus>| async move {
                    Controller::new(Transformer, Presenter)
                        .try_intake(CreateRequest::new(body))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.database().create_book(dto).await })
                        .await
                        .map(Created)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<String>| async move {
                    Controller::new(Transformer, Presenter)
                        .try_intake(GetRequest::new(id))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.database().get_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .put(
                |State(module): State<AppModule>,
                 Path(id): Path<String>,
                 WithRejection(Json(body), _): WithRejection<Json<Value>, ErrorStatus>| async move {
                    Controller::new(Transformer, Presenter)
                        .try_intake(UpdateRequest::new(id, body))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.database().update_book(dto).await })
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
    use kernel::KernelError;
    use serde_json::json;

    use crate::route::test::{app, send};

    #[tokio::test]
    async fn create_and_fetch_book() -> error_stack::Result<(), KernelError> {
        let app = app().await?;

        let (status, created) = send(
            &app,
            Method::POST,
            "/books",
            Some(json!({ "title": "Dune", "author": "Frank Herbert", "stock": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 1);
        assert_eq!(created["title"], "Dune");
        assert_eq!(created["author"], "Frank Herbert");
        assert_eq!(created["stock"], 5);
        assert!(created["created_at"].is_string());

        let (status, fetched) = send(&app, Method::GET, "/books/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, body) = send(&app, Method::GET, "/books/2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "not found" }));

        let (status, body) = send(&app, Method::GET, "/books/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "not found" }));
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields() -> error_stack::Result<(), KernelError> {
        let app = app().await?;

        let (status, body) = send(&app, Method::POST, "/books", Some(json!({ "stock": 1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "title required" }));

        let (status, body) = send(
            &app,
            Method::POST,
            "/books",
            Some(json!({ "title": "Dune", "stock": -1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "invalid stock" }));

        let (status, books) = send(&app, Method::GET, "/books", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(books, json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn search_by_query() -> error_stack::Result<(), KernelError> {
        let app = app().await?;
        for body in [
            json!({ "title": "Dune", "author": "Frank Herbert" }),
            json!({ "title": "Emma", "author": "Jane Austen" }),
            json!({ "title": "Persuasion", "author": "Jane Austen" }),
        ] {
            let (status, _) = send(&app, Method::POST, "/books", Some(body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, all) = send(&app, Method::GET, "/books", None).await;
        let ids = all
            .as_array()
            .map(|books| books.iter().map(|book| book["id"].clone()).collect::<Vec<_>>());
        assert_eq!(ids, Some(vec![json!(3), json!(2), json!(1)]));

        let (_, empty_query) = send(&app, Method::GET, "/books?q=", None).await;
        assert_eq!(empty_query, all);

        let (_, austen) = send(&app, Method::GET, "/books?q=austen", None).await;
        let titles = austen
            .as_array()
            .map(|books| books.iter().map(|book| book["title"].clone()).collect::<Vec<_>>());
        assert_eq!(titles, Some(vec![json!("Persuasion"), json!("Emma")]));
        Ok(())
    }

    #[tokio::test]
    async fn repeated_query_is_rejected() -> error_stack::Result<(), KernelError> {
        let app = app().await?;
        let (status, body) = send(&app, Method::GET, "/books?q=a&q=b", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "invalid query string" }));
        Ok(())
    }

    #[tokio::test]
    async fn update_patches_present_fields() -> error_stack::Result<(), KernelError> {
        let app = app().await?;
        send(
            &app,
            Method::POST,
            "/books",
            Some(json!({ "title": "Dune", "author": "Herbert", "stock": 5 })),
        )
        .await;

        let (status, updated) =
            send(&app, Method::PUT, "/books/1", Some(json!({ "stock": 9 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Dune");
        assert_eq!(updated["author"], "Herbert");
        assert_eq!(updated["stock"], 9);

        let (status, cleared) =
            send(&app, Method::PUT, "/books/1", Some(json!({ "author": null }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cleared["author"], json!(null));
        assert_eq!(cleared["stock"], 9);

        let (status, body) =
            send(&app, Method::PUT, "/books/1", Some(json!({ "stock": "many" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "invalid stock" }));

        let (status, body) =
            send(&app, Method::PUT, "/books/7", Some(json!({ "stock": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "not found" }));
        Ok(())
    }
}
