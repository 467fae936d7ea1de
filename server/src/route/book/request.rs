use application::transfer::{CreateBookDto, GetBookDto, SearchBookDto, UpdateBookDto};
use error_stack::Report;
use kernel::KernelError;
use serde::Deserialize;
use serde_json::Value;

use crate::controller::{Intake, TryIntake};
use crate::route::integer;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    q: Option<String>,
}

#[derive(Debug)]
pub struct CreateRequest(Value);

impl CreateRequest {
    pub fn new(body: Value) -> Self {
        Self(body)
    }
}

#[derive(Debug)]
pub struct UpdateRequest {
    id: String,
    body: Value,
}

impl UpdateRequest {
    pub fn new(id: String, body: Value) -> Self {
        Self { id, body }
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

fn invalid(reason: &'static str) -> Report<KernelError> {
    Report::new(KernelError::Validation(reason))
}

fn book_id(id: &str) -> Result<i64, Report<KernelError>> {
    id.parse()
        .map_err(|_| Report::new(KernelError::NotFound("not found")))
}

fn stock(value: &Value) -> Result<i64, Report<KernelError>> {
    integer(value)
        .filter(|stock| *stock >= 0)
        .ok_or_else(|| invalid("invalid stock"))
}

/// `None` keeps the field as is, `Some(None)` clears it.
fn author(value: Option<&Value>) -> Result<Option<Option<String>>, Report<KernelError>> {
    match value {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(author)) => Ok(Some(Some(author.clone()))),
        Some(_) => Err(invalid("invalid author")),
    }
}

pub struct Transformer;

impl Intake<SearchRequest> for Transformer {
    type To = SearchBookDto;
    fn emit(&self, SearchRequest { q }: SearchRequest) -> Self::To {
        SearchBookDto { query: q }
    }
}

impl TryIntake<GetRequest> for Transformer {
    type To = GetBookDto;
    type Error = Report<KernelError>;
    fn emit(&self, input: GetRequest) -> Result<Self::To, Self::Error> {
        Ok(GetBookDto {
            id: book_id(&input.id)?,
        })
    }
}

impl TryIntake<CreateRequest> for Transformer {
    type To = CreateBookDto;
    type Error = Report<KernelError>;
    fn emit(&self, CreateRequest(body): CreateRequest) -> Result<Self::To, Self::Error> {
        let title = match body.get("title") {
            Some(Value::String(title)) if !title.is_empty() => title.clone(),
            _ => return Err(invalid("title required")),
        };
        let stock = body.get("stock").map(stock).transpose()?;
        let author = author(body.get("author"))?.flatten();
        Ok(CreateBookDto {
            title,
            author,
            stock,
        })
    }
}

impl TryIntake<UpdateRequest> for Transformer {
    type To = UpdateBookDto;
    type Error = Report<KernelError>;
    fn emit(&self, UpdateRequest { id, body }: UpdateRequest) -> Result<Self::To, Self::Error> {
        let id = book_id(&id)?;
        let stock = body.get("stock").map(stock).transpose()?;
        let title = match body.get("title") {
            None => None,
            Some(Value::String(title)) if !title.is_empty() => Some(title.clone()),
            Some(_) => return Err(invalid("invalid title")),
        };
        let author = author(body.get("author"))?;
        Ok(UpdateBookDto {
            id,
            title,
            author,
            stock,
        })
    }
}

#[cfg(test)]
mod test {
    use kernel::KernelError;
    use serde_json::json;

    use crate::controller::TryIntake;
    use crate::route::book::request::{CreateRequest, Transformer, UpdateRequest};

    #[test]
    fn create_checks_title_then_stock_then_author() {
        let cases = [
            (json!({ "stock": "x" }), "title required"),
            (json!({ "title": 7 }), "title required"),
            (json!({ "title": "" }), "title required"),
            (json!({ "title": "Dune", "stock": null }), "invalid stock"),
            (json!({ "title": "Dune", "stock": 1.5 }), "invalid stock"),
            (json!({ "title": "Dune", "stock": -1, "author": 1 }), "invalid stock"),
            (json!({ "title": "Dune", "author": ["a"] }), "invalid author"),
        ];
        for (body, reason) in cases {
            let error = Transformer.emit(CreateRequest::new(body)).unwrap_err();
            assert_eq!(error.current_context(), &KernelError::Validation(reason));
        }

        let dto = Transformer
            .emit(CreateRequest::new(json!({ "title": "Dune", "stock": 5.0, "author": null })))
            .unwrap();
        assert_eq!(dto.title, "Dune");
        assert_eq!(dto.stock, Some(5));
        assert_eq!(dto.author, None);
    }

    #[test]
    fn update_distinguishes_absent_and_null_author() {
        let keep = Transformer
            .emit(UpdateRequest::new("3".to_string(), json!({ "stock": 2 })))
            .unwrap();
        assert_eq!(keep.id, 3);
        assert_eq!(keep.author, None);
        assert_eq!(keep.title, None);
        assert_eq!(keep.stock, Some(2));

        let clear = Transformer
            .emit(UpdateRequest::new("3".to_string(), json!({ "author": null })))
            .unwrap();
        assert_eq!(clear.author, Some(None));

        let error = Transformer
            .emit(UpdateRequest::new("3".to_string(), json!({ "title": "" })))
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation("invalid title"));

        let error = Transformer
            .emit(UpdateRequest::new("abc".to_string(), json!({})))
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound("not found"));
    }
}
