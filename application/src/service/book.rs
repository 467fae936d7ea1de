use error_stack::Report;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{
    BookAuthor, BookDraft, BookId, BookPatch, BookStock, BookTitle, CreatedAt,
};
use kernel::KernelError;

use crate::transfer::{BookDto, CreateBookDto, GetBookDto, SearchBookDto, UpdateBookDto};

fn validate_stock(stock: i64) -> error_stack::Result<BookStock, KernelError> {
    if stock < 0 {
        return Err(Report::new(KernelError::Validation("invalid stock")));
    }
    Ok(BookStock::new(stock))
}

#[async_trait::async_trait]
pub trait GetBookService: 'static + Sync + Send + DependOnBookQuery {
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<BookDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let book = self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound("not found")))?;

        Ok(BookDto::from(book))
    }
}

impl<T> GetBookService for T where T: DependOnBookQuery {}

#[async_trait::async_trait]
pub trait SearchBookService: 'static + Sync + Send + DependOnBookQuery {
    async fn search_books(
        &self,
        dto: SearchBookDto,
    ) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let query = dto.query.as_deref().filter(|query| !query.is_empty());
        let books = self.book_query().search(&mut connection, query).await?;

        Ok(books.into_iter().map(BookDto::from).collect())
    }
}

impl<T> SearchBookService for T where T: DependOnBookQuery {}

#[async_trait::async_trait]
pub trait CreateBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<BookDto, KernelError> {
        if dto.title.is_empty() {
            return Err(Report::new(KernelError::Validation("title required")));
        }
        let stock = validate_stock(dto.stock.unwrap_or(0))?;

        let mut connection = self.database_connection().transact().await?;

        let draft = BookDraft::new(
            BookTitle::new(dto.title),
            dto.author.map(BookAuthor::new),
            stock,
            CreatedAt::now(),
        );
        let id = self.book_modifier().create(&mut connection, &draft).await?;
        let book = self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::Internal).attach_printable("created book not readable")
            })?;

        connection.commit().await?;
        tracing::debug!(book_id = i64::from(id), "book created");
        Ok(BookDto::from(book))
    }
}

impl<T> CreateBookService for T where T: DependOnBookQuery + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait UpdateBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<BookDto, KernelError> {
        if dto.title.as_deref().is_some_and(str::is_empty) {
            return Err(Report::new(KernelError::Validation("invalid title")));
        }
        let stock = dto.stock.map(validate_stock).transpose()?;
        let patch = BookPatch::new(
            dto.title.map(BookTitle::new),
            dto.author.map(|author| author.map(BookAuthor::new)),
            stock,
        );

        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let mut book = self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound("not found")))?;

        patch.apply(&mut book);
        self.book_modifier().update(&mut connection, &book).await?;

        connection.commit().await?;
        Ok(BookDto::from(book))
    }
}

impl<T> UpdateBookService for T where T: DependOnBookQuery + DependOnBookModifier {}

#[cfg(test)]
mod test {
    use driver::database::SqliteDatabase;
    use kernel::KernelError;

    use crate::service::{CreateBookService, GetBookService, SearchBookService, UpdateBookService};
    use crate::transfer::{CreateBookDto, GetBookDto, SearchBookDto, UpdateBookDto};

    fn create(title: &str, author: Option<&str>, stock: Option<i64>) -> CreateBookDto {
        CreateBookDto {
            title: title.to_string(),
            author: author.map(ToString::to_string),
            stock,
        }
    }

    #[tokio::test]
    async fn create_keeps_given_stock_or_defaults_to_zero() -> error_stack::Result<(), KernelError>
    {
        let db = SqliteDatabase::in_memory().await?;

        let dune = db.create_book(create("Dune", None, Some(5))).await?;
        assert_eq!(dune.stock, 5);
        assert_eq!(dune.title, "Dune");
        assert_eq!(dune.author, None);

        let emma = db.create_book(create("Emma", Some("Jane Austen"), None)).await?;
        assert_eq!(emma.stock, 0);
        assert_eq!(emma.author.as_deref(), Some("Jane Austen"));
        assert!(emma.id > dune.id);

        let fetched = db.get_book(GetBookDto { id: emma.id }).await?;
        assert_eq!(fetched, emma);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_bad_input() -> error_stack::Result<(), KernelError> {
        let db = SqliteDatabase::in_memory().await?;

        let error = db.create_book(create("", None, None)).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation("title required"));

        let error = db.create_book(create("Dune", None, Some(-1))).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation("invalid stock"));

        let books = db.search_books(SearchBookDto { query: None }).await?;
        assert!(books.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn get_missing_book_is_not_found() -> error_stack::Result<(), KernelError> {
        let db = SqliteDatabase::in_memory().await?;
        let error = db.get_book(GetBookDto { id: 7 }).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound("not found"));
        Ok(())
    }

    #[tokio::test]
    async fn search_returns_matching_subset() -> error_stack::Result<(), KernelError> {
        let db = SqliteDatabase::in_memory().await?;
        db.create_book(create("Dune", Some("Frank Herbert"), Some(1))).await?;
        db.create_book(create("Emma", Some("Jane Austen"), Some(1))).await?;
        db.create_book(create("Persuasion", Some("Jane Austen"), Some(1))).await?;

        let all = db.search_books(SearchBookDto { query: None }).await?;
        let empty = db
            .search_books(SearchBookDto {
                query: Some(String::new()),
            })
            .await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all, empty);
        assert!(all.windows(2).all(|pair| pair[0].id > pair[1].id));

        let austen = db
            .search_books(SearchBookDto {
                query: Some("Austen".to_string()),
            })
            .await?;
        let expected = all
            .iter()
            .filter(|book| {
                book.title.contains("Austen")
                    || book.author.as_deref().is_some_and(|author| author.contains("Austen"))
            })
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(austen, expected);
        assert_eq!(austen.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() -> error_stack::Result<(), KernelError> {
        let db = SqliteDatabase::in_memory().await?;
        let book = db.create_book(create("Dune", Some("Herbert"), Some(5))).await?;

        let updated = db
            .update_book(UpdateBookDto {
                id: book.id,
                title: None,
                author: None,
                stock: Some(8),
            })
            .await?;
        assert_eq!(updated.title, "Dune");
        assert_eq!(updated.author.as_deref(), Some("Herbert"));
        assert_eq!(updated.stock, 8);
        assert_eq!(updated.created_at, book.created_at);

        let cleared = db
            .update_book(UpdateBookDto {
                id: book.id,
                title: Some("Dune Messiah".to_string()),
                author: Some(None),
                stock: None,
            })
            .await?;
        assert_eq!(cleared.title, "Dune Messiah");
        assert_eq!(cleared.author, None);
        assert_eq!(cleared.stock, 8);

        let stored = db.get_book(GetBookDto { id: book.id }).await?;
        assert_eq!(stored, cleared);
        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_bad_input() -> error_stack::Result<(), KernelError> {
        let db = SqliteDatabase::in_memory().await?;
        let book = db.create_book(create("Dune", None, Some(5))).await?;

        let error = db
            .update_book(UpdateBookDto {
                id: book.id,
                title: None,
                author: None,
                stock: Some(-3),
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation("invalid stock"));

        let error = db
            .update_book(UpdateBookDto {
                id: book.id + 100,
                title: None,
                author: None,
                stock: Some(1),
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound("not found"));

        let stored = db.get_book(GetBookDto { id: book.id }).await?;
        assert_eq!(stored.stock, 5);
        Ok(())
    }
}
