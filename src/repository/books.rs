//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

use super::map_unique_violation;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List books, optionally filtered by exact ISBN
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let books = if let Some(ref isbn) = query.isbn {
            sqlx::query_as::<_, Book>(
                r#"
                SELECT id, title, author, description, year, isbn, available, created_at, updated_at
                FROM books WHERE isbn = $1
                "#,
            )
            .bind(isbn)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Book>(
                r#"
                SELECT id, title, author, description, year, isbn, available, created_at, updated_at
                FROM books ORDER BY id
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        };

        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, description, year, isbn, available, created_at, updated_at
            FROM books WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(book)
    }

    /// Create a new book. A duplicate ISBN surfaces as a conflict.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, description, year, isbn, available)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, author, description, year, isbn, available, created_at, updated_at
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.year)
        .bind(&book.isbn)
        .bind(book.available.unwrap_or(true))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "ISBN already registered"))?;

        Ok(created)
    }

    /// Update an existing book
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let now = Utc::now();

        // Build dynamic update query
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut param_idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(book.title, "title");
        add_field!(book.author, "author");
        add_field!(book.description, "description");
        add_field!(book.year, "year");
        add_field!(book.isbn, "isbn");
        add_field!(book.available, "available");

        let query = format!("UPDATE books SET {} WHERE id = {}", sets.join(", "), id);

        let mut builder = sqlx::query(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(book.title);
        bind_field!(book.author);
        bind_field!(book.description);
        bind_field!(book.year);
        bind_field!(book.isbn);
        bind_field!(book.available);

        builder
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "ISBN already registered"))?;

        self.get_by_id(id).await
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }
}
