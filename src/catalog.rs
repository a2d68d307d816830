//! Book store keyed by ISBN.

use std::collections::HashMap;

use crate::book::Book;

/// Owns every [`Book`] record
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    /// Books by ISBN
    books: HashMap<String, Book>,
}

/// Sort books by title, using ISBN to keep equal titles in a stable order
fn sort_by_title(books: &mut [Book]) {
    books.sort_by(|a, b| {
        a.title()
            .cmp(b.title())
            .then_with(|| a.isbn().cmp(b.isbn()))
    });
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the book stored under its ISBN
    pub fn insert(&mut self, book: Book) {
        self.books.insert(book.isbn().to_string(), book);
    }

    /// Drop a book from the catalog, returning it if it was present
    pub fn remove(&mut self, isbn: &str) -> Option<Book> {
        self.books.remove(isbn)
    }

    #[must_use]
    pub fn find(&self, isbn: &str) -> Option<&Book> {
        self.books.get(isbn)
    }

    /// Mutable access for copy-count changes
    pub fn find_mut(&mut self, isbn: &str) -> Option<&mut Book> {
        self.books.get_mut(isbn)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Case-insensitive substring match on the title, sorted by title
    #[must_use]
    pub fn search_by_title(&self, keyword: &str) -> Vec<Book> {
        let needle = keyword.to_lowercase();
        let mut found: Vec<Book> = self
            .books
            .values()
            .filter(|book| book.title().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        sort_by_title(&mut found);
        found
    }

    /// Case-insensitive substring match on the author, in no particular order
    #[must_use]
    pub fn search_by_author(&self, keyword: &str) -> Vec<Book> {
        let needle = keyword.to_lowercase();
        self.books
            .values()
            .filter(|book| book.author().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Every book, sorted by title
    #[must_use]
    pub fn list_all(&self) -> Vec<Book> {
        let mut all: Vec<Book> = self.books.values().cloned().collect();
        sort_by_title(&mut all);
        all
    }

    /// Books with at least one copy on the shelf
    #[must_use]
    pub fn list_available(&self) -> Vec<Book> {
        self.books
            .values()
            .filter(|book| book.available_copies() > 0)
            .cloned()
            .collect()
    }

    /// Take a copy off the shelf. Returns `false` if the book is unknown or has no free copy.
    pub fn checkout_copy(&mut self, isbn: &str) -> bool {
        self.books.get_mut(isbn).is_some_and(Book::checkout_copy)
    }

    /// Put a copy back. Returns `false` if the book is unknown or already fully shelved.
    pub fn return_copy(&mut self, isbn: &str) -> bool {
        self.books.get_mut(isbn).is_some_and(Book::return_copy)
    }

    /// Every book in arbitrary order
    #[must_use]
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }
}
