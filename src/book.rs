use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

/// A title held by the library, with copy counts
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Book {
    /// Catalog key
    isbn: String,
    /// Book title
    title: String,
    /// Author name
    author: String,
    /// Free-form genre label
    genre: String,
    /// Copies owned by the library
    total_copies: u32,
    /// Copies currently on the shelf
    available_copies: u32,
}

impl Book {
    /// Create a book with every copy available
    #[must_use]
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        total_copies: u32,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            total_copies,
            available_copies: total_copies,
        }
    }

    /// Check required fields and the copy-count invariant
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` if the ISBN or title is blank, or if
    /// more copies are available than the library owns.
    pub fn validate(&self) -> Result<()> {
        if self.isbn.trim().is_empty() {
            return Err(LibraryError::validation("book ISBN is required"));
        }
        if self.title.trim().is_empty() {
            return Err(LibraryError::validation(format!(
                "book {} has no title",
                self.isbn
            )));
        }
        if self.available_copies > self.total_copies {
            return Err(LibraryError::validation(format!(
                "book {} has {} available copies but only {} in total",
                self.isbn, self.available_copies, self.total_copies
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[must_use]
    pub fn genre(&self) -> &str {
        &self.genre
    }

    #[must_use]
    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    #[must_use]
    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    /// Copies currently on loan
    #[must_use]
    pub fn checked_out_copies(&self) -> u32 {
        self.total_copies.saturating_sub(self.available_copies)
    }

    /// Take one copy off the shelf. Returns `false` if none are free.
    pub fn checkout_copy(&mut self) -> bool {
        match self.available_copies.checked_sub(1) {
            Some(remaining) => {
                self.available_copies = remaining;
                true
            }
            None => false,
        }
    }

    /// Put one copy back. Returns `false` if every copy is already shelved.
    pub fn return_copy(&mut self) -> bool {
        if self.available_copies < self.total_copies {
            self.available_copies = self.available_copies.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// Acquire `count` more copies, all of them available
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` if the total would overflow.
    pub fn add_copies(&mut self, count: u32) -> Result<()> {
        let total = self.total_copies.checked_add(count).ok_or_else(|| {
            LibraryError::validation(format!("copy count for {} would overflow", self.isbn))
        })?;
        // available <= total, so this cannot overflow once the total fits
        self.available_copies = self.available_copies.saturating_add(count);
        self.total_copies = total;
        Ok(())
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} by {} [{}] {}/{} available",
            self.isbn,
            self.title,
            self.author,
            self.genre,
            self.available_copies,
            self.total_copies
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_stay_within_bounds() {
        let mut book = Book::new("X", "Title", "Author", "Genre", 1);
        assert!(book.checkout_copy());
        assert_eq!(book.available_copies(), 0);
        assert!(!book.checkout_copy());
        assert_eq!(book.available_copies(), 0);

        assert!(book.return_copy());
        assert!(!book.return_copy());
        assert_eq!(book.available_copies(), 1);
        assert_eq!(book.checked_out_copies(), 0);
    }

    #[test]
    fn test_add_copies_raises_both_counts() {
        let mut book = Book::new("X", "Title", "Author", "Genre", 2);
        assert!(book.checkout_copy());
        assert!(book.add_copies(3).is_ok());
        assert_eq!(book.total_copies(), 5);
        assert_eq!(book.available_copies(), 4);
        assert_eq!(book.checked_out_copies(), 1);
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(Book::new(" ", "Title", "A", "G", 1).validate().is_err());
        assert!(Book::new("X", "", "A", "G", 1).validate().is_err());
        assert!(Book::new("X", "Title", "", "", 0).validate().is_ok());
    }
}
