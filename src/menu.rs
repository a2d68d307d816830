//! Interactive text menu over a [`RuleEngine`].
//!
//! Generic over its input and output so it can run on a terminal or be
//! driven from a script.

use std::io::{BufRead, Write};

use crate::{
    book::Book,
    engine::RuleEngine,
    error::{LibraryError, Result},
    member::{Member, MemberStatus},
    report::Report,
};

/// Whether the menu loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Show the menu again
    Continue,
    /// Leave the current menu
    Back,
    /// Input ended or the user chose to exit
    Quit,
}

/// Text menu session
#[derive(Debug)]
pub struct Menu<'a, R, W> {
    /// Library being operated on
    engine: &'a mut RuleEngine,
    /// Source of user input
    input: R,
    /// Destination for prompts and results
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    #[must_use]
    pub fn new(engine: &'a mut RuleEngine, input: R, output: W) -> Self {
        Self {
            engine,
            input,
            output,
        }
    }

    /// Run until the user exits or input ends
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run(&mut self) -> Result<()> {
        self.say("==============================================")?;
        self.say("        Welcome to the Library System")?;
        self.say("==============================================")?;
        loop {
            self.say("\n================ MAIN MENU ================")?;
            self.say("1. Book Management")?;
            self.say("2. Member Management")?;
            self.say("3. Checkout Operations")?;
            self.say("4. View Statistics")?;
            self.say("5. Exit")?;
            let Some(choice) = self.prompt("Select option: ")? else {
                break;
            };
            let flow = match choice.as_str() {
                "1" => self.submenu(Self::book_management)?,
                "2" => self.submenu(Self::member_management)?,
                "3" => self.submenu(Self::checkout_operations)?,
                "4" => {
                    let stats = Report::statistics(&self.engine.statistics());
                    self.write(&stats)?;
                    Flow::Continue
                }
                "5" => Flow::Quit,
                _ => {
                    self.say("Invalid option!")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }
        self.say("Thank you for using the Library System!")?;
        Ok(())
    }

    /// Repeat a submenu until it asks to go back or quit
    fn submenu(&mut self, menu: fn(&mut Self) -> Result<Flow>) -> Result<Flow> {
        loop {
            match menu(self)? {
                Flow::Continue => {}
                Flow::Back => return Ok(Flow::Continue),
                Flow::Quit => return Ok(Flow::Quit),
            }
        }
    }

    /// Write a line
    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Write text that already ends in a newline
    fn write(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Show a prompt and read one trimmed line. `None` means input has ended.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Report the outcome of a command
    fn outcome(&mut self, error: Option<&LibraryError>, success: &str) -> Result<Flow> {
        match error {
            None => self.say(success)?,
            Some(e) => self.say(&format!("Error: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    // ==================== BOOKS ====================

    /// Book management submenu
    fn book_management(&mut self) -> Result<Flow> {
        self.say("\n--- Book Management ---")?;
        self.say("1. View all books")?;
        self.say("2. View available books")?;
        self.say("3. Search by title")?;
        self.say("4. Search by author")?;
        self.say("5. Add new book")?;
        self.say("6. Add copies")?;
        self.say("7. Back to main menu")?;
        let Some(choice) = self.prompt("Select option: ")? else {
            return Ok(Flow::Quit);
        };
        match choice.as_str() {
            "1" => {
                let text = Report::books(
                    "All Books",
                    &self.engine.list_books(),
                    "No books in library.",
                );
                self.write(&text)?;
            }
            "2" => {
                let text = Report::books(
                    "Available Books",
                    &self.engine.list_available_books(),
                    "No books available.",
                );
                self.write(&text)?;
            }
            "3" => {
                let Some(keyword) = self.prompt("Enter title keyword: ")? else {
                    return Ok(Flow::Quit);
                };
                let text = Report::books(
                    "Search Results",
                    &self.engine.search_by_title(&keyword),
                    "No books found.",
                );
                self.write(&text)?;
            }
            "4" => {
                let Some(author) = self.prompt("Enter author name: ")? else {
                    return Ok(Flow::Quit);
                };
                let text = Report::books(
                    "Search Results",
                    &self.engine.search_by_author(&author),
                    "No books found.",
                );
                self.write(&text)?;
            }
            "5" => return self.add_book(),
            "6" => return self.add_copies(),
            "7" => return Ok(Flow::Back),
            _ => self.say("Invalid option!")?,
        }
        Ok(Flow::Continue)
    }

    /// Prompt for a new book
    fn add_book(&mut self) -> Result<Flow> {
        let mut fields = Vec::with_capacity(5);
        for label in [
            "Enter ISBN: ",
            "Enter title: ",
            "Enter author: ",
            "Enter genre: ",
            "Enter number of copies: ",
        ] {
            match self.prompt(label)? {
                Some(value) => fields.push(value),
                None => return Ok(Flow::Quit),
            }
        }
        let [isbn, title, author, genre, copies] =
            <[String; 5]>::try_from(fields).unwrap_or_default();
        let Ok(copies) = copies.parse::<u32>() else {
            self.say("Error: number of copies must be a whole number")?;
            return Ok(Flow::Continue);
        };
        let result = self.engine.add_book(Book::new(isbn, title, author, genre, copies));
        self.outcome(result.as_ref().err(), "Book added successfully!")
    }

    /// Prompt for copies to add to an existing book
    fn add_copies(&mut self) -> Result<Flow> {
        let Some(isbn) = self.prompt("Enter ISBN: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(count) = self.prompt("Enter number of copies to add: ")? else {
            return Ok(Flow::Quit);
        };
        let Ok(count) = count.parse::<u32>() else {
            self.say("Error: number of copies must be a whole number")?;
            return Ok(Flow::Continue);
        };
        let result = self.engine.add_copies(&isbn, count);
        self.outcome(result.as_ref().err(), "Copies added successfully!")
    }

    // ==================== MEMBERS ====================

    /// Member management submenu
    fn member_management(&mut self) -> Result<Flow> {
        self.say("\n--- Member Management ---")?;
        self.say("1. View all members")?;
        self.say("2. Add new member")?;
        self.say("3. Update member info")?;
        self.say("4. Update member status")?;
        self.say("5. View member checkouts")?;
        self.say("6. Back to main menu")?;
        let Some(choice) = self.prompt("Select option: ")? else {
            return Ok(Flow::Quit);
        };
        match choice.as_str() {
            "1" => {
                let text = Report::members(
                    "All Members",
                    &self.engine.list_members(),
                    "No members in library.",
                );
                self.write(&text)?;
                Ok(Flow::Continue)
            }
            "2" => self.add_member(),
            "3" => self.update_member_info(),
            "4" => self.update_member_status(),
            "5" => {
                let Some(member_id) = self.prompt("Enter member ID: ")? else {
                    return Ok(Flow::Quit);
                };
                let text = Report::checkouts(
                    "Member Checkouts",
                    &self.engine.member_history(&member_id),
                    "No checkouts for this member.",
                );
                self.write(&text)?;
                Ok(Flow::Continue)
            }
            "6" => Ok(Flow::Back),
            _ => {
                self.say("Invalid option!")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Prompt for a new member
    fn add_member(&mut self) -> Result<Flow> {
        let mut fields = Vec::with_capacity(4);
        for label in ["Enter member ID: ", "Enter name: ", "Enter email: ", "Enter phone: "] {
            match self.prompt(label)? {
                Some(value) => fields.push(value),
                None => return Ok(Flow::Quit),
            }
        }
        let [member_id, name, email, phone] = <[String; 4]>::try_from(fields).unwrap_or_default();
        let cap = self.engine.rules().default_max_checkouts;
        let member = Member::new(member_id, name, email, phone).with_max_checkouts(cap);
        let result = self.engine.add_member(member);
        self.outcome(result.as_ref().err(), "Member added successfully!")
    }

    /// Prompt for new contact details
    fn update_member_info(&mut self) -> Result<Flow> {
        let Some(member_id) = self.prompt("Enter member ID: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(member) = self.engine.find_member(&member_id) else {
            self.say("Member not found!")?;
            return Ok(Flow::Continue);
        };
        let current = format!(
            "Current info - Email: {}, Phone: {}",
            member.email(),
            member.phone()
        );
        self.say(&current)?;
        let Some(email) = self.prompt("Enter new email (or press Enter to keep current): ")? else {
            return Ok(Flow::Quit);
        };
        let Some(phone) = self.prompt("Enter new phone (or press Enter to keep current): ")? else {
            return Ok(Flow::Quit);
        };
        self.engine.update_member_contact(&member_id, Some(&email), Some(&phone));
        self.say("Member information updated successfully!")?;
        Ok(Flow::Continue)
    }

    /// Prompt for a new member status
    fn update_member_status(&mut self) -> Result<Flow> {
        let Some(member_id) = self.prompt("Enter member ID: ")? else {
            return Ok(Flow::Quit);
        };
        self.say("1. ACTIVE\n2. INACTIVE\n3. SUSPENDED")?;
        let Some(choice) = self.prompt("Select status: ")? else {
            return Ok(Flow::Quit);
        };
        match choice.parse::<MemberStatus>() {
            Ok(status) => {
                if self.engine.update_member_status(&member_id, status) {
                    self.say("Member status updated!")?;
                } else {
                    self.say("Member not found!")?;
                }
            }
            Err(e) => self.say(&format!("Error: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    // ==================== CHECKOUTS ====================

    /// Checkout operations submenu
    fn checkout_operations(&mut self) -> Result<Flow> {
        self.say("\n--- Checkout Operations ---")?;
        self.say("1. Checkout book")?;
        self.say("2. Return book")?;
        self.say("3. Renew checkout")?;
        self.say("4. View active checkouts")?;
        self.say("5. View overdue checkouts")?;
        self.say("6. Mark overdue checkouts")?;
        self.say("7. Back to main menu")?;
        let Some(choice) = self.prompt("Select option: ")? else {
            return Ok(Flow::Quit);
        };
        match choice.as_str() {
            "1" => {
                let Some(member_id) = self.prompt("Enter member ID: ")? else {
                    return Ok(Flow::Quit);
                };
                let Some(isbn) = self.prompt("Enter ISBN: ")? else {
                    return Ok(Flow::Quit);
                };
                let result = self.engine.checkout_book(&member_id, &isbn);
                if let Ok(checkout) = &result {
                    self.say(&format!(
                        "Checkout {} is due back on {}",
                        checkout.checkout_id(),
                        checkout.due_date()
                    ))?;
                }
                self.outcome(result.as_ref().err(), "Book checked out successfully!")
            }
            "2" => {
                let Some(checkout_id) = self.prompt("Enter checkout ID: ")? else {
                    return Ok(Flow::Quit);
                };
                let fee = self.engine.overdue_fee(&checkout_id);
                let result = self.engine.return_book(&checkout_id);
                if result.is_ok() && fee > 0.0 {
                    self.say(&format!("Overdue fee due: ${fee:.2}"))?;
                }
                self.outcome(result.as_ref().err(), "Book returned successfully!")
            }
            "3" => {
                let Some(checkout_id) = self.prompt("Enter checkout ID: ")? else {
                    return Ok(Flow::Quit);
                };
                let result = self.engine.renew_checkout(&checkout_id);
                if let Ok(checkout) = &result {
                    self.say(&format!("New due date: {}", checkout.due_date()))?;
                }
                self.outcome(result.as_ref().err(), "Checkout renewed successfully!")
            }
            "4" => {
                let Some(member_id) = self.prompt("Enter member ID: ")? else {
                    return Ok(Flow::Quit);
                };
                let text = Report::checkouts(
                    "Active Checkouts",
                    &self.engine.member_active_checkouts(&member_id),
                    "No active checkouts for this member.",
                );
                self.write(&text)?;
                Ok(Flow::Continue)
            }
            "5" => {
                let text = Report::overdue(self.engine);
                self.write(&text)?;
                Ok(Flow::Continue)
            }
            "6" => {
                let changed = self.engine.refresh_overdue_labels();
                self.say(&format!("Marked {changed} checkout(s) overdue."))?;
                Ok(Flow::Continue)
            }
            "7" => Ok(Flow::Back),
            _ => {
                self.say("Invalid option!")?;
                Ok(Flow::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, config::LoanRules, persistence::MemoryStore};

    /// Run the menu over `script` and return everything it printed
    fn run_script(engine: &mut RuleEngine, script: &str) -> String {
        let mut output = Vec::new();
        let result = Menu::new(engine, script.as_bytes(), &mut output).run();
        assert!(result.is_ok());
        String::from_utf8(output).unwrap_or_default()
    }

    /// Empty engine pinned to 2024-02-01
    fn engine() -> RuleEngine {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap_or(chrono::NaiveDate::MIN);
        RuleEngine::new(
            Box::new(MemoryStore::new()),
            Box::new(ManualClock::new(date)),
            LoanRules::default(),
        )
    }

    #[test]
    fn test_add_book_and_checkout_through_menu() {
        let mut engine = engine();
        let script = "1\n5\nX\nOnly Copy\nSome Author\nFiction\n1\n7\n\
                      2\n2\nM1\nTest User\nt@example.com\n555\n6\n\
                      3\n1\nM1\nX\n1\nM1\nX\n7\n5\n";
        let out = run_script(&mut engine, script);
        assert!(out.contains("Book added successfully!"));
        assert!(out.contains("Member added successfully!"));
        assert!(out.contains("Checkout CO000001 is due back on 2024-02-15"));
        assert!(out.contains("Error: No copies of X are available"));
        assert!(out.contains("Thank you for using the Library System!"));
        assert_eq!(engine.total_active_checkouts(), 1);
    }

    #[test]
    fn test_bad_copy_count_is_reported() {
        let mut engine = engine();
        let out = run_script(&mut engine, "1\n5\nX\nTitle\nAuthor\nGenre\nmany\n7\n5\n");
        assert!(out.contains("number of copies must be"));
        assert_eq!(engine.total_books(), 0);
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let mut engine = engine();
        let out = run_script(&mut engine, "2\n");
        assert!(out.contains("Thank you"));
    }

    #[test]
    fn test_statistics_and_invalid_option() {
        let mut engine = engine();
        let out = run_script(&mut engine, "9\n4\n5\n");
        assert!(out.contains("Invalid option!"));
        assert!(out.contains("LIBRARY STATISTICS"));
    }
}
