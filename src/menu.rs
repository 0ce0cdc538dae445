//! Purpose: Interactive numbered menu over one record store.
//! Exports: `run_menu`.
//! Role: Console glue; every store call goes through `RecordStore`.
//! Invariants: Store errors are printed and the loop continues; only output
//! failures end the session early.
//! Invariants: End of input behaves like choosing Exit.

use std::io::{self, BufRead, Write};

use hostel::{Error, ErrorKind, Record, RecordStore, RecordUpdate};
use tracing::debug;

use crate::record_view::record_block;

const BANNER: &str = "==========================================";
const DIVIDER: &str = "------------------------------------------";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Choice {
    Add,
    List,
    Search,
    Update,
    Delete,
    Exit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Add),
            "2" => Some(Self::List),
            "3" => Some(Self::Search),
            "4" => Some(Self::Update),
            "5" => Some(Self::Delete),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

// `Closed` means stdin hit end of input in the middle of a prompt.
enum Step {
    Continue,
    Closed,
}

struct Menu<'a, R, W> {
    store: &'a RecordStore,
    input: R,
    output: W,
}

pub(crate) fn run_menu<R: BufRead, W: Write>(
    store: &RecordStore,
    input: R,
    output: W,
) -> io::Result<()> {
    let mut menu = Menu {
        store,
        input,
        output,
    };
    menu.run()
}

impl<R: BufRead, W: Write> Menu<'_, R, W> {
    fn run(&mut self) -> io::Result<()> {
        loop {
            self.show_menu()?;
            let Some(line) = self.prompt("\n Enter Your Choice: ")? else {
                break;
            };
            let step = match Choice::parse(&line) {
                Some(Choice::Add) => self.add()?,
                Some(Choice::List) => self.list()?,
                Some(Choice::Search) => self.search()?,
                Some(Choice::Update) => self.update()?,
                Some(Choice::Delete) => self.delete()?,
                Some(Choice::Exit) => break,
                None => {
                    write!(self.output, "\n [INVALID] Please enter a valid option (1-6).")?;
                    Step::Continue
                }
            };
            if let Step::Closed = step {
                break;
            }
        }
        writeln!(self.output, "\n Thank you for using the application!")?;
        self.output.flush()
    }

    fn show_menu(&mut self) -> io::Result<()> {
        write!(
            self.output,
            "\n\n{BANNER}\n       HOSTEL MANAGEMENT SYSTEM\n{BANNER}\n \
             1. Add New Student\n \
             2. Process All Records (View)\n \
             3. Search Student\n \
             4. Update Student\n \
             5. Delete Student\n \
             6. Exit\n{DIVIDER}"
        )
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Ok(Some(line.to_string()))
    }

    fn prompt_id(&mut self, label: &str) -> io::Result<Option<String>> {
        Ok(self.prompt(label)?.map(|id| id.trim().to_string()))
    }

    fn add(&mut self) -> io::Result<Step> {
        write!(self.output, "\n{DIVIDER}\n Enter Student Details\n{DIVIDER}")?;
        let Some(id) = self.prompt_id("\n Enter Roll No: ")? else {
            return Ok(Step::Closed);
        };
        let Some(name) = self.prompt(" Enter Name: ")? else {
            return Ok(Step::Closed);
        };
        let Some(phone) = self.prompt(" Enter Phone: ")? else {
            return Ok(Step::Closed);
        };
        let Some(address) = self.prompt(" Enter Address: ")? else {
            return Ok(Step::Closed);
        };
        let record = Record::new(id, name, phone, address);

        match self.store.contains_id(&record.id) {
            Ok(true) => write!(
                self.output,
                "\n [WARNING] Roll No {} already exists; adding another record with it.",
                record.id
            )?,
            Ok(false) => {}
            Err(err) => {
                self.report_error(err)?;
                return Ok(Step::Continue);
            }
        }

        match self.store.add(&record) {
            Ok(_) => write!(self.output, "\n [SUCCESS] Student Record Added Successfully!")?,
            Err(err) => self.report_error(err)?,
        }
        Ok(Step::Continue)
    }

    fn list(&mut self) -> io::Result<Step> {
        let records = match self.store.list_all() {
            Ok(records) => records,
            Err(err) if err.kind() == ErrorKind::StoreMissing => {
                write!(self.output, "\n [ERROR] File not found or no data exists.")?;
                return Ok(Step::Continue);
            }
            Err(err) => {
                self.report_error(err)?;
                return Ok(Step::Continue);
            }
        };

        write!(self.output, "\n\n\t\t ALL STUDENTS RECORD \n")?;
        let mut shown = 0usize;
        for record in records {
            match record {
                Ok(record) => {
                    write!(self.output, "\n{}", record_block(&record))?;
                    shown += 1;
                }
                Err(err) => {
                    self.report_error(err.with_path(self.store.path()))?;
                    return Ok(Step::Continue);
                }
            }
        }
        if shown == 0 {
            write!(self.output, "\n No records stored.")?;
        }
        debug!(shown, "listed records");
        Ok(Step::Continue)
    }

    fn search(&mut self) -> io::Result<Step> {
        if !self.store.exists() {
            write!(self.output, "\n [ERROR] No data available.")?;
            return Ok(Step::Continue);
        }
        let Some(id) = self.prompt_id("\n Enter Roll No to Search: ")? else {
            return Ok(Step::Closed);
        };
        match self.store.find_by_id(&id) {
            Ok(record) => write!(
                self.output,
                "\n [FOUND] Student Found!\n{}",
                record_block(&record)
            )?,
            Err(err) if err.kind() == ErrorKind::NotFound => write!(
                self.output,
                "\n [NOT FOUND] Student with Roll No {id} is not in the record."
            )?,
            Err(err) => self.report_error(err)?,
        }
        Ok(Step::Continue)
    }

    fn update(&mut self) -> io::Result<Step> {
        let Some(id) = self.prompt_id("\n Enter Roll No to Update: ")? else {
            return Ok(Step::Closed);
        };
        let current = match self.store.find_by_id(&id) {
            Ok(record) => record,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                write!(self.output, "\n [NOT FOUND] Record not found.")?;
                return Ok(Step::Continue);
            }
            Err(err) => {
                self.report_error(err)?;
                return Ok(Step::Continue);
            }
        };

        write!(
            self.output,
            "\n [FOUND] Record found. Enter New Details (leave blank to keep)."
        )?;
        let Some(name) = self.prompt(&format!("\n New Name [{}]: ", current.name))? else {
            return Ok(Step::Closed);
        };
        let Some(phone) = self.prompt(&format!(" New Phone [{}]: ", current.phone))? else {
            return Ok(Step::Closed);
        };
        let Some(address) = self.prompt(&format!(" New Address [{}]: ", current.address))?
        else {
            return Ok(Step::Closed);
        };

        let update = RecordUpdate {
            name: non_blank(name),
            phone: non_blank(phone),
            address: non_blank(address),
        };
        match self.store.update(&id, &update) {
            Ok(_) => write!(self.output, "\n [SUCCESS] Record Updated Successfully.")?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                write!(self.output, "\n [NOT FOUND] Record not found.")?
            }
            Err(err) => self.report_error(err)?,
        }
        Ok(Step::Continue)
    }

    fn delete(&mut self) -> io::Result<Step> {
        let Some(id) = self.prompt_id("\n Enter Roll No to Delete: ")? else {
            return Ok(Step::Closed);
        };
        match self.store.delete(&id) {
            Ok(record) => write!(
                self.output,
                "\n [DELETED] Record with Roll No {} has been deleted.",
                record.id
            )?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                write!(self.output, "\n [NOT FOUND] Record not found.")?
            }
            Err(err) => self.report_error(err)?,
        }
        Ok(Step::Continue)
    }

    fn report_error(&mut self, err: Error) -> io::Result<()> {
        let err = crate::add_hints(err);
        write!(self.output, "\n [ERROR] {}", crate::error_message(&err))?;
        if let Some(hint) = err.hint() {
            write!(self.output, "\n         {hint}")?;
        }
        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Choice, run_menu};
    use hostel::{Record, RecordStore};
    use std::io::Cursor;

    fn session(store: &RecordStore, script: &str) -> String {
        let mut output = Vec::new();
        run_menu(store, Cursor::new(script.as_bytes().to_vec()), &mut output).expect("menu");
        String::from_utf8(output).expect("utf8")
    }

    #[test]
    fn parses_menu_choices() {
        assert_eq!(Choice::parse(" 1 "), Some(Choice::Add));
        assert_eq!(Choice::parse("6"), Some(Choice::Exit));
        assert_eq!(Choice::parse("7"), None);
        assert_eq!(Choice::parse("add"), None);
    }

    #[test]
    fn add_then_list_shows_the_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path().join("hostel_data.txt"));

        let out = session(&store, "1\nR-1\nAsha Khan\n555-0100\n12 Hill Road\n2\n6\n");
        assert!(out.contains("[SUCCESS] Student Record Added Successfully!"));
        assert!(out.contains(" Name     : Asha Khan"));
        assert!(out.contains("Thank you for using the application!"));
        assert_eq!(
            store.find_by_id("R-1").expect("find"),
            Record::new("R-1", "Asha Khan", "555-0100", "12 Hill Road")
        );
    }

    #[test]
    fn list_and_search_on_missing_store_report_no_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path().join("hostel_data.txt"));

        let out = session(&store, "2\n3\n6\n");
        assert!(out.contains("[ERROR] File not found or no data exists."));
        assert!(out.contains("[ERROR] No data available."));
        assert!(!store.exists());
    }

    #[test]
    fn blank_update_answers_keep_current_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path().join("hostel_data.txt"));
        store
            .add(&Record::new("R-1", "Asha", "555", "Block A"))
            .expect("add");

        let out = session(&store, "4\nR-1\n\n556\n\n6\n");
        assert!(out.contains("[SUCCESS] Record Updated Successfully."));
        assert_eq!(
            store.find_by_id("R-1").expect("find"),
            Record::new("R-1", "Asha", "556", "Block A")
        );
    }

    #[test]
    fn missing_ids_are_reported_and_the_loop_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path().join("hostel_data.txt"));
        store
            .add(&Record::new("R-1", "Asha", "555", "Block A"))
            .expect("add");

        let out = session(&store, "3\nR-9\n4\nR-9\n5\nR-9\n9\n5\nR-1\n6\n");
        assert!(out.contains("[NOT FOUND] Student with Roll No R-9 is not in the record."));
        assert_eq!(out.matches("[NOT FOUND] Record not found.").count(), 2);
        assert!(out.contains("[INVALID] Please enter a valid option (1-6)."));
        assert!(out.contains("[DELETED] Record with Roll No R-1 has been deleted."));
        assert_eq!(store.count().expect("count"), 0);
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path().join("hostel_data.txt"));

        let out = session(&store, "1\nR-1\nAsha");
        assert!(out.ends_with("Thank you for using the application!\n"));
        assert!(!store.exists());
    }

    #[test]
    fn duplicate_ids_warn_but_are_added() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path().join("hostel_data.txt"));
        store
            .add(&Record::new("R-1", "Asha", "555", "Block A"))
            .expect("add");

        let out = session(&store, "1\nR-1\nBen\n556\nBlock B\n6\n");
        assert!(out.contains("[WARNING] Roll No R-1 already exists"));
        assert_eq!(store.count().expect("count"), 2);
    }

    #[test]
    fn failed_write_is_reported_and_the_loop_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path().join("gone").join("hostel_data.txt"));

        let out = session(&store, "1\nR-1\nAsha\n555\nBlock A\n2\n6\n");
        assert!(out.contains("[ERROR] failed to open store for writing"));
        assert!(out.contains("I/O error."));
        assert!(out.contains("[ERROR] File not found or no data exists."));
        assert!(out.ends_with("Thank you for using the application!\n"));
        assert!(!store.exists());
    }

    #[test]
    fn invalid_ids_are_rejected_without_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path().join("hostel_data.txt"));

        let out = session(&store, "1\nR 1\nAsha\n555\nBlock A\n6\n");
        assert!(out.contains("[ERROR] id must not contain whitespace"));
        assert!(!store.exists());
    }
}
