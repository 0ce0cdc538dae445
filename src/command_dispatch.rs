//! Purpose: Hold top-level CLI command dispatch for `hostel`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: A missing record file reads as an empty list; writes create it.
//! Invariants: JSON output goes to stdout; notices and errors go to stderr.

use super::*;

use hostel::{Record, RecordUpdate};

use crate::record_view::{
    RECORD_HEADERS, record_block, record_json, record_row, records_json, render_table,
};

pub(super) fn dispatch_command(
    command: Command,
    store: &RecordStore,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Menu => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            menu::run_menu(store, stdin.lock(), stdout.lock()).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("console i/o failed")
                    .with_source(err)
            })?;
            Ok(RunOutcome::ok())
        }
        Command::Add {
            id,
            name,
            phone,
            address,
            unique,
            json,
        } => {
            let record = Record::new(id, name, phone, address);
            record.validate()?;
            if store.contains_id(&record.id)? {
                if unique {
                    return Err(Error::new(ErrorKind::AlreadyExists)
                        .with_message("a record with this roll number already exists")
                        .with_id(&record.id)
                        .with_path(store.path())
                        .with_hint(
                            "Drop --unique to allow duplicates, or update the existing record.",
                        ));
                }
                emit_duplicate_notice(store, &record.id, color_mode);
            }
            let record = store.add(&record)?;
            if json {
                emit_json(json!({ "added": record_json(&record) }));
            } else {
                println!("added {}", record.id);
            }
            Ok(RunOutcome::ok())
        }
        Command::List { json } => {
            let records = collect_records(store)?;
            if json {
                emit_json(records_json(&records));
            } else if records.is_empty() {
                println!("No records stored.");
            } else {
                let rows = records.iter().map(record_row).collect::<Vec<_>>();
                println!("{}", render_table(&RECORD_HEADERS, &rows));
            }
            Ok(RunOutcome::ok())
        }
        Command::Get { id, json } => {
            let record = store.find_by_id(&id).map_err(add_missing_record_hint)?;
            if json {
                emit_json(record_json(&record));
            } else {
                println!("{}", record_block(&record));
            }
            Ok(RunOutcome::ok())
        }
        Command::Update {
            id,
            name,
            phone,
            address,
            json,
        } => {
            let update = RecordUpdate {
                name,
                phone,
                address,
            };
            if update.is_empty() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("update needs at least one field to change")
                    .with_hint("Pass --name, --phone, or --address."));
            }
            let record = store
                .update(&id, &update)
                .map_err(add_missing_record_hint)?;
            if json {
                emit_json(json!({ "updated": record_json(&record) }));
            } else {
                println!("updated {}", record.id);
            }
            Ok(RunOutcome::ok())
        }
        Command::Delete { id, json } => {
            let record = store.delete(&id).map_err(add_missing_record_hint)?;
            if json {
                emit_json(json!({ "deleted": record_json(&record) }));
            } else {
                println!("deleted {}", record.id);
            }
            Ok(RunOutcome::ok())
        }
        Command::Count { json } => {
            let count = store.count()?;
            if json {
                emit_json(json!({ "count": count }));
            } else {
                println!("{count}");
            }
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "hostel", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
    }
}

fn collect_records(store: &RecordStore) -> Result<Vec<Record>, Error> {
    let records = match store.list_all() {
        Ok(records) => records,
        Err(err) if err.kind() == ErrorKind::StoreMissing => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    records
        .map(|record| record.map_err(|err| err.with_path(store.path())))
        .collect()
}

fn add_missing_record_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::NotFound || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check stored roll numbers with `hostel list`.")
}

fn emit_duplicate_notice(store: &RecordStore, id: &str, color_mode: ColorMode) {
    let time = notice_time_now().unwrap_or_default();
    let notice = Notice::duplicate_id("add", store.path(), id, time);
    emit_notice(&notice, color_mode);
}
