// Interactive menu driven end to end through the binary's stdin.
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn session(store: &Path, script: &str) -> Output {
    let exe = env!("CARGO_BIN_EXE_hostel");
    let mut child = Command::new(exe)
        .env_remove("HOSTEL_STORE")
        .env_remove("RUST_LOG")
        .args(["--file", store.to_str().unwrap()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(script.as_bytes())
        .expect("write script");
    child.wait_with_output().expect("wait")
}

#[test]
fn full_session_exits_zero() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = temp.path().join("hostel_data.txt");

    let script = "\
1\nR-1\nAsha Khan\n555-0100\n12 Hill Road\n\
1\nR-2\nBen Ode\n555-0101\n3 Lake View\n\
2\n\
3\nR-2\n\
4\nR-1\n\n555-0199\n\n\
5\nR-2\n\
6\n";
    let out = session(&store, script);
    assert_eq!(out.status.code(), Some(0));

    let text = String::from_utf8(out.stdout).expect("utf8");
    assert!(text.contains("HOSTEL MANAGEMENT SYSTEM"));
    assert_eq!(text.matches("[SUCCESS] Student Record Added Successfully!").count(), 2);
    assert!(text.contains("ALL STUDENTS RECORD"));
    assert!(text.contains("[FOUND] Student Found!"));
    assert!(text.contains("[SUCCESS] Record Updated Successfully."));
    assert!(text.contains("[DELETED] Record with Roll No R-2 has been deleted."));

    assert_eq!(
        std::fs::read_to_string(&store).expect("read"),
        "R-1\nAsha Khan\n555-0199\n12 Hill Road\n"
    );
}

#[test]
fn closed_stdin_exits_zero_without_writing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = temp.path().join("hostel_data.txt");

    let out = session(&store, "");
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Thank you for using the application!"));
    assert!(!store.exists());
}

#[test]
fn store_errors_do_not_end_the_session() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = temp.path().join("hostel_data.txt");
    std::fs::write(&store, "R-1\nAsha\n").expect("write");

    let out = session(&store, "2\n5\nR-1\n6\n");
    assert_eq!(out.status.code(), Some(0));
    let text = String::from_utf8(out.stdout).expect("utf8");
    assert_eq!(text.matches("[ERROR] record is missing its phone line").count(), 2);
    assert!(text.contains("four lines"));
    assert_eq!(std::fs::read_to_string(&store).expect("read"), "R-1\nAsha\n");
}

#[test]
fn failed_write_is_reported_and_session_exits_zero() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = temp.path().join("gone").join("hostel_data.txt");

    let out = session(&store, "1\nR-1\nAsha\n555\nBlock A\n2\n6\n");
    assert_eq!(out.status.code(), Some(0));
    let text = String::from_utf8(out.stdout).expect("utf8");
    assert!(text.contains("[ERROR] failed to open store for writing"));
    assert!(text.contains("[ERROR] File not found or no data exists."));
    assert!(text.contains("Thank you for using the application!"));
    assert_eq!(std::fs::read_dir(temp.path()).expect("dir").count(), 0);
}
