//! Integration tests for the jobsh REPL.
//!
//! Lines go through the same path as typed input: alias expansion,
//! parsing, then the shell.

use std::time::Duration;

use jobsh_kernel::{ExecResult, ShellConfig};
use jobsh_repl::{Repl, Step};

fn repl() -> Repl {
    Repl::with_config(ShellConfig::transient()).expect("Failed to create REPL")
}

/// Run a line and return its result, failing on exit or no output.
fn run(repl: &mut Repl, line: &str) -> ExecResult {
    match repl.process_line(line).expect("shell failed") {
        Step::Continue(Some(result)) => result,
        other => panic!("unexpected step for {line:?}: {other:?}"),
    }
}

#[test]
fn blank_lines_do_nothing() {
    let mut repl = repl();
    assert!(matches!(repl.process_line("   ").unwrap(), Step::Continue(None)));
}

#[test]
fn exit_and_quit_leave_the_loop() {
    let mut repl = repl();
    assert!(matches!(repl.process_line("exit").unwrap(), Step::Exit));
    assert!(matches!(repl.process_line("quit").unwrap(), Step::Exit));
}

#[test]
fn help_lists_the_builtins() {
    let mut repl = repl();
    let result = run(&mut repl, "help");
    for name in ["jobs", "fg [job]", "bg [job]", "cd [path]"] {
        assert!(result.out.contains(name), "help is missing {name}:\n{}", result.out);
    }
}

#[test]
fn parse_errors_are_reported_not_fatal() {
    let mut repl = repl();
    let result = run(&mut repl, "ls | wc -l");
    assert_eq!(result.code, 2);
    assert!(result.err.contains("pipelines are not supported"));

    let result = run(&mut repl, "echo 'unterminated");
    assert_eq!(result.code, 2);
}

#[test]
fn redirected_output_lands_in_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let mut repl = repl();

    let result = run(&mut repl, &format!("echo hi > {}", out.display()));
    assert!(result.ok());
    assert!(result.out.is_empty());
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "hi\n");
}

#[test]
fn aliases_expand_the_first_word() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("alias.txt");
    let mut repl = repl();

    assert!(run(&mut repl, "alias say='echo said'").ok());
    let listing = run(&mut repl, "alias");
    assert_eq!(listing.out, "alias say='echo said'\n");

    run(&mut repl, &format!("say it > {}", out.display()));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "said it\n");

    assert!(run(&mut repl, "unalias say").ok());
    assert_eq!(run(&mut repl, "unalias say").code, 1);
    assert_eq!(run(&mut repl, "say it").code, 127);
}

#[test]
fn background_job_shows_up_in_jobs() {
    let mut repl = repl();
    assert!(run(&mut repl, "sleep 30 &").ok());

    let listing = run(&mut repl, "jobs");
    assert!(listing.out.contains("[1]"));
    assert!(listing.out.contains("Running"));
    assert!(listing.out.contains("sleep 30 &"));

    repl.shutdown();
}

#[test]
fn finished_jobs_are_announced_once() {
    let mut repl = repl();
    run(&mut repl, "true &");

    let mut notices = Vec::new();
    for _ in 0..500 {
        notices = repl.drain_notices();
        if !notices.is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(notices.len(), 1, "notices: {notices:?}");
    assert!(notices[0].contains("Done"));
    assert!(repl.drain_notices().is_empty());
}

#[test]
fn fg_with_no_jobs_is_quiet() {
    let mut repl = repl();
    let result = run(&mut repl, "fg");
    assert!(result.ok());
    assert!(result.out.is_empty() && result.err.is_empty());
}

#[test]
fn foreground_exit_status_is_returned() {
    let mut repl = repl();
    assert_eq!(run(&mut repl, "sh -c 'exit 4'").code, 4);
    assert_eq!(run(&mut repl, "no_such_program_jobsh_test").code, 127);
}
