use crate::{ProcessTable, SysinfoProcessTable};

use std::sync::{Arc, Barrier};

use googletest::assert_that;
use googletest::prelude::eq;

#[test]
fn given_extra_threads_when_taking_snapshot_then_own_process_is_listed_once() {
    // Given
    let own_pid = std::process::id();
    let ready = Arc::new(Barrier::new(4));
    let release = Arc::new(Barrier::new(4));
    let workers: Vec<_> = (0..3)
        .map(|_| {
            let ready = Arc::clone(&ready);
            let release = Arc::clone(&release);
            std::thread::spawn(move || {
                ready.wait();
                release.wait();
            })
        })
        .collect();
    ready.wait();
    let table = SysinfoProcessTable::new();

    // When
    let snapshot = table.snapshot();
    release.wait();
    for worker in workers {
        worker.join().unwrap();
    }

    // Then
    let own = snapshot
        .iter()
        .find(|h| h.pid == own_pid)
        .expect("own process missing from snapshot");
    let same_binary = snapshot
        .iter()
        .filter(|h| h.exe_path.is_some() && h.exe_path == own.exe_path)
        .count();
    assert_that!(same_binary, eq(1));
}

#[test]
fn given_own_pid_when_checking_liveness_then_alive() {
    let table = SysinfoProcessTable::new();
    assert_that!(table.is_alive(std::process::id()), eq(true));
}
