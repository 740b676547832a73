use std::process::{Command, Output};

fn fib_vm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fib-vm"))
        .args(args)
        .env_remove("FIB_VM_MAXSTEPS")
        .output()
        .expect("fib-vm should run")
}

#[test]
fn exits_with_guest_status() {
    let out = fib_vm(&["-m", "fib10"]);
    assert_eq!(out.status.code(), Some(55));

    let out = fib_vm(&["-m", "loop3"]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn log_goes_to_stdout() {
    let out = fib_vm(&["-m", "hello"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, b"hello, world\n");
}

#[test]
fn max_steps_is_honoured() {
    let out = fib_vm(&["-m", "fib20", "--max-steps", "10"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("did not exit within 10 steps"), "{stderr}");

    let out = Command::new(env!("CARGO_BIN_EXE_fib-vm"))
        .args(["-m", "fib20"])
        .env("FIB_VM_MAXSTEPS", "10")
        .output()
        .unwrap();
    assert!(!out.status.success());
}

#[test]
fn bad_arguments() {
    assert!(!fib_vm(&["-m", "sort10"]).status.success());
    // a machine and a file are mutually exclusive
    assert!(!fib_vm(&["-m", "fib10", "guest.elf"]).status.success());
    assert!(!fib_vm(&[]).status.success());
}
