use std::{env, fs, path::PathBuf, process::Command};

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[init]\n"
        + "n_packs_with_pups = 8\n"
        + "n_pups_per_pack = 4\n"
        + "n_lone_pups = 10\n"
        + "n_vagrants = 12\n"
        + "n_pairs = 9\n"
        + "\n"
        + "[run]\n"
        + "n_steps = 48\n"
        + "seed = 2024\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    fn run_bin(args: &[&str]) {
        let bin = PathBuf::from(env!("CARGO_BIN_EXE_wolfpack"));

        let output = Command::new(bin)
            .args(args)
            .output()
            .expect("failed to execute command");

        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

        assert!(
            output.status.success(),
            "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
        );
    }

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "create"]);
    run_bin(&["--sim-dir", test_dir_str, "create"]);

    for run in ["run-0000", "run-0001"] {
        assert!(test_dir.join(run).join("records.msgpack").is_file());
    }

    run_bin(&["--sim-dir", test_dir_str, "analyze"]);

    for run in ["run-0000", "run-0001"] {
        assert!(test_dir.join(run).join("results.msgpack").is_file());
    }

    run_bin(&["--sim-dir", test_dir_str, "clean"]);

    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn rejects_invalid_config() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("rejects_invalid_config");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_contents = String::new()
        + "[init]\n"
        + "n_packs_with_pups = 8\n"
        + "n_pups_per_pack = 4\n"
        + "n_lone_pups = 10\n"
        + "n_vagrants = 12\n"
        + "n_pairs = 9\n"
        + "\n"
        + "[run]\n"
        + "n_steps = 0\n";

    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    let output = Command::new(env!("CARGO_BIN_EXE_wolfpack"))
        .args(["--sim-dir", test_dir.to_str().unwrap(), "create"])
        .output()
        .expect("failed to execute command");
    assert!(!output.status.success());
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}
