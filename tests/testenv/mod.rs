//! Integration test harness, grounded on the teacher's
//! `tests/testenv/mod.rs` (temp working directory + shelling out to the
//! built binary), modernized to use `tempfile::TempDir` and
//! `env!("CARGO_BIN_EXE_...")` instead of the superseded `tempdir` crate
//! and hand-rolled executable lookup.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

pub struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    /// Builds a fresh temp directory with the given subdirectories and
    /// (path, contents) files created inside it.
    pub fn new(directories: &[&str], files: &[(&str, &str)]) -> TestEnv {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path();

        for directory in directories {
            fs::create_dir_all(root.join(directory)).expect("create dir");
        }
        for (path, contents) in files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("create parent dir");
            }
            fs::File::create(&full)
                .and_then(|mut f| f.write_all(contents.as_bytes()))
                .expect("write test file");
        }

        TestEnv { temp_dir }
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn write_file(&self, path: &str, contents: &str) {
        let full = self.root().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::File::create(full)
            .and_then(|mut f| f.write_all(contents.as_bytes()))
            .expect("write file");
    }

    /// Runs `gosearch` with the given args (the root directory is appended
    /// automatically unless already present) and returns (stdout, stderr,
    /// exit_code).
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        let mut full_args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        full_args.push(self.root().to_string_lossy().into_owned());

        let output = Command::new(env!("CARGO_BIN_EXE_gosearch"))
            .args(&full_args)
            .output()
            .expect("run gosearch");

        (
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.code().unwrap_or(-1),
        )
    }

    /// Like `run`, but sorts stdout lines first, since concurrent streaming
    /// gives no ordering guarantee (spec.md §2 Non-goals).
    pub fn run_sorted(&self, args: &[&str]) -> (Vec<String>, i32) {
        let (stdout, _stderr, code) = self.run(args);
        let mut lines: Vec<String> = stdout.lines().map(str::to_string).collect();
        lines.sort();
        (lines, code)
    }
}

