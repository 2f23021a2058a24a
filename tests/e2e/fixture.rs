//! E2E test fixture: an isolated extension project with a fake signing tool.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use tempfile::TempDir;

const SIGNED_NAME: &str = "css_x_fire-1.0-fx.xpi";

/// Checkpoint snapshot for test debugging.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub name: String,
    pub timestamp: Duration,
    pub step_count: usize,
    pub files: Vec<PathBuf>,
}

/// Step result for report generation.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: String,
    pub success: bool,
    pub duration: Duration,
    pub output_summary: String,
}

/// Isolated project: `project/src`, `project/dist`, a signer script and a
/// destination under `www/`.
pub struct E2EFixture {
    pub scenario_name: String,
    pub temp_dir: TempDir,
    /// Extension project root (`-C` target)
    pub project: PathBuf,
    pub dist: PathBuf,
    /// Where install copies the signed artifact
    pub destination: PathBuf,
    /// Written by the signer with its argument list
    pub signer_log: PathBuf,
    start_time: Instant,
    step_count: usize,
    checkpoints: Vec<Checkpoint>,
    step_results: Vec<StepResult>,
}

impl E2EFixture {
    /// Create a project whose signer copies its input to the signed name.
    pub fn new(scenario_name: &str) -> Self {
        Self::with_signer_exit(scenario_name, 0)
    }

    /// Create a project whose signer exits with `exit_code`.
    ///
    /// A non-zero signer writes nothing but a rejection on stderr.
    pub fn with_signer_exit(scenario_name: &str, exit_code: i32) -> Self {
        let start_time = Instant::now();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let project = temp_dir.path().join("project");
        let dist = project.join("dist");
        let destination = temp_dir.path().join("www/cssxfire.xpi");
        let signer_script = temp_dir.path().join("fake-signer.sh");
        let signer_log = temp_dir.path().join("signer.log");

        std::fs::create_dir_all(project.join("src/content"))
            .expect("Failed to create source dir");

        let body = if exit_code == 0 {
            format!("cp \"$7\" {SIGNED_NAME}\necho \"Signed $7 for $3\"\n")
        } else {
            format!("echo \"Server rejected the key\" >&2\nexit {exit_code}\n")
        };
        std::fs::write(
            &signer_script,
            format!(
                "# sign --api-key K --api-secret S --xpi FILE\necho \"$@\" > '{}'\n{body}",
                signer_log.display()
            ),
        )
        .expect("Failed to write signer script");

        std::fs::write(
            project.join("extpack.toml"),
            format!(
                r#"[sign]
command = "sh"
args = ["{}", "sign", "--api-key", "{{api_key}}", "--api-secret", "{{api_secret}}", "--xpi", "{{input}}"]

[install]
destination = "{}"
"#,
                signer_script.display(),
                destination.display()
            ),
        )
        .expect("Failed to write extpack.toml");

        println!();
        println!("{}", "█".repeat(70));
        println!("█ E2E SCENARIO: {}", scenario_name);
        println!("{}", "█".repeat(70));
        println!();
        println!("[E2E] Project: {:?}", project);
        println!("[E2E] Destination: {:?}", destination);
        println!("[E2E] Signer exit code: {}", exit_code);
        println!();

        Self {
            scenario_name: scenario_name.to_string(),
            temp_dir,
            project,
            dist,
            destination,
            signer_log,
            start_time,
            step_count: 0,
            checkpoints: Vec::new(),
            step_results: Vec::new(),
        }
    }

    /// Log a step in the E2E workflow.
    pub fn log_step(&mut self, description: &str) {
        self.step_count += 1;
        let elapsed = self.start_time.elapsed();

        println!();
        println!("┌{}", "─".repeat(68));
        println!("│ STEP {}: {}", self.step_count, description);
        println!("│ Time: {:?}", elapsed);
        println!("└{}", "─".repeat(68));
    }

    /// Capture a checkpoint listing every file in the temp tree.
    pub fn checkpoint(&mut self, name: &str) {
        let files: Vec<PathBuf> = walkdir::WalkDir::new(self.temp_dir.path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .collect();

        println!();
        println!("[CHECKPOINT] {}", name);
        println!("[CHECKPOINT] Files: {}", files.len());

        self.checkpoints.push(Checkpoint {
            name: name.to_string(),
            timestamp: self.start_time.elapsed(),
            step_count: self.step_count,
            files,
        });
    }

    /// Write a source file under `project/src`.
    pub fn create_source(&self, relative_path: &str, content: &str) {
        let path = self.project.join("src").join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("Failed to write source file");
        println!("[SRC] Created {} ({} bytes)", relative_path, content.len());
    }

    /// Write a file directly into dist, e.g. a stale signed artifact.
    pub fn create_dist_file(&self, name: &str, content: &str) -> PathBuf {
        std::fs::create_dir_all(&self.dist).expect("Failed to create dist dir");
        let path = self.dist.join(name);
        std::fs::write(&path, content).expect("Failed to write dist file");
        path
    }

    /// Run extpack against the project with the given credentials.
    pub fn run_extpack(&mut self, args: &[&str], credentials: Option<(&str, &str)>) -> CommandOutput {
        let step_name = format!("extpack {}", args.join(" "));
        let start = Instant::now();

        println!();
        println!("[CMD] {}", step_name);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_extpack"));
        cmd.arg("-C")
            .arg(&self.project)
            .args(args)
            .env("HOME", self.temp_dir.path())
            .env("XDG_CONFIG_HOME", self.temp_dir.path().join(".config"))
            .env_remove("EXTPACK_CONFIG")
            .env_remove("API_KEY")
            .env_remove("API_SECRET")
            .current_dir(self.temp_dir.path());
        if let Some((key, secret)) = credentials {
            cmd.env("API_KEY", key).env("API_SECRET", secret);
        }
        let output = cmd.output().expect("Failed to execute extpack");

        let elapsed = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let result = CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: stdout.clone(),
            stderr: stderr.clone(),
            elapsed,
        };

        println!("[CMD] Exit: {} ({:?})", result.exit_code, elapsed);
        if !stdout.is_empty() {
            println!("[STDOUT] {}", truncate(&stdout, 500));
        }
        if !stderr.is_empty() {
            println!("[STDERR] {}", stderr);
        }

        let summary = if result.success {
            format!("OK ({})", truncate(&stdout, 50))
        } else {
            format!("FAIL: {}", truncate(&stderr, 100))
        };
        self.step_results.push(StepResult {
            name: step_name,
            success: result.success,
            duration: elapsed,
            output_summary: summary,
        });

        result
    }

    /// Path of the signed artifact the fake signer writes.
    pub fn signed_artifact(&self) -> PathBuf {
        self.dist.join(SIGNED_NAME)
    }

    pub fn unsigned_archive(&self) -> PathBuf {
        self.dist.join("cssxfire_unsigned.xpi")
    }

    /// Argument line the signer last received, if it ran.
    pub fn signer_invocation(&self) -> Option<String> {
        std::fs::read_to_string(&self.signer_log)
            .ok()
            .map(|s| s.trim().to_string())
    }

    /// Assert command succeeded.
    pub fn assert_success(&self, output: &CommandOutput, operation: &str) {
        assert!(
            output.success,
            "[E2E] {} failed with exit code {}: {}",
            operation, output.exit_code, output.stderr
        );
        println!("[ASSERT] {} - SUCCESS", operation);
    }

    /// Assert output contains expected text.
    pub fn assert_output_contains(&self, output: &CommandOutput, expected: &str) {
        let found = output.stdout.contains(expected) || output.stderr.contains(expected);
        assert!(
            found,
            "[E2E] Output does not contain '{}'\nStdout: {}\nStderr: {}",
            expected,
            truncate(&output.stdout, 500),
            truncate(&output.stderr, 500)
        );
        println!("[ASSERT] Output contains '{}' - PASSED", expected);
    }

    /// Assert output does not contain text.
    pub fn assert_output_not_contains(&self, output: &CommandOutput, unexpected: &str) {
        let found = output.stdout.contains(unexpected) || output.stderr.contains(unexpected);
        assert!(
            !found,
            "[E2E] Output unexpectedly contains '{}'\nStdout: {}\nStderr: {}",
            unexpected,
            truncate(&output.stdout, 500),
            truncate(&output.stderr, 500)
        );
        println!("[ASSERT] Output does not contain '{}' - PASSED", unexpected);
    }

    /// Generate final test report.
    pub fn generate_report(&self) {
        println!();
        println!("{}", "█".repeat(70));
        println!("█ E2E REPORT: {}", self.scenario_name);
        println!("{}", "█".repeat(70));
        println!("Total Steps: {}", self.step_count);
        println!("Checkpoints: {}", self.checkpoints.len());
        println!("Total Time:  {:?}", self.start_time.elapsed());
        println!();

        for (i, step) in self.step_results.iter().enumerate() {
            let status = if step.success { "✓" } else { "✗" };
            println!("{:2}. {} {} ({:?})", i + 1, status, step.name, step.duration);
            if !step.success {
                println!("     └─ {}", step.output_summary);
            }
        }
        for checkpoint in &self.checkpoints {
            println!(
                "  [{:?}] {} (step {}, {} files)",
                checkpoint.timestamp,
                checkpoint.name,
                checkpoint.step_count,
                checkpoint.files.len()
            );
        }
        println!("{}", "█".repeat(70));
    }
}

impl Drop for E2EFixture {
    fn drop(&mut self) {
        println!();
        println!("█ E2E CLEANUP: {} ({:?})", self.scenario_name, self.start_time.elapsed());
    }
}

/// Command output structure.
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CommandOutput {
    /// Parse stdout as a JSON robot envelope.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).expect("stdout is not JSON")
    }
}

/// Entry names stored in a zip archive, in archive order.
pub fn archive_entries(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("Failed to open archive");
    let mut zip = zip::ZipArchive::new(file).expect("Failed to read archive");
    (0..zip.len())
        .map(|i| zip.by_index(i).expect("Failed to read entry").name().to_string())
        .collect()
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let cut = (0..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &s[..cut])
    }
}
