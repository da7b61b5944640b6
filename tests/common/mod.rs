#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use pageperfect_server::config::{CompilerSettings, Settings};
use pageperfect_server::templates::TemplateRegistry;
use pageperfect_server::AppState;
use tempfile::TempDir;

/// Typesetter stand-in that writes a tiny PDF to the `-o` path.
pub const SUCCEEDING_TYPESETTER: &str = r#"
out=""
while [ "$#" -gt 0 ]; do
  if [ "$1" = "-o" ]; then
    out="$2"
    shift
  fi
  shift
done
printf '%%PDF-1.4\n%%fake\n' > "$out"
"#;

/// Typesetter stand-in that fails with LaTeX-style diagnostics.
pub const FAILING_TYPESETTER: &str = r#"
cat >&2 <<'EOF'
[WARNING] Citeproc: citation Finch2023 not found
Undefined citation: 'Finch2023'
! LaTeX Error: File `fancyhdr.sty' not found.
EOF
exit 43
"#;

/// Exits cleanly without producing output.
pub const SILENT_TYPESETTER: &str = "exit 0\n";

/// Never finishes within a test timeout.
pub const HANGING_TYPESETTER: &str = "exec sleep 30\n";

/// Scratch directories for one test: the fake typesetter and the work dir.
pub struct Fixture {
    pub scripts: TempDir,
    pub work_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            scripts: tempfile::tempdir().unwrap(),
            work_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn script(&self, body: &str) -> PathBuf {
        let path = self.scripts.path().join("typesetter.sh");
        std::fs::write(&path, body).unwrap();
        path
    }

    /// Compiler settings that run `body` through `/bin/sh`.
    pub fn compiler_settings(&self, body: &str, timeout: Duration) -> CompilerSettings {
        let script = self.script(body);
        CompilerSettings {
            program: PathBuf::from("/bin/sh"),
            leading_args: vec![script.to_string_lossy().into_owned()],
            template_dir: TemplateRegistry::bundled_dir().to_path_buf(),
            work_dir: self.work_dir.path().to_path_buf(),
            timeout,
            ..Default::default()
        }
    }

    pub fn settings(&self, body: &str, timeout: Duration) -> Settings {
        Settings {
            compiler: self.compiler_settings(body, timeout),
            ..Default::default()
        }
    }

    pub fn state(&self, body: &str) -> AppState {
        AppState::new(self.settings(body, Duration::from_secs(10)))
    }

    pub fn work_dir_entries(&self) -> usize {
        count_entries(self.work_dir.path())
    }
}

pub fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
