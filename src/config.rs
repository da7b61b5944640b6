//! Process-wide settings, read once from the environment at startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::templates::TemplateRegistry;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MAX_MANUSCRIPT_BYTES: usize = 2_000_000;
const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 45_000;
const DEFAULT_JSON_BODY_LIMIT: usize = 20 * 1024 * 1024;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3001";

/// How the external typesetter is invoked.
#[derive(Debug, Clone)]
pub struct CompilerSettings {
    pub program: PathBuf,
    /// Arguments placed before the generated ones, for wrappers around pandoc.
    pub leading_args: Vec<String>,
    pub pdf_engine: String,
    pub template_dir: PathBuf,
    pub bibliography: Option<PathBuf>,
    /// Parent directory for per-job workspaces.
    pub work_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pandoc"),
            leading_args: Vec::new(),
            pdf_engine: "xelatex".to_string(),
            template_dir: TemplateRegistry::bundled_dir().to_path_buf(),
            bibliography: None,
            work_dir: env::temp_dir(),
            timeout: Duration::from_millis(DEFAULT_COMPILE_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub max_manuscript_bytes: usize,
    pub json_body_limit: usize,
    pub allowed_origins: Vec<String>,
    /// Reject unknown page sizes, presets and templates instead of substituting defaults.
    pub strict_formatting: bool,
    pub compiler: CompilerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_manuscript_bytes: DEFAULT_MAX_MANUSCRIPT_BYTES,
            json_body_limit: DEFAULT_JSON_BODY_LIMIT,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            strict_formatting: false,
            compiler: CompilerSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Settings::default();

        let work_dir = match env::var("WORK_DIR") {
            Ok(dir) if !dir.trim().is_empty() => {
                let dir = PathBuf::from(dir);
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("failed to create WORK_DIR {}", dir.display()))?;
                dir
            }
            _ => defaults.compiler.work_dir,
        };

        let compiler = CompilerSettings {
            program: env::var("PANDOC_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.compiler.program),
            leading_args: env::var("PANDOC_ARGS")
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            pdf_engine: env::var("PDF_ENGINE").unwrap_or(defaults.compiler.pdf_engine),
            template_dir: env::var("TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.compiler.template_dir),
            bibliography: env::var("BIBLIOGRAPHY_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            work_dir,
            timeout: Duration::from_millis(parse_env("COMPILE_TIMEOUT_MS", DEFAULT_COMPILE_TIMEOUT_MS)),
        };

        if !compiler.template_dir.is_dir() {
            log::warn!(
                "TEMPLATE_DIR {} does not exist; every compile will fail",
                compiler.template_dir.display()
            );
        }

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|origins| split_origins(&origins))
            .unwrap_or(defaults.allowed_origins);

        Ok(Settings {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT", DEFAULT_PORT),
            max_manuscript_bytes: parse_env("MAX_MANUSCRIPT_BYTES", DEFAULT_MAX_MANUSCRIPT_BYTES),
            json_body_limit: parse_env("JSON_BODY_LIMIT", DEFAULT_JSON_BODY_LIMIT),
            allowed_origins,
            strict_formatting: parse_env("STRICT_FORMATTING", false),
            compiler,
        })
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.max_manuscript_bytes, 2_000_000);
        assert_eq!(settings.compiler.timeout, Duration::from_secs(45));
        assert_eq!(settings.compiler.pdf_engine, "xelatex");
        assert!(!settings.strict_formatting);
    }

    #[test]
    fn test_split_origins() {
        let origins = split_origins(" http://a.test , ,https://b.test");
        assert_eq!(origins, vec!["http://a.test", "https://b.test"]);
    }

    #[test]
    fn test_parse_env_falls_back_on_garbage() {
        env::set_var("PAGEPERFECT_TEST_PARSE_ENV", "not-a-number");
        assert_eq!(parse_env("PAGEPERFECT_TEST_PARSE_ENV", 7u64), 7);
        env::set_var("PAGEPERFECT_TEST_PARSE_ENV", " 12 ");
        assert_eq!(parse_env("PAGEPERFECT_TEST_PARSE_ENV", 7u64), 12);
        env::remove_var("PAGEPERFECT_TEST_PARSE_ENV");
    }
}
