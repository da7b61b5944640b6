#![cfg(unix)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Fixture, FAILING_TYPESETTER, HANGING_TYPESETTER, SILENT_TYPESETTER, SUCCEEDING_TYPESETTER};
use futures_util::StreamExt;
use pageperfect_server::compile::diagnostics::GENERIC_FAILURE_MESSAGE;
use pageperfect_server::compile::{CompileError, CompileService, DiagnosticParser, SanitizedRequest};
use pageperfect_server::layout::{MarginPreset, PageSize};
use pageperfect_server::templates::{TemplateKey, TemplateRegistry};

fn service(fixture: &Fixture, script: &str, timeout: Duration) -> CompileService {
    CompileService::new(
        Arc::new(fixture.compiler_settings(script, timeout)),
        Arc::new(TemplateRegistry::default()),
        Arc::new(DiagnosticParser::default()),
    )
}

fn sample_request() -> SanitizedRequest {
    SanitizedRequest {
        manuscript_text: "# Chapter One\n\nIt was a dark night [@Finch2023].".to_string(),
        title: "My Book".to_string(),
        template: TemplateKey::Chicago,
        page_size: PageSize::SixByNine,
        margin_preset: MarginPreset::Normal,
    }
}

#[tokio::test]
async fn test_success_streams_pdf_and_cleans_up() {
    let fixture = Fixture::new();
    let service = service(&fixture, SUCCEEDING_TYPESETTER, Duration::from_secs(10));

    let mut document = service.compile_detached(sample_request()).await.unwrap();
    assert!(document.size > 0);
    assert!(document.filename.starts_with("my-book_chicago_6x9_"));
    assert_eq!(fixture.work_dir_entries(), 1);

    let workspace = document.stream.workspace_path().unwrap().to_path_buf();
    assert!(workspace.join("input.md").is_file());
    assert!(workspace.join("grid.tex").is_file());

    let mut bytes = Vec::new();
    while let Some(chunk) = document.stream.next().await {
        bytes.extend_from_slice(&chunk.unwrap());
    }
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(bytes.len() as u64, document.size);

    assert!(!workspace.exists());
    assert_eq!(fixture.work_dir_entries(), 0);
}

#[tokio::test]
async fn test_dropped_stream_removes_workspace() {
    let fixture = Fixture::new();
    let service = service(&fixture, SUCCEEDING_TYPESETTER, Duration::from_secs(10));

    let document = service.compile(&sample_request()).await.unwrap();
    assert_eq!(fixture.work_dir_entries(), 1);
    drop(document);
    assert_eq!(fixture.work_dir_entries(), 0);
}

#[tokio::test]
async fn test_failure_is_classified() {
    let fixture = Fixture::new();
    let service = service(&fixture, FAILING_TYPESETTER, Duration::from_secs(10));

    match service.compile_detached(sample_request()).await {
        Err(CompileError::CompileFailed(report)) => {
            assert_eq!(report.missing_citations, vec!["Finch2023"]);
            assert_eq!(report.missing_packages, vec!["fancyhdr"]);
            assert!(report.detail.contains("fancyhdr.sty"));
        }
        other => panic!("expected compile failure, got {:?}", other.err()),
    }
    assert_eq!(fixture.work_dir_entries(), 0);
}

#[tokio::test]
async fn test_missing_output_is_a_failure() {
    let fixture = Fixture::new();
    let service = service(&fixture, SILENT_TYPESETTER, Duration::from_secs(10));

    match service.compile(&sample_request()).await {
        Err(CompileError::CompileFailed(report)) => {
            assert_eq!(report.message, GENERIC_FAILURE_MESSAGE);
        }
        other => panic!("expected compile failure, got {:?}", other.err()),
    }
    assert_eq!(fixture.work_dir_entries(), 0);
}

#[tokio::test]
async fn test_timeout_kills_typesetter() {
    let fixture = Fixture::new();
    let service = service(&fixture, HANGING_TYPESETTER, Duration::from_millis(300));

    let started = std::time::Instant::now();
    let result = service.compile_detached(sample_request()).await;
    assert!(started.elapsed() < Duration::from_secs(10));

    match result {
        Err(e @ CompileError::Timeout(_)) => {
            assert_eq!(e.error_code(), "compile_timeout");
        }
        other => panic!("expected timeout, got {:?}", other.err()),
    }
    assert_eq!(fixture.work_dir_entries(), 0);
}

#[tokio::test]
async fn test_missing_program_is_internal() {
    let fixture = Fixture::new();
    let mut settings = fixture.compiler_settings(SUCCEEDING_TYPESETTER, Duration::from_secs(10));
    settings.program = fixture.scripts.path().join("no-such-typesetter");
    let service = CompileService::new(
        Arc::new(settings),
        Arc::new(TemplateRegistry::default()),
        Arc::new(DiagnosticParser::default()),
    );

    let error = service.compile(&sample_request()).await.err().unwrap();
    assert!(error.is_internal());
    assert_eq!(fixture.work_dir_entries(), 0);
}

#[tokio::test]
async fn test_timeout_covers_background_stderr_holder() {
    let fixture = Fixture::new();
    // The background sleep inherits stderr, so the pipe stays open after exit.
    let service = service(&fixture, "sleep 6 &\nexit 1\n", Duration::from_millis(500));

    let started = std::time::Instant::now();
    let result = service.compile_detached(sample_request()).await;
    assert!(started.elapsed() < Duration::from_secs(3));

    match result {
        Err(CompileError::Timeout(_)) => {}
        other => panic!("expected timeout, got {:?}", other.err()),
    }
    assert_eq!(fixture.work_dir_entries(), 0);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_timeout_kills_typesetter_descendants() {
    let fixture = Fixture::new();
    let pid_file = fixture.scripts.path().join("engine.pid");
    let script = format!("sleep 30 &\necho $! > '{}'\nwait\n", pid_file.display());
    let service = service(&fixture, &script, Duration::from_millis(500));

    let result = service.compile_detached(sample_request()).await;
    assert!(matches!(result, Err(CompileError::Timeout(_))));

    let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while is_running(&pid) && std::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(!is_running(&pid), "engine process {} survived the timeout", pid);
}

/// A reaped or zombie process counts as stopped.
#[cfg(target_os = "linux")]
fn is_running(pid: &str) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit_once(") ")
            .map(|(_, rest)| !rest.starts_with('Z') && !rest.starts_with('X'))
            .unwrap_or(false),
        Err(_) => false,
    }
}
