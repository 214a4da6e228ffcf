//! Binding tests against an installed engine
//!
//! The engine is process-wide and not reentrant, so every test here is
//! `#[serial]`.

mod common;

use std::path::Path;
use std::time::{Duration, Instant};

use officekit_server::office::{DocumentType, Office, OfficeError, SelectionAnchor, TileMode};
use serial_test::serial;

use common::{office, sample_dir, PLAIN_TEXT};

const LOAD_LIMIT: Duration = Duration::from_secs(10);
const DOCUMENT_THAT_DOESNT_EXIST: &str = "testdata/kittens.docx";

#[test]
#[serial]
fn test_invalid_office_path() {
    let err = Office::new("/etc/passwd").unwrap_err();
    assert!(matches!(err, OfficeError::InvalidInstallation { .. }));
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_valid_office_path() {
    let office = office();
    assert!(office.install_path().is_absolute());
    assert!(office.last_error().is_empty());
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_second_installation_is_rejected() {
    let _office = office();
    let other = tempfile::tempdir().unwrap();

    let err = Office::new(other.path()).unwrap_err();
    match err {
        OfficeError::InvalidInstallation { reason, .. } => assert!(reason.contains("already running")),
        other => panic!("Expected InvalidInstallation, got {:?}", other),
    }
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_get_office_error_message() {
    let office = office();
    let _ = office.load_document(DOCUMENT_THAT_DOESNT_EXIST);
    assert!(!office.last_error().is_empty());
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_diagnostics_are_per_handle() {
    let first = office();
    let second = office();

    let _ = first.load_document(DOCUMENT_THAT_DOESNT_EXIST);
    assert!(!first.last_error().is_empty());
    assert!(second.last_error().is_empty());
    assert!(!first.clone().last_error().is_empty());
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_load_document_that_doesnt_exist() {
    let office = office();
    let err = office.load_document(DOCUMENT_THAT_DOESNT_EXIST).unwrap_err();
    assert!(matches!(err, OfficeError::DocumentNotFound(_)));
    assert!(err.is_conclusive());
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_load_document_engine_rejects() {
    let office = office();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.docx");
    std::fs::write(&path, b"").unwrap();

    match office.load_document(&path) {
        Err(OfficeError::DocumentLoadFailed { reason, .. }) => {
            assert!(!reason.is_empty());
            assert!(office.last_error().contains(&reason));
        }
        // Some engine builds open an empty file as a blank text document
        Ok(doc) => assert_eq!(doc.document_type().unwrap(), DocumentType::Text),
        Err(other) => panic!("Expected DocumentLoadFailed, got {:?}", other),
    }
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_success_load_document() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document(&sample).unwrap();
    assert_eq!(doc.path(), sample.canonicalize().unwrap());
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_success_load_document_with_options() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document_with_options(&sample, "Language=en-US").unwrap();
    assert_eq!(doc.document_type().unwrap(), DocumentType::Text);
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_success_load_document_safe() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let before = office.load_stats();

    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();
    assert_eq!(doc.parts().unwrap(), 2);

    let after = office.load_stats();
    assert_eq!(after.started, before.started + 1);
    assert_eq!(after.completed, before.completed + 1);
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_load_document_safe_missing_is_conclusive() {
    let office = office();
    let err = office
        .load_document_safe(DOCUMENT_THAT_DOESNT_EXIST, LOAD_LIMIT)
        .await
        .unwrap_err();
    assert!(matches!(err, OfficeError::DocumentNotFound(_)));
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_load_document_safe_timeout() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let limit = Duration::from_millis(1);
    let before = office.load_stats();

    let started = Instant::now();
    let err = office.load_document_safe(&sample, limit).await.unwrap_err();
    assert!(matches!(err, OfficeError::Timeout(d) if d == limit));
    assert!(!err.is_conclusive());
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!office.last_error().is_empty());
    assert!(office.is_busy());

    // The abandoned load runs to completion and its document is discarded
    let deadline = Instant::now() + Duration::from_secs(60);
    loop {
        let stats = office.load_stats();
        if stats.abandoned_finished > before.abandoned_finished && stats.in_flight == 0 {
            assert_eq!(stats.timed_out, before.timed_out + 1);
            break;
        }
        assert!(Instant::now() < deadline, "abandoned load never finished");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // The engine is usable again afterwards
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();
    assert_eq!(doc.document_type().unwrap(), DocumentType::Text);
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_load_path_with_url_characters() {
    let office = office();
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("report #1 (50% done)");
    std::fs::create_dir(&nested).unwrap();
    let sample = common::write_sample(&nested);

    let doc = office.load_document(&sample).unwrap();
    assert_eq!(doc.parts().unwrap(), 2);

    let output = nested.join("copy #2.docx");
    doc.save_as(&output, "docx", None).unwrap();
    assert!(output.is_file());
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_document_failures_are_recorded_on_the_handle() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();
    assert!(office.last_error().is_empty());

    let err = doc.set_part(usize::MAX).unwrap_err();
    assert!(matches!(err, OfficeError::InvalidArgument(_)));
    assert_eq!(office.last_error(), err.to_string());

    let err = doc.part_name(usize::MAX).unwrap_err();
    assert_eq!(office.last_error(), err.to_string());

    let err = doc.text_selection("text/plain\0").unwrap_err();
    assert_eq!(office.last_error(), err.to_string());
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_successful_load_and_save_document() {
    let office = office();
    let (dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();

    let output = dir.path().join("out.docx");
    doc.save_as(&output, "docx", None).unwrap();
    assert!(output.is_file());

    let reloaded = office.load_document(&output).unwrap();
    assert_eq!(reloaded.parts().unwrap(), 2);
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_save_as_pdf() {
    let office = office();
    let (dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();

    let output = dir.path().join("out.pdf");
    doc.save_as(&output, "pdf", None).unwrap();
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_save_as_unwritable_destination() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();

    let output = Path::new("/nonexistent/dir/out.docx");
    let err = doc.save_as(output, "docx", None).unwrap_err();
    assert!(matches!(err, OfficeError::SaveFailed { .. }));
    assert!(!office.last_error().is_empty());
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_get_part_page_rectangles() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();

    let pages = doc.part_page_rectangles().unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| !p.is_empty()));
    assert!(pages[1].y > pages[0].y);
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_get_parts() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();
    assert_eq!(doc.parts().unwrap(), 2);
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_get_tile_mode() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();

    let mode = doc.tile_mode().unwrap();
    assert!(mode == TileMode::Rgba || mode == TileMode::Bgra);
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_get_type() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();
    assert_eq!(doc.document_type().unwrap(), DocumentType::Text);
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_text_selection() {
    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();

    let page = doc.part_page_rectangles().unwrap()[0];
    doc.set_text_selection(SelectionAnchor::Start, page.x, page.y).unwrap();
    doc.set_text_selection(SelectionAnchor::End, page.right(), page.bottom()).unwrap();
    let plaintext = doc.text_selection(PLAIN_TEXT).unwrap();
    assert!(plaintext.len() >= 1000, "selected only {} bytes", plaintext.len());

    doc.reset_text_selection().unwrap();
    assert!(doc.text_selection(PLAIN_TEXT).unwrap().is_empty());

    // Resetting an empty selection is a no-op
    doc.reset_text_selection().unwrap();
    assert!(doc.text_selection(PLAIN_TEXT).unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
async fn test_paint_first_page() {
    use officekit_server::office::TileRequest;

    let office = office();
    let (_dir, sample) = sample_dir();
    let doc = office.load_document_safe(&sample, LOAD_LIMIT).await.unwrap();

    let page = doc.part_page_rectangles().unwrap()[0];
    doc.initialize_for_rendering("").unwrap();
    let tile = doc.paint_tile(&TileRequest::fit_width(page, 128).unwrap()).unwrap();
    assert_eq!(tile.width(), 128);
    assert!(tile.height() > 128);

    let summary = doc.summary().unwrap();
    assert_eq!(summary.parts, 2);
    assert_eq!(summary.pages.len(), 2);
    assert!(summary.size.width > 0 && summary.size.height > 0);
}

#[test]
#[ignore = "requires a LibreOffice installation (LOK_PATH)"]
#[serial]
fn test_version_info() {
    let office = office();
    let info = office.version_info().unwrap();
    assert!(!info.product_name.is_empty());
    assert!(!info.product_version.is_empty());
}
