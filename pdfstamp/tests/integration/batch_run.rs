//! Whole-directory runs: counting, classification, determinism.

use pdfstamp::batch::{BatchStamper, FileStatus};
use pdfstamp::config::Config;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{build_pdf, dir_snapshot, write_corrupt_pdf, write_pdf, write_text_file};

#[tokio::test]
async fn test_three_pdfs_and_a_text_file() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "a.pdf", 1);
    write_pdf(temp_dir.path(), "b.pdf", 2);
    write_pdf(temp_dir.path(), "c.pdf", 3);
    write_text_file(temp_dir.path(), "notes.txt");

    let summary = BatchStamper::new(Config::new(temp_dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.found, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);

    let outputs: Vec<String> = dir_snapshot(&temp_dir.path().join("stamped_pdfs"))
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(outputs, vec!["stamped_a.pdf", "stamped_b.pdf", "stamped_c.pdf"]);
}

#[tokio::test]
async fn test_corrupt_pdf_counted_failed() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "a.pdf", 2);
    write_corrupt_pdf(temp_dir.path(), "b.pdf");
    write_pdf(temp_dir.path(), "c.pdf", 2);

    let summary = BatchStamper::new(Config::new(temp_dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(
        (summary.found, summary.succeeded, summary.failed, summary.skipped),
        (3, 2, 1, 0)
    );

    let failed = &summary.reports[1];
    assert_eq!(failed.status, FileStatus::Failed);
    assert!(failed.output.is_none());
    assert!(failed.message.is_some());

    let out_dir = temp_dir.path().join("stamped_pdfs");
    assert!(out_dir.join("stamped_a.pdf").exists());
    assert!(!out_dir.join("stamped_b.pdf").exists());
    assert!(out_dir.join("stamped_c.pdf").exists());
}

#[tokio::test]
async fn test_zero_page_pdf_counted_skipped() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "a.pdf", 1);
    build_pdf(0, 612, 792, None)
        .save(temp_dir.path().join("blank.pdf"))
        .unwrap();

    let summary = BatchStamper::new(Config::new(temp_dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(
        (summary.found, summary.succeeded, summary.failed, summary.skipped),
        (2, 1, 0, 1)
    );
    let blank = summary
        .reports
        .iter()
        .find(|r| r.file_name() == "blank.pdf")
        .unwrap();
    assert_eq!(blank.status, FileStatus::Skipped);
}

#[tokio::test]
async fn test_empty_directory() {
    let temp_dir = TempDir::new().unwrap();

    let summary = BatchStamper::new(Config::new(temp_dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.found, 0);
    assert!(summary.reports.is_empty());
    // The output directory is still created.
    assert!(temp_dir.path().join("stamped_pdfs").is_dir());
}

#[tokio::test]
async fn test_uppercase_extension_is_found() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "SCAN.PDF", 2);

    let summary = BatchStamper::new(Config::new(temp_dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert!(
        temp_dir
            .path()
            .join("stamped_pdfs")
            .join("stamped_SCAN.PDF")
            .exists()
    );
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "a.pdf", 3);
    write_pdf(temp_dir.path(), "b.pdf", 1);
    let out_dir = temp_dir.path().join("stamped_pdfs");

    let stamper = BatchStamper::new(Config::new(temp_dir.path()));

    let first = stamper.run().await.unwrap();
    let snapshot = dir_snapshot(&out_dir);

    let second = stamper.run().await.unwrap();

    assert_eq!(dir_snapshot(&out_dir), snapshot);
    assert_eq!(first.reports, second.reports);
    // The output directory is not picked up as input on the second run.
    assert_eq!(second.found, 2);
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(16)]
#[tokio::test]
async fn test_parallel_run_matches_sequential(#[case] jobs: usize) {
    let inputs = TempDir::new().unwrap();
    for (i, pages) in [5, 1, 3, 2, 8, 4].into_iter().enumerate() {
        write_pdf(inputs.path(), &format!("doc{i}.pdf"), pages);
    }
    write_corrupt_pdf(inputs.path(), "doc9.pdf");

    let sequential_out = TempDir::new().unwrap();
    let mut config = Config::new(inputs.path());
    config.output_dir = Some(sequential_out.path().to_path_buf());
    let sequential = BatchStamper::new(config.clone()).run().await.unwrap();

    let parallel_out = TempDir::new().unwrap();
    config.output_dir = Some(parallel_out.path().to_path_buf());
    config.jobs = jobs;
    let parallel = BatchStamper::new(config).run().await.unwrap();

    let names = |s: &pdfstamp::RunSummary| -> Vec<String> {
        s.reports.iter().map(|r| r.file_name()).collect()
    };
    assert_eq!(names(&sequential), names(&parallel));
    assert_eq!(
        (parallel.succeeded, parallel.failed),
        (sequential.succeeded, sequential.failed)
    );
    assert_eq!(
        dir_snapshot(sequential_out.path()),
        dir_snapshot(parallel_out.path())
    );
}

#[tokio::test]
async fn test_progress_callback_sees_every_file() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "a.pdf", 1);
    write_corrupt_pdf(temp_dir.path(), "b.pdf");

    let mut statuses = Vec::new();
    let summary = BatchStamper::new(Config::new(temp_dir.path()))
        .run_with_progress(|report| statuses.push(report.status))
        .await
        .unwrap();

    assert_eq!(statuses, vec![FileStatus::Stamped, FileStatus::Failed]);
    assert_eq!(summary.reports.len(), 2);
}

#[tokio::test]
async fn test_summary_json() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "a.pdf", 12);

    let summary = BatchStamper::new(Config::new(temp_dir.path()))
        .run()
        .await
        .unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["found"], 1);
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["reports"][0]["status"], "stamped");
    assert_eq!(json["reports"][0]["page_count"], 12);
}
