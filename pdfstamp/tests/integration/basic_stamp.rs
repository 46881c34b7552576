//! Stamping single documents end to end.

use lopdf::Document;
use pdfstamp::batch::BatchStamper;
use pdfstamp::config::Config;
use pdfstamp::stamp::{Corner, StampLayout};
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{
    build_pdf, page_ids, shown_text, stamp_matrix, stamp_text, write_pdf, write_pdf_with_text_at,
};

async fn stamp_one(config: Config, name: &str) -> (Document, Document) {
    let input = config.input_dir.join(name);
    let output_dir = config.resolved_output_dir();

    let summary = BatchStamper::new(config).run().await.unwrap();
    assert_eq!(summary.succeeded, 1, "{:?}", summary.reports);

    let original = Document::load(&input).unwrap();
    let stamped = Document::load(output_dir.join(format!("stamped_{name}"))).unwrap();
    (original, stamped)
}

#[tokio::test]
async fn test_output_keeps_page_count() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "report.pdf", 7);

    let (original, stamped) = stamp_one(Config::new(temp_dir.path()), "report.pdf").await;

    assert_eq!(stamped.get_pages().len(), original.get_pages().len());
    assert_eq!(stamped.get_pages().len(), 7);
}

#[tokio::test]
async fn test_stamp_shows_page_count() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "twelve.pdf", 12);

    let (_, stamped) = stamp_one(Config::new(temp_dir.path()), "twelve.pdf").await;
    let first = page_ids(&stamped)[0];

    assert_eq!(
        stamp_text(&stamped, first),
        vec!["Received and Reviewed", "12 Pages"]
    );
}

#[tokio::test]
async fn test_first_page_keeps_original_content() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "doc.pdf", 2);

    let (_, stamped) = stamp_one(Config::new(temp_dir.path()), "doc.pdf").await;
    let first = page_ids(&stamped)[0];

    let content = stamped.get_page_content(first).unwrap();
    assert_eq!(shown_text(&content), vec!["Page 1"]);
}

#[tokio::test]
async fn test_later_pages_untouched() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "doc.pdf", 4);

    let (original, stamped) = stamp_one(Config::new(temp_dir.path()), "doc.pdf").await;
    let before = page_ids(&original);
    let after = page_ids(&stamped);

    for (old_id, new_id) in before.iter().zip(&after).skip(1) {
        assert_eq!(
            original.get_page_content(*old_id).unwrap(),
            stamped.get_page_content(*new_id).unwrap()
        );
        assert_eq!(
            original.get_object(*old_id).unwrap(),
            stamped.get_object(*new_id).unwrap()
        );
        assert!(stamp_text(&stamped, *new_id).is_empty());
    }
}

#[tokio::test]
async fn test_single_page_document() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "one.pdf", 1);

    let (_, stamped) = stamp_one(Config::new(temp_dir.path()), "one.pdf").await;
    let first = page_ids(&stamped)[0];

    assert_eq!(stamp_text(&stamped, first)[1], "1 Pages");
}

#[rstest]
#[tokio::test]
async fn test_rotated_and_odd_sized_pages(
    #[values(0, 90, 180, 270)] rotate: i64,
    #[values((612, 792), (842, 595), (300, 300))] size: (i64, i64),
) {
    let temp_dir = TempDir::new().unwrap();
    build_pdf(3, size.0, size.1, Some(rotate))
        .save(temp_dir.path().join("odd.pdf"))
        .unwrap();

    let (_, stamped) = stamp_one(Config::new(temp_dir.path()), "odd.pdf").await;
    let first = page_ids(&stamped)[0];

    assert_eq!(stamp_text(&stamped, first)[1], "3 Pages");
}

#[tokio::test]
async fn test_custom_layout_and_prefix() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "doc.pdf", 5);

    let mut config = Config::new(temp_dir.path());
    config.prefix = "checked-".to_string();
    config.output_dir = Some(temp_dir.path().join("out"));
    config.layout = StampLayout {
        header_text: "Approved".to_string(),
        count_template: "Total: {pages}".to_string(),
        corner: Corner::TopLeft,
        ..Default::default()
    };

    let summary = BatchStamper::new(config).run().await.unwrap();
    assert_eq!(summary.succeeded, 1);

    let stamped = Document::load(temp_dir.path().join("out").join("checked-doc.pdf")).unwrap();
    let first = page_ids(&stamped)[0];
    assert_eq!(stamp_text(&stamped, first), vec!["Approved", "Total: 5"]);
}

#[tokio::test]
async fn test_compressed_output_still_loads() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "doc.pdf", 3);

    let mut config = Config::new(temp_dir.path());
    config.compress = true;

    let (_, stamped) = stamp_one(config, "doc.pdf").await;
    let first = page_ids(&stamped)[0];
    assert_eq!(stamp_text(&stamped, first)[1], "3 Pages");
}

#[tokio::test]
async fn test_input_file_not_modified() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(temp_dir.path(), "doc.pdf", 2);
    let before = std::fs::read(&input).unwrap();

    BatchStamper::new(Config::new(temp_dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(std::fs::read(&input).unwrap(), before);
}

#[tokio::test]
async fn test_auto_corner_moves_stamp_away_from_text() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf_with_text_at(temp_dir.path(), "footer.pdf", 430, 40, "Signed: J. Doe");
    write_pdf_with_text_at(temp_dir.path(), "header.pdf", 430, 740, "Ref 2024-117");

    let mut config = Config::new(temp_dir.path());
    config.layout.corner = Corner::Auto;
    let out = config.resolved_output_dir();

    let summary = BatchStamper::new(config).run().await.unwrap();
    assert_eq!(summary.succeeded, 2);

    // Text in the lower right pushes the stamp to the upper right.
    let stamped = Document::load(out.join("stamped_footer.pdf")).unwrap();
    let m = stamp_matrix(&stamped, page_ids(&stamped)[0]);
    assert_eq!(&m[4..], &[340.0, 600.0]);

    // Otherwise the lower right corner is kept.
    let stamped = Document::load(out.join("stamped_header.pdf")).unwrap();
    let m = stamp_matrix(&stamped, page_ids(&stamped)[0]);
    assert_eq!(&m[4..], &[340.0, 12.0]);
}

#[tokio::test]
async fn test_non_ascii_header_is_stamped() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "doc.pdf", 2);

    let mut config = Config::new(temp_dir.path());
    config.layout.header_text = "Geprüft".to_string();

    let (_, stamped) = stamp_one(config, "doc.pdf").await;
    let first = page_ids(&stamped)[0];

    // 0xfc is not valid UTF-8 on its own, so a lossy decode marks it.
    let header = stamp_text(&stamped, first)[0].clone();
    assert_eq!(header, "Gepr\u{fffd}ft");
}

