//! Shared fixtures for the integration tests.
//!
//! Test PDFs are generated with lopdf instead of being checked in, so every
//! page carries a known text and the expected output can be derived.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::path::{Path, PathBuf};

/// Build a document with `pages` pages of the given size. Page `n` shows the
/// text `Page n`.
pub fn build_pdf(pages: u32, width: i64, height: i64, rotate: Option<i64>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![72.into(), 72.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap(),
        ));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        };
        if let Some(degrees) = rotate {
            page.set("Rotate", degrees);
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => i64::from(pages),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a Letter-sized PDF with `pages` pages to `dir/name`.
pub fn write_pdf(dir: &Path, name: &str, pages: u32) -> PathBuf {
    let path = dir.join(name);
    build_pdf(pages, 612, 792, None).save(&path).unwrap();
    path
}

/// Write a file with a `.pdf` name that is not a PDF.
pub fn write_corrupt_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4\nthis file was truncated").unwrap();
    path
}

/// Write any non-PDF file.
pub fn write_text_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "not a pdf").unwrap();
    path
}

/// Object ids of all pages, in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Strings shown with `Tj` in an encoded content stream.
pub fn shown_text(content: &[u8]) -> Vec<String> {
    Content::decode(content)
        .unwrap()
        .operations
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// Text drawn by the Form XObjects painted on a page.
pub fn stamp_text(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let resources = match doc.get_dictionary(page_id).unwrap().get(b"Resources").unwrap() {
        Object::Dictionary(dict) => dict.clone(),
        Object::Reference(id) => doc.get_dictionary(*id).unwrap().clone(),
        other => panic!("unexpected resources: {other:?}"),
    };

    let Ok(xobjects) = resources.get(b"XObject") else {
        return Vec::new();
    };

    let mut text = Vec::new();
    for (_, value) in xobjects.as_dict().unwrap().iter() {
        let form = doc
            .get_object(value.as_reference().unwrap())
            .unwrap()
            .as_stream()
            .unwrap();
        let content = form
            .decompressed_content()
            .unwrap_or_else(|_| form.content.clone());
        text.extend(shown_text(&content));
    }
    text
}

/// Operands of the first `cm` in the stamp Form XObject of a page.
pub fn stamp_matrix(doc: &Document, page_id: ObjectId) -> Vec<f32> {
    let resources = match doc.get_dictionary(page_id).unwrap().get(b"Resources").unwrap() {
        Object::Dictionary(dict) => dict.clone(),
        Object::Reference(id) => doc.get_dictionary(*id).unwrap().clone(),
        other => panic!("unexpected resources: {other:?}"),
    };
    let xobjects = resources.get(b"XObject").unwrap();
    let (_, form_ref) = xobjects.as_dict().unwrap().iter().next().unwrap();
    let form = doc
        .get_object(form_ref.as_reference().unwrap())
        .unwrap()
        .as_stream()
        .unwrap();
    let content = form
        .decompressed_content()
        .unwrap_or_else(|_| form.content.clone());

    let cm = Content::decode(&content)
        .unwrap()
        .operations
        .into_iter()
        .find(|op| op.operator == "cm")
        .unwrap();
    cm.operands
        .iter()
        .map(|o| match o {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            other => panic!("unexpected operand: {other:?}"),
        })
        .collect()
}

/// Write a one-page Letter PDF whose only text is `text` at `(x, y)`.
pub fn write_pdf_with_text_at(dir: &Path, name: &str, x: i64, y: i64, text: &str) -> PathBuf {
    let mut doc = build_pdf(1, 612, 792, None);
    let page_id = page_ids(&doc)[0];
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
    doc.get_dictionary_mut(page_id)
        .unwrap()
        .set("Contents", content_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Sorted `(file name, contents)` pairs of the files in `dir`.
pub fn dir_snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file())
        .map(|path| {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, std::fs::read(&path).unwrap())
        })
        .collect();
    files.sort();
    files
}
