//! End-to-end tests through the lopdf backend.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thesis_lint::{check_bytes, check_file, CheckKind, CheckOptions, Error, LopdfBackend};

/// One A4 page per entry, each showing its text with Helvetica 12 pt.
fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let runs: Vec<Vec<(f32, &str)>> = pages.iter().map(|text| vec![(0.0, *text)]).collect();
    build_pdf_with_runs(&runs)
}

/// One A4 page per entry. Each page is a single Helvetica 12 pt line made of
/// separate text runs, each placed `dx` after the start of the previous one.
fn build_pdf_with_runs(pages: &[Vec<(f32, &str)>]) -> Vec<u8> {
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

    let mut kids: Vec<Object> = Vec::new();
    for runs in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
        ];
        for (dx, text) in runs {
            if *dx != 0.0 {
                operations.push(Operation::new("Td", vec![Object::Real(*dx), 0.into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn test_check_bytes_finds_text_mistakes() {
    let pdf = build_pdf(&["Clean page", "Figure ?? shows - results"]);
    let options = CheckOptions::none().with_dash(true).with_bad_reference(true);
    let report = check_bytes(&pdf, options).unwrap();

    assert_eq!(report.page_count, 2);
    assert!(report.mistakes_found);
    assert_eq!(report.count(CheckKind::Dash), 1);
    assert_eq!(report.count(CheckKind::BadReference), 1);
    assert!(report.findings.iter().all(|f| f.page == 2));
}

#[test]
fn test_words_placed_as_separate_runs_are_spaced() {
    let pdf = build_pdf_with_runs(&[
        vec![(0.0, "results"), (42.0, "-"), (8.0, "good")],
        vec![(0.0, "see"), (22.0, "(Smith)")],
        vec![(0.0, "see"), (19.0, "(Smith)")],
    ]);
    let options = CheckOptions::none()
        .with_dash(true)
        .with_bracket_spacing(true);
    let report = check_bytes(&pdf, options).unwrap();

    let dashes: Vec<_> = report.findings_of(CheckKind::Dash).collect();
    assert_eq!(dashes.len(), 1);
    assert_eq!(dashes[0].page, 1);
    // only the hyphen itself is highlighted
    let rect = dashes[0].rects[0];
    assert!(rect.x0 >= 113.0 && rect.x1 <= 119.0);

    // a spaced bracket is fine, a bracket run touching the word is not
    let brackets: Vec<_> = report.findings_of(CheckKind::BracketSpacing).collect();
    assert_eq!(brackets.len(), 1);
    assert_eq!(brackets[0].page, 3);
}

#[test]
fn test_check_file_writes_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("thesis.pdf");
    let output = dir.path().join("thesis_annotated.pdf");
    std::fs::write(&input, build_pdf(&["Missing ?? reference"])).unwrap();

    let options = CheckOptions::none().with_bad_reference(true);
    let report = check_file(&input, &output, options).unwrap();
    assert!(report.mistakes_found);
    assert!(output.exists());

    let annotated = LopdfBackend::open(&output).unwrap();
    let doc = annotated.document();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let annots = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Annots")
        .unwrap()
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(annots.len(), 1);

    let annot = doc
        .get_dictionary(annots[0].as_reference().unwrap())
        .unwrap();
    assert_eq!(annot.get(b"Subtype").unwrap().as_name().unwrap(), b"Highlight");
}

#[test]
fn test_clean_document_is_still_saved() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clean.pdf");
    let output = dir.path().join("clean_annotated.pdf");
    std::fs::write(&input, build_pdf(&["Nothing to see here"])).unwrap();

    let report = check_file(&input, &output, CheckOptions::all()).unwrap();
    assert!(!report.mistakes_found);
    assert!(output.exists());
}

#[test]
fn test_missing_and_invalid_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pdf");

    let missing = check_file(dir.path().join("missing.pdf"), &output, CheckOptions::all());
    assert!(matches!(missing, Err(Error::DocumentOpen(_))));

    assert!(matches!(
        check_bytes(b"not a pdf at all", CheckOptions::all()),
        Err(Error::UnknownFormat)
    ));
}
