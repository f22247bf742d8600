use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Joins the body paragraphs of a DOCX file with newlines.
///
/// Paragraphs nested inside tables are not part of the body paragraph list
/// and are skipped. The inflated XML is read through `max_bytes` so a zip
/// bomb cannot exhaust memory.
pub(super) fn extract(bytes: &[u8], max_bytes: usize) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let part = archive.by_name(DOCUMENT_PART)?;

    let mut xml = String::new();
    part.take(max_bytes as u64 + 1).read_to_string(&mut xml)?;
    if xml.len() > max_bytes {
        return Err(ExtractionError::TooLarge {
            size: xml.len() as u64,
            limit: max_bytes,
        });
    }

    body_paragraphs(&xml).map(|paragraphs| paragraphs.join("\n"))
}

fn body_paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut table_depth = 0usize;
    // Paragraphs nest through text boxes and alternate content; only the
    // outermost level belongs to the body.
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        let collecting = current.is_some() && paragraph_depth == 1;
        match reader.read_event()? {
            Event::Start(element) => match element.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 && table_depth == 0 {
                        current = Some(String::new());
                    }
                }
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"w:p" if paragraph_depth == 0 && table_depth == 0 => {
                    paragraphs.push(String::new())
                }
                b"w:tab" if collecting && run_depth > 0 => push(&mut current, "\t"),
                b"w:br" | b"w:cr" if collecting && run_depth > 0 => push(&mut current, "\n"),
                _ => {}
            },
            Event::Text(text) if in_text && collecting => {
                push(&mut current, &text.unescape()?);
            }
            Event::End(element) => match element.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" => {
                    if paragraph_depth == 1 {
                        if let Some(paragraph) = current.take() {
                            paragraphs.push(paragraph);
                        }
                    }
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push(current: &mut Option<String>, text: &str) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(text);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Wraps body XML into a minimal DOCX package.
    pub(crate) fn docx_bytes(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .expect("start part");
        writer.write_all(xml.as_bytes()).expect("write part");
        writer.finish().expect("finish archive").into_inner()
    }

    fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    #[test]
    fn joins_paragraphs_with_newlines() {
        let body = format!(
            "{}{}<w:p/>{}",
            paragraph("Jeanne Martin"),
            paragraph("5 ans d&apos;expérience en Python"),
            paragraph("Paris")
        );

        let text = extract(&docx_bytes(&body), 1 << 20).expect("docx parses");

        assert_eq!(text, "Jeanne Martin\n5 ans d'expérience en Python\n\nParis");
    }

    #[test]
    fn runs_tabs_and_breaks_stay_in_their_paragraph() {
        let body = r#"<w:p><w:r><w:t xml:space="preserve">SQL </w:t></w:r><w:r><w:tab/><w:t>Rust</w:t><w:br/><w:t>Go</w:t></w:r></w:p>"#;

        let text = extract(&docx_bytes(body), 1 << 20).expect("docx parses");

        assert_eq!(text, "SQL \tRust\nGo");
    }

    #[test]
    fn table_paragraphs_are_skipped() {
        let body = format!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}",
            paragraph("Profil"),
            paragraph("hidden in a table"),
            paragraph("Compétences")
        );

        let text = extract(&docx_bytes(&body), 1 << 20).expect("docx parses");

        assert_eq!(text, "Profil\nCompétences");
    }

    #[test]
    fn inflated_xml_is_bounded() {
        let body = paragraph(&"x".repeat(4096));
        match extract(&docx_bytes(&body), 512) {
            Err(ExtractionError::TooLarge { limit, .. }) => assert_eq!(limit, 512),
            other => panic!("expected size bound error, got {other:?}"),
        }
    }

    #[test]
    fn archive_without_document_part_is_an_error() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .expect("start part");
        writer.write_all(b"<w:styles/>").expect("write");
        let bytes = writer.finish().expect("finish").into_inner();

        assert!(matches!(extract(&bytes, 1 << 20), Err(ExtractionError::Zip(_))));
    }

    #[test]
    fn text_box_content_does_not_split_its_paragraph() {
        let body = format!(
            "<w:p><w:r><w:t>Python</w:t></w:r><w:r><w:drawing><wps:txbx><w:txbxContent>{}</w:txbxContent></wps:txbx></w:drawing></w:r><w:r><w:t xml:space=\"preserve\"> SQL</w:t></w:r></w:p>{}",
            paragraph("Box"),
            paragraph("Next")
        );

        let text = extract(&docx_bytes(&body), 1 << 20).expect("docx parses");

        assert_eq!(text, "Python SQL\nNext");
    }

    #[test]
    fn tab_stop_definitions_are_not_text() {
        let body = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/><w:tab w:val="right" w:pos="9000"/></w:tabs></w:pPr><w:r><w:t>Rust</w:t></w:r></w:p>"#;

        let text = extract(&docx_bytes(body), 1 << 20).expect("docx parses");

        assert_eq!(text, "Rust");
    }
}
