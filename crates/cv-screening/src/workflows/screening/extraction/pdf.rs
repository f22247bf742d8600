use lopdf::Document;

use super::ExtractionError;

/// Concatenates the text of every page in page-number order.
pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document = Document::load_mem(bytes)?;
    let mut text = String::new();

    // get_pages is a BTreeMap keyed by page number, so iteration is ordered.
    for page_number in document.get_pages().into_keys() {
        text.push_str(&document.extract_text(&[page_number])?);
    }

    Ok(text)
}
