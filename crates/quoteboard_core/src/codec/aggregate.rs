//! Consolidated document builder.
//!
//! # Invariants
//! - Output is an array shape: `[`, one tab-indented block per element joined
//!   by `,`, then `]`.
//! - No separator trails the last element, including the empty case.

/// Joins encoded record blocks into one array document.
///
/// Each block is trimmed before it is written. With zero blocks the result is
/// `"[\n\n]"`.
pub fn aggregate_documents<S: AsRef<str>>(blocks: &[S]) -> String {
    let mut document = String::from("[\n");
    for block in blocks {
        document.push('\t');
        document.push_str(block.as_ref().trim());
        document.push_str(",\n");
    }

    if !blocks.is_empty() {
        if let Some(last_comma) = document.rfind(',') {
            document.remove(last_comma);
        }
    }

    document.push_str("\n]");
    document
}
