use std::fs;
use std::path::Path;

use ambel_core::QaSegmenter;

use crate::commands::CommandResult;

/// Segments already-extracted document text into Q&A pairs and writes them as
/// a pretty-printed JSON array. Nothing is written when no pair is found.
pub fn run(input: &Path, output: &Path) -> CommandResult {
    let text = match fs::read_to_string(input) {
        Ok(text) => text,
        Err(error) => {
            return CommandResult::failure(
                "convert",
                "input_read",
                format!("could not read `{}`: {error}", input.display()),
                8,
            );
        }
    };

    let pairs = QaSegmenter::default().segment(&text);
    if pairs.is_empty() {
        return CommandResult::success(
            "convert",
            format!(
                "no Q&A pairs found in `{}`; check the heading layout. Nothing was written.",
                input.display()
            ),
        );
    }

    let json = match serde_json::to_string_pretty(&pairs) {
        Ok(json) => json,
        Err(error) => return CommandResult::failure("convert", "serialization", error.to_string(), 9),
    };
    if let Err(error) = fs::write(output, json) {
        return CommandResult::failure(
            "convert",
            "output_write",
            format!("could not write `{}`: {error}", output.display()),
            8,
        );
    }

    CommandResult::success(
        "convert",
        format!("extracted {} Q&A pairs into `{}`", pairs.len(), output.display()),
    )
}
