//! Sample command implementation.

use crate::cli::SampleArgs;
use crate::commands::write_file;
use crate::error::Result;
use crate::output::Formatter;

/// Example style guide covering every rule category.
pub const SAMPLE_GUIDE: &str = "\
DOCUMENT FORMATTING GUIDE

1. MARGINS
   - Top: 4 cm
   - Bottom: 3 cm
   - Left: 4 cm
   - Right: 3 cm

2. FONT
   - Typeface: Times New Roman
   - Size: 12 pt for body text
   - Size: 14 pt for chapter titles

3. SPACING
   - Between lines: 1.5 (one and a half)
   - Between paragraphs: 6 pt after each paragraph

4. DOCUMENT STRUCTURE
   - Title Page
   - Table of Contents
   - CHAPTER I INTRODUCTION
   - CHAPTER II LITERATURE REVIEW
   - CHAPTER III METHODOLOGY
   - CHAPTER IV RESULTS AND DISCUSSION
   - CHAPTER V CONCLUSION
   - References
";

/// Execute the sample command.
pub fn execute_sample(args: SampleArgs, formatter: &Formatter) -> Result<()> {
    match args.output {
        Some(path) => {
            write_file(&path, SAMPLE_GUIDE.as_bytes())?;
            println!("{}", formatter.success(&format!("Sample guide written to {}", path.display())));
        }
        None => print!("{}", SAMPLE_GUIDE),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_sample_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.txt");
        let formatter = Formatter::new(OutputFormat::Table, false);

        execute_sample(SampleArgs { output: Some(path.clone()) }, &formatter).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, SAMPLE_GUIDE);
    }

    #[test]
    fn test_sample_is_a_loadable_guide() {
        let doc = guidesmith_loader::GuideDocument::from_text("sample.txt", SAMPLE_GUIDE);
        let text = guidesmith_loader::load(&doc).unwrap();
        assert!(text.contains("Times New Roman"));
    }
}
