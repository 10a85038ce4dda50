//! Generate command implementation.

use crate::cli::GenerateArgs;
use crate::commands::{read_guide, template_options, write_file};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use guidesmith_service::TemplateService;

/// Execute the generate command.
pub async fn execute_generate(args: GenerateArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut service_config = config.service.clone();
    service_config.template = template_options(config, args.title, args.bare);

    let service = TemplateService::from_config(&service_config)?;
    let document = read_guide(&args.file)?;
    let output = service.process(&document).await?;

    write_file(&args.output, &output.template.bytes)?;

    println!(
        "{}",
        formatter.format_extraction(&args.file.display().to_string(), &output.rules)?
    );
    if let Some(rules_path) = &args.rules_output {
        let json = serde_json::to_string_pretty(output.rules.rules())?;
        write_file(rules_path, json.as_bytes())?;
        println!("{}", formatter.success(&format!("Rules saved to {}", rules_path.display())));
    }
    println!(
        "{}",
        formatter.success(&format!(
            "Template written to {} ({} bytes)",
            args.output.display(),
            output.template.bytes.len()
        ))
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use guidesmith_domain::FormatRuleSet;
    use guidesmith_llm::ProviderKind;
    use std::fs;

    #[tokio::test]
    async fn test_generate_writes_template_and_rules() {
        let dir = tempfile::tempdir().unwrap();
        let guide = dir.path().join("guide.md");
        fs::write(&guide, "# Guide\nDouble spacing throughout.").unwrap();
        let template = dir.path().join("template.docx");
        let rules = dir.path().join("rules.json");

        let mut config = Config::default();
        config.service.llm.provider = ProviderKind::Mock;
        config.service.llm.mock_response = r#"{"line_spacing": "double"}"#.to_string();

        let args = GenerateArgs {
            file: guide,
            output: template.clone(),
            rules_output: Some(rules.clone()),
            title: Some("My Thesis".to_string()),
            bare: false,
        };
        execute_generate(args, &config, &Formatter::new(OutputFormat::Json, false))
            .await
            .unwrap();

        let bytes = fs::read(&template).unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let doc = guidesmith_loader::GuideDocument::new("template.docx", bytes).unwrap();
        let text = guidesmith_loader::load(&doc).unwrap();
        assert!(text.starts_with("My Thesis"));

        let saved: FormatRuleSet = serde_json::from_str(&fs::read_to_string(&rules).unwrap()).unwrap();
        assert_eq!(saved.line_spacing, 2.0);
    }
}
