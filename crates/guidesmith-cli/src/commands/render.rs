//! Render command implementation.

use crate::cli::RenderArgs;
use crate::commands::{template_options, write_file};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use guidesmith_domain::FormatRuleSet;
use guidesmith_service::ServiceError;
use guidesmith_template::TemplateGenerator;
use std::fs;
use tracing::info;

/// Execute the render command.
pub fn execute_render(args: RenderArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let json = fs::read_to_string(&args.rules)?;
    let rules: FormatRuleSet = serde_json::from_str(&json).map_err(|e| {
        CliError::InvalidInput(format!("{} is not a rules file: {}", args.rules.display(), e))
    })?;

    let options = template_options(config, args.title, args.bare);

    info!(rules = %args.rules.display(), "Rendering template from saved rules");
    let artifact = TemplateGenerator::new(options)
        .generate(&rules)
        .map_err(ServiceError::from)?;
    write_file(&args.output, &artifact.bytes)?;

    println!(
        "{}",
        formatter.success(&format!(
            "Template written to {} ({} bytes)",
            args.output.display(),
            artifact.bytes.len()
        ))
    );
    Ok(())
}
