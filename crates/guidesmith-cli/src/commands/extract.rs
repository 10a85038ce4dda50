//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::commands::{read_guide, write_file};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use guidesmith_domain::LlmBackend;
use guidesmith_service::{ExtractedRules, TemplateService};
use std::path::Path;
use tracing::{error, info};

/// Execute the extract command.
///
/// Files are processed in order; a failing file is reported and the rest
/// still run.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if args.output.is_some() && args.files.len() > 1 {
        return Err(CliError::InvalidInput(
            "--output can only be used with a single guide file".to_string(),
        ));
    }

    let service = TemplateService::from_config(&config.service)?;
    let total = args.files.len();
    let mut failures = Vec::new();

    for path in &args.files {
        info!(file = %path.display(), "Extracting rules");
        match extract_one(&service, path).await {
            Ok(extracted) => {
                println!("{}", formatter.format_extraction(&path.display().to_string(), &extracted)?);
                if let Some(output) = &args.output {
                    let json = serde_json::to_string_pretty(extracted.rules())?;
                    write_file(output, json.as_bytes())?;
                    println!("{}", formatter.success(&format!("Rules saved to {}", output.display())));
                }
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "Extraction failed");
                eprintln!("{}", formatter.error(&format!("{}: {}", path.display(), e.user_message())));
                failures.push(e);
            }
        }
    }

    match (failures.len(), total) {
        (0, _) => Ok(()),
        (_, 1) => Err(failures.remove(0)),
        (failed, total) => Err(CliError::Partial { failed, total }),
    }
}

async fn extract_one<B: LlmBackend>(service: &TemplateService<B>, path: &Path) -> Result<ExtractedRules> {
    let document = read_guide(path)?;
    Ok(service.extract_rules(&document).await?)
}
