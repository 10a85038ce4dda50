//! Command implementations.

pub mod defaults;
pub mod extract;
pub mod generate;
pub mod render;
pub mod sample;

pub use self::defaults::execute_defaults;
pub use self::extract::execute_extract;
pub use self::generate::execute_generate;
pub use self::render::execute_render;
pub use self::sample::execute_sample;

use crate::config::Config;
use crate::error::Result;
use guidesmith_loader::GuideDocument;
use guidesmith_template::TemplateOptions;
use std::fs;
use std::path::Path;

/// Read a guide file into a `GuideDocument`.
pub(crate) fn read_guide(path: &Path) -> Result<GuideDocument> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    // format is checked before reading so unsupported files fail fast
    guidesmith_loader::DocumentFormat::from_file_name(&file_name)?;
    let bytes = fs::read(path)?;
    Ok(GuideDocument::new(file_name, bytes)?)
}

/// Template options from the config, with the title override and `--bare`
/// applied.
pub(crate) fn template_options(config: &Config, title: Option<String>, bare: bool) -> TemplateOptions {
    let configured = &config.service.template;
    let options = if bare {
        TemplateOptions::minimal().with_title(configured.title.clone())
    } else {
        configured.clone()
    };
    match title {
        Some(title) => options.with_title(title),
        None => options,
    }
}

/// Write `contents` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
