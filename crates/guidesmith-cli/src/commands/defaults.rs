//! Defaults command implementation.

use crate::error::Result;
use crate::output::Formatter;
use guidesmith_domain::FormatRuleSet;

/// Execute the defaults command.
pub fn execute_defaults(formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_rules(&FormatRuleSet::default())?);
    Ok(())
}
