//! Handler for the `config` command.

use anyhow::Result;

use mdtidy_lib::config::Settings;
use mdtidy_lib::exit_codes;

use super::Session;

/// Print the engine configuration the lint rules map to, or the settings schema.
pub fn handle_config(session: &Session, schema: bool) -> Result<i32> {
    let output = if schema {
        Settings::json_schema()?
    } else {
        session.adapter().engine_config().to_json_string()?
    };
    println!("{output}");
    Ok(exit_codes::SUCCESS)
}
