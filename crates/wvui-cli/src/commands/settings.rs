//! `wvui settings ...`

use clap::Subcommand;
use wvui_settings::WvuiSettings;

use crate::App;
use crate::output;

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the effective settings and where they are stored
    Show,

    /// Write the effective settings to the settings file so they can be edited
    Init,
}

pub fn run(app: &App, command: SettingsCommand) -> anyhow::Result<()> {
    let path = WvuiSettings::settings_path()?;
    match command {
        SettingsCommand::Show => {
            println!("# {}", path.display());
            output::print_json(&app.settings)?;
        }
        SettingsCommand::Init => {
            app.settings.save()?;
            println!("Wrote settings to {}", path.display());
        }
    }
    Ok(())
}
