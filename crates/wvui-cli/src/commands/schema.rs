//! `wvui schema ...`

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Subcommand;
use wvui_core::{ClassDefinition, PropertyDefinition};

use super::read_input;
use crate::App;
use crate::output;

#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    /// List classes
    List {
        /// Print the raw schema JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a class from flags or from a JSON definition
    Create {
        /// Class name
        #[arg(required_unless_present = "file")]
        class: Option<String>,

        /// Property as `name:type`, repeatable
        #[arg(long = "property", value_name = "NAME:TYPE")]
        properties: Vec<String>,

        #[arg(long)]
        description: Option<String>,

        /// Class definition JSON (`-` reads stdin)
        #[arg(long, conflicts_with_all = ["class", "properties", "description"])]
        file: Option<PathBuf>,
    },

    /// Delete a class and all of its objects
    Delete { class: String },
}

pub async fn run(app: &App, command: SchemaCommand) -> anyhow::Result<()> {
    match command {
        SchemaCommand::List { json } => {
            let schema = app.client.get_schema().await?;
            if json {
                output::print_json(&schema)?;
            } else if schema.classes.is_empty() {
                println!("No classes");
            } else {
                println!("{}", output::schema_table(&schema));
            }
        }
        SchemaCommand::Create {
            class,
            properties,
            description,
            file,
        } => {
            let definition = match (file, class) {
                (Some(file), _) => serde_json::from_str(&read_input(&file)?)
                    .context("invalid class definition")?,
                (None, Some(class)) => build_class(class, &properties, description)?,
                (None, None) => bail!("a class name or --file is required"),
            };
            app.client.create_class(&definition).await?;
            println!("Created class {}", definition.class);
        }
        SchemaCommand::Delete { class } => {
            app.client.delete_class(&class).await?;
            println!("Deleted class {class}");
        }
    }
    Ok(())
}

fn build_class(
    class: String,
    properties: &[String],
    description: Option<String>,
) -> anyhow::Result<ClassDefinition> {
    let mut definition = ClassDefinition::new(class);
    if let Some(description) = description {
        definition = definition.with_description(description);
    }
    for property in properties {
        let Some((name, data_type)) = property.split_once(':') else {
            bail!("property '{property}' must be NAME:TYPE");
        };
        if name.is_empty() || data_type.is_empty() {
            bail!("property '{property}' must be NAME:TYPE");
        }
        definition = definition.with_property(PropertyDefinition::new(name, data_type));
    }
    Ok(definition)
}
