//! `wvui objects ...`

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Subcommand;
use wvui_core::{DataObject, ObjectQuery};

use super::{parse_object, read_input};
use crate::App;
use crate::output;

#[derive(Debug, Subcommand)]
pub enum ObjectsCommand {
    /// List one page of objects
    List {
        #[arg(long)]
        class: Option<String>,

        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Objects per page; defaults to the configured page size
        #[arg(long)]
        page_size: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Show one object
    Get {
        id: String,
        #[arg(long)]
        class: Option<String>,
    },

    /// Create an object
    Create {
        #[arg(long)]
        class: String,
        /// Properties as a JSON object
        #[arg(long, default_value = "{}")]
        properties: String,
        /// Explicit object id
        #[arg(long)]
        id: Option<String>,
    },

    /// Replace an object's properties
    Update {
        id: String,
        #[arg(long)]
        class: String,
        /// Properties as a JSON object
        #[arg(long)]
        properties: String,
    },

    /// Delete an object
    Delete {
        id: String,
        #[arg(long)]
        class: Option<String>,
    },

    /// Create objects from a JSON array (`-` reads stdin)
    Batch { file: PathBuf },
}

pub async fn run(app: &App, command: ObjectsCommand) -> anyhow::Result<()> {
    let client = &app.client;
    match command {
        ObjectsCommand::List {
            class,
            page,
            page_size,
            json,
        } => {
            let page_size = page_size.unwrap_or(app.settings.objects.page_size).max(1);
            let query = ObjectQuery {
                class_name: class,
                ..Default::default()
            }
            .page(page, page_size);
            let result = client.get_objects(&query).await?;

            if json {
                return output::print_json(&result);
            }
            if result.objects.is_empty() {
                println!("No objects");
            } else {
                println!("{}", output::objects_table(&result.objects));
            }
            match result.total_results {
                Some(total) => println!("Page {} ({} per page), {} total", page, page_size, total),
                None => println!("Page {} ({} per page)", page, page_size),
            }
        }
        ObjectsCommand::Get { id, class } => {
            let object = client.get_object(&id, class.as_deref()).await?;
            output::print_json(&object)?;
        }
        ObjectsCommand::Create {
            class,
            properties,
            id,
        } => {
            let mut object = DataObject::new(class);
            object.properties = parse_object(&properties, "--properties")?;
            object.id = id;
            let created = client.create_object(&object).await?;
            println!("Created {}", created.id.as_deref().unwrap_or("object"));
        }
        ObjectsCommand::Update {
            id,
            class,
            properties,
        } => {
            let mut object = DataObject::new(class).with_id(id.clone());
            object.properties = parse_object(&properties, "--properties")?;
            client.update_object(&id, &object).await?;
            println!("Updated {id}");
        }
        ObjectsCommand::Delete { id, class } => {
            client.delete_object(&id, class.as_deref()).await?;
            println!("Deleted {id}");
        }
        ObjectsCommand::Batch { file } => {
            let objects: Vec<DataObject> = serde_json::from_str(&read_input(&file)?)
                .context("expected a JSON array of objects")?;
            if objects.is_empty() {
                bail!("no objects to create");
            }

            let results = client.batch_create(&objects).await?;
            let failed: Vec<_> = results.iter().filter(|r| !r.is_success()).collect();
            println!("Created {} of {} objects", results.len() - failed.len(), results.len());
            for result in &failed {
                eprintln!(
                    "  {}: {}",
                    result.id.as_deref().unwrap_or("?"),
                    result.errors().join("; ")
                );
            }
            if !failed.is_empty() {
                bail!("{} objects failed", failed.len());
            }
        }
    }
    Ok(())
}
