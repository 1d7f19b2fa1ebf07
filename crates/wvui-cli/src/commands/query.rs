//! `wvui query` and `wvui search`

use std::path::PathBuf;

use anyhow::bail;
use wvui_core::GraphQlResponse;

use super::{parse_object, read_input};
use crate::App;
use crate::output;

pub async fn run(
    app: &App,
    query: Option<String>,
    file: Option<PathBuf>,
    variables: Option<String>,
) -> anyhow::Result<()> {
    let query = match (query, file) {
        (Some(query), _) => query,
        (None, Some(file)) => read_input(&file)?,
        (None, None) => bail!("a query or --file is required"),
    };
    let variables = variables
        .map(|text| parse_object(&text, "--variables"))
        .transpose()?;

    let response = app.client.graphql_query(&query, variables).await;
    report(&response)
}

pub async fn search(app: &App, text: &str, class: &str, limit: u32) -> anyhow::Result<()> {
    let response = app.client.search_objects(text, class, limit).await;
    report(&response)
}

/// Print the whole envelope; errors make the command fail.
fn report(response: &GraphQlResponse) -> anyhow::Result<()> {
    output::print_json(response)?;
    if let Some(errors) = response.errors.as_ref().filter(|e| !e.is_empty()) {
        bail!(
            "query returned {} error(s): {}",
            errors.len(),
            errors[0].message
        );
    }
    Ok(())
}
