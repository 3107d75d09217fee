//! Category command implementations

use anyhow::{Context, Result};
use tally_core::validation::CategoryForm;

use super::{api_error, form_error, App};
use crate::views;

pub async fn cmd_categories_list(app: &App) -> Result<()> {
    app.require_login()?;
    let categories = app
        .services
        .categories
        .list()
        .await
        .map_err(api_error)
        .context("Failed to load categories")?;

    println!();
    print!("{}", views::render_categories(&categories));
    Ok(())
}

pub async fn cmd_categories_add(
    app: &App,
    name: &str,
    color: Option<&str>,
    icon: Option<&str>,
) -> Result<()> {
    app.require_login()?;
    let form = CategoryForm {
        name: name.to_string(),
        color: color.unwrap_or_default().to_string(),
        icon: icon.unwrap_or_default().to_string(),
    };
    let request = form.validate().map_err(form_error)?;

    let category = app
        .services
        .categories
        .create(&request)
        .await
        .map_err(api_error)?;

    println!("✅ Created category {} (#{})", category.name, category.id);
    cmd_categories_list(app).await
}
