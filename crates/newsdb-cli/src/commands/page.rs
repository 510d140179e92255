//! Page and page group command handlers

use anyhow::{bail, Context, Result};

use newsdb_core::NewsDatabase;

use crate::output::{Output, PageTree};

/// List the top-level pages of a newspaper with their child pages
pub fn list(db: &NewsDatabase, newspaper_id: i64, output: &Output) -> Result<()> {
    if db.newspaper_dao().find_by_id(newspaper_id)?.is_none() {
        bail!("Newspaper not found: {}", newspaper_id);
    }

    let dao = db.page_dao();
    let top_pages = dao
        .find_top_pages(newspaper_id)
        .context("Failed to load pages")?;

    let mut trees = Vec::with_capacity(top_pages.len());
    for page in top_pages {
        let children = if page.has_child {
            dao.find_child_pages(page.id)
                .with_context(|| format!("Failed to load child pages of {}", page.id))?
        } else {
            Vec::new()
        };
        trees.push(PageTree { page, children });
    }

    output.print_page_trees(&trees);
    Ok(())
}

/// List page groups, or the pages of one group
pub fn groups(db: &NewsDatabase, name: Option<String>, output: &Output) -> Result<()> {
    let dao = db.page_dao();

    match name {
        None => {
            let groups = dao
                .find_all_page_groups()
                .context("Failed to load page groups")?;
            output.print_page_groups(&groups);
        }
        Some(name) => {
            if dao.find_page_group(&name)?.is_none() {
                bail!("Page group not found: {}", name);
            }
            let pages = dao
                .find_pages_for_group(&name)
                .with_context(|| format!("Failed to load pages of group '{}'", name))?;
            output.print_pages(&pages);
        }
    }

    Ok(())
}
