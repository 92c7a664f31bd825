//! HTML templates, compiled into the binary and loaded once.

use once_cell::sync::OnceCell;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::DataTableError;

pub const PAGE_TEMPLATE: &str = "page.html";
pub const TABLE_TEMPLATE: &str = "table.html";

static TEMPLATES: OnceCell<Tera> = OnceCell::new();

fn engine() -> Result<&'static Tera, DataTableError> {
    TEMPLATES.get_or_try_init(|| {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_templates(vec![
            (PAGE_TEMPLATE, include_str!("../templates/page.html")),
            (TABLE_TEMPLATE, include_str!("../templates/table.html")),
        ])?;
        Ok(tera)
    })
}

/// Renders `name` with the fields of `context`. Values are HTML-escaped unless the
/// template marks them `safe`.
pub fn render<C: Serialize>(name: &str, context: &C) -> Result<String, DataTableError> {
    let context = Context::from_serialize(context)?;
    Ok(engine()?.render(name, &context)?)
}
