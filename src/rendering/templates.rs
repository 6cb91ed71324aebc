use axum::response::Html;
use tera::{Context, Tera};

use crate::auth::models::AuthenticatedUser;
use crate::error::AppError;
use crate::flash::FlashMessage;

/// Templates are compiled into the binary so the server has no runtime
/// dependency on its working directory.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("auth/login.html", include_str!("../../templates/auth/login.html")),
    (
        "articles/form.html",
        include_str!("../../templates/articles/form.html"),
    ),
    (
        "articles/change_list.html",
        include_str!("../../templates/articles/change_list.html"),
    ),
    (
        "articles/add.html",
        include_str!("../../templates/articles/add.html"),
    ),
    (
        "articles/change.html",
        include_str!("../../templates/articles/change.html"),
    ),
    (
        "articles/delete.html",
        include_str!("../../templates/articles/delete.html"),
    ),
];

/// Build the template engine. HTML autoescaping is on for every template.
pub fn load_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.to_vec())?;
    Ok(tera)
}

/// Context shared by every page: the current user, pending notifications and hints.
pub fn page_context(
    user: Option<&AuthenticatedUser>,
    messages: &[FlashMessage],
    tips: &[&str],
) -> Context {
    let mut context = Context::new();
    context.insert("user", &user);
    context.insert("messages", messages);
    context.insert("tips", tips);
    context
}

pub fn render(tera: &Tera, name: &str, context: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(tera.render(name, context)?))
}
