use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::SignedCookieJar;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::app::AppState;
use crate::auth::models::AuthenticatedUser;
use crate::db::models::Article;
use crate::db::repository::ArticleRepository;
use crate::error::AppError;
use crate::flash::{self, Level};
use crate::forms::{ArticleForm, FormErrors};
use crate::rendering::templates::{page_context, render};

const LIST_URL: &str = "/articles/";

const ADD_TIP: &str = "Fill in the following form to create a new article.";
const CHANGE_TIP: &str = "The following is the current setting. \
    Please fill in the part you want to modify and then submit.";

/// Content longer than this many characters is shortened in the listing.
const PREVIEW_MAX_CHARS: usize = 50;
/// Characters kept from shortened content, before the `..` marker.
const PREVIEW_KEEP_CHARS: usize = 48;

/// Shorten `content` for the listing. Counts Unicode scalar values, not bytes.
pub fn truncate_for_display(content: &str) -> String {
    if content.chars().count() > PREVIEW_MAX_CHARS {
        let mut preview: String = content.chars().take(PREVIEW_KEEP_CHARS).collect();
        preview.push_str("..");
        preview
    } else {
        content.to_string()
    }
}

/// One article as shown in the listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRow {
    pub id: String,
    pub name: String,
    /// Display-only, possibly truncated.
    pub content: String,
    pub hash: String,
    pub from_url: Option<String>,
    pub recommendation: bool,
    pub project: String,
    pub created_at: String,
}

impl From<&Article> for ArticleRow {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.to_hex(),
            name: article.name.clone(),
            content: truncate_for_display(&article.content),
            hash: article.hash.clone(),
            from_url: article.from_url.clone(),
            recommendation: article.recommendation,
            project: article.project.clone().unwrap_or_default(),
            created_at: article.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Result of processing a create or change submission.
#[derive(Debug)]
pub enum FormOutcome {
    Saved(Article),
    Invalid(FormErrors),
}

/// All articles owned by `owner`, prepared for display.
pub async fn list_owned(
    repo: &dyn ArticleRepository,
    owner: &str,
) -> Result<Vec<ArticleRow>, AppError> {
    let articles = repo.list_by_owner(owner).await?;
    Ok(articles.iter().map(ArticleRow::from).collect())
}

/// Validate a creation form and persist the new article.
pub async fn process_create(
    repo: &dyn ArticleRepository,
    owner: &str,
    form: &ArticleForm,
) -> Result<FormOutcome, AppError> {
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => return Ok(FormOutcome::Invalid(errors)),
    };

    let article = Article::create(fields, owner);
    repo.insert(article.clone()).await?;

    tracing::info!(article_id = %article.id, owner, "Article created");
    Ok(FormOutcome::Saved(article))
}

/// Load the article `raw_id` if it belongs to `owner`.
///
/// Malformed, missing and foreign ids are all reported as not found.
pub async fn find_owned_or_404(
    repo: &dyn ArticleRepository,
    owner: &str,
    raw_id: &str,
) -> Result<Article, AppError> {
    let not_found = || AppError::NotFound("Article not found".into());

    let id = ObjectId::parse_str(raw_id).map_err(|_| not_found())?;
    repo.find_owned(&id, owner).await?.ok_or_else(not_found)
}

/// Validate a change form against the stored article and persist it.
pub async fn process_change(
    repo: &dyn ArticleRepository,
    owner: &str,
    raw_id: &str,
    form: &ArticleForm,
    refresh_hash: bool,
) -> Result<FormOutcome, AppError> {
    let mut article = find_owned_or_404(repo, owner, raw_id).await?;

    let fields = match form.validate_change(&article) {
        Ok(fields) => fields,
        Err(errors) => return Ok(FormOutcome::Invalid(errors)),
    };

    article.apply(fields);
    if refresh_hash {
        article.refresh_hash();
    }

    // the article may have been deleted since it was loaded
    if !repo.update(&article).await? {
        return Err(AppError::NotFound("Article not found".into()));
    }

    tracing::info!(article_id = %article.id, owner, "Article changed");
    Ok(FormOutcome::Saved(article))
}

/// Delete the article `raw_id` if it belongs to `owner`.
pub async fn process_delete(
    repo: &dyn ArticleRepository,
    owner: &str,
    raw_id: &str,
) -> Result<(), AppError> {
    let article = find_owned_or_404(repo, owner, raw_id).await?;

    if !repo.delete_owned(&article.id, owner).await? {
        return Err(AppError::NotFound("Article not found".into()));
    }

    tracing::info!(article_id = %article.id, owner, "Article deleted");
    Ok(())
}

/// Everything needed to render one of the article form pages.
struct FormPage<'a> {
    template: &'a str,
    action: String,
    submit_label: &'a str,
    form: &'a ArticleForm,
    errors: &'a FormErrors,
    tips: &'a [&'a str],
}

fn render_form_page(
    state: &AppState,
    jar: SignedCookieJar,
    user: &AuthenticatedUser,
    page: FormPage<'_>,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let (jar, messages) = flash::take(jar);

    let mut context = page_context(Some(user), &messages, page.tips);
    context.insert("action", &page.action);
    context.insert("submit_label", page.submit_label);
    context.insert("form", page.form);
    context.insert("errors", page.errors);

    Ok((jar, render(&state.templates, page.template, &context)?))
}

fn change_action(raw_id: &str) -> String {
    format!("/articles/{raw_id}/change/")
}

/// `GET /articles/` — the requester's articles.
pub async fn change_list_handler(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let articles = list_owned(state.article_repo.as_ref(), &user.user_id).await?;
    let (jar, messages) = flash::take(jar);

    let mut context = page_context(Some(&user), &messages, &[]);
    context.insert("articles", &articles);

    Ok((jar, render(&state.templates, "articles/change_list.html", &context)?))
}

/// `GET /articles/add/` — empty creation form.
pub async fn add_page_handler(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    render_form_page(
        &state,
        jar,
        &user,
        FormPage {
            template: "articles/add.html",
            action: "/articles/add/".to_string(),
            submit_label: "Save",
            form: &ArticleForm::default(),
            errors: &FormErrors::default(),
            tips: &[ADD_TIP],
        },
    )
}

/// `POST /articles/add/`
pub async fn add_handler(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ArticleForm>,
) -> Result<Response, AppError> {
    match process_create(state.article_repo.as_ref(), &user.user_id, &form).await? {
        FormOutcome::Saved(_) => {
            let jar = flash::push(jar, Level::Success, "Added successfully.")?;
            Ok((jar, Redirect::to(LIST_URL)).into_response())
        }
        FormOutcome::Invalid(errors) => Ok(render_form_page(
            &state,
            jar,
            &user,
            FormPage {
                template: "articles/add.html",
                action: "/articles/add/".to_string(),
                submit_label: "Save",
                form: &form,
                errors: &errors,
                tips: &[],
            },
        )?
        .into_response()),
    }
}

/// `GET /articles/{id}/change/` — form pre-populated with the stored values.
pub async fn change_page_handler(
    user: AuthenticatedUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let article = find_owned_or_404(state.article_repo.as_ref(), &user.user_id, &id).await?;

    render_form_page(
        &state,
        jar,
        &user,
        FormPage {
            template: "articles/change.html",
            action: change_action(&id),
            submit_label: "Save changes",
            form: &ArticleForm::from(&article),
            errors: &FormErrors::default(),
            tips: &[CHANGE_TIP],
        },
    )
}

/// `POST /articles/{id}/change/`
pub async fn change_handler(
    user: AuthenticatedUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ArticleForm>,
) -> Result<Response, AppError> {
    let outcome = process_change(
        state.article_repo.as_ref(),
        &user.user_id,
        &id,
        &form,
        state.refresh_hash_on_edit,
    )
    .await?;

    match outcome {
        FormOutcome::Saved(_) => {
            let jar = flash::push(jar, Level::Success, "Changed successfully.")?;
            Ok((jar, Redirect::to(LIST_URL)).into_response())
        }
        FormOutcome::Invalid(errors) => Ok(render_form_page(
            &state,
            jar,
            &user,
            FormPage {
                template: "articles/change.html",
                action: change_action(&id),
                submit_label: "Save changes",
                form: &form,
                errors: &errors,
                tips: &[],
            },
        )?
        .into_response()),
    }
}

/// `GET /articles/{id}/delete/` — confirmation page, no side effect.
pub async fn delete_page_handler(
    user: AuthenticatedUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let article = find_owned_or_404(state.article_repo.as_ref(), &user.user_id, &id).await?;
    let (jar, messages) = flash::take(jar);

    let mut context = page_context(Some(&user), &messages, &[]);
    context.insert("article", &ArticleRow::from(&article));

    Ok((jar, render(&state.templates, "articles/delete.html", &context)?))
}

/// `POST /articles/{id}/delete/`
pub async fn delete_handler(
    user: AuthenticatedUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    process_delete(state.article_repo.as_ref(), &user.user_id, &id).await?;

    let jar = flash::push(jar, Level::Success, "Deleted successfully.")?;
    Ok((jar, Redirect::to(LIST_URL)))
}
