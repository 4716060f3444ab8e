//! Form rules checked before anything is sent to the server.

use std::collections::BTreeMap;

use reqwest::Url;
use thiserror::Error;

use crate::data_formats::{ArticlePayload, LoginRequest, RegisterRequest};

/// Field-scoped validation messages, keyed by the form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", describe(.fields))]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    fn check<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// `field: message` pairs joined with `; `.
fn describe(fields: &BTreeMap<&'static str, Vec<String>>) -> String {
    fields
        .iter()
        .flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| format!("{}: {}", field, message))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn min_chars(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    min: usize,
    message: &str,
) {
    if value.chars().count() < min {
        errors.add(field, message);
    }
}

/// Absolute http(s) URL with a host.
pub fn is_web_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Raw article form input. `category` is the selected option value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleForm {
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
    pub category: String,
}

impl ArticleForm {
    pub fn validate(&self, mode: FormMode) -> Result<ArticlePayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let (title_min, description_min, url_message) = match mode {
            FormMode::Create => (3, 5, "Invalid URL"),
            FormMode::Edit => (1, 1, "Must be a valid image URL"),
        };
        min_chars(&mut errors, "title", &self.title, title_min, "Title is required");
        min_chars(
            &mut errors,
            "description",
            &self.description,
            description_min,
            "Description is required",
        );
        if !is_web_url(&self.cover_image_url) {
            errors.add("cover_image_url", url_message);
        }
        let category = self.category.trim();
        let parsed = category.parse::<i64>().ok().filter(|id| *id > 0);
        if parsed.is_none() {
            let message = match mode {
                FormMode::Create => "Category is required",
                FormMode::Edit => "Category must be a number",
            };
            errors.add("category", message);
        }
        errors.check(|| ArticlePayload {
            title: self.title.clone(),
            description: self.description.clone(),
            cover_image_url: self.cover_image_url.clone(),
            category: parsed.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        min_chars(
            &mut errors,
            "identifier",
            &self.identifier,
            3,
            "Email or username is required",
        );
        min_chars(
            &mut errors,
            "password",
            &self.password,
            6,
            "Password must be at least 6 characters",
        );
        errors.check(|| LoginRequest {
            identifier: self.identifier.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        min_chars(
            &mut errors,
            "username",
            &self.username,
            3,
            "Username must be at least 3 characters",
        );
        if !is_email(&self.email) {
            errors.add("email", "Invalid email");
        }
        min_chars(
            &mut errors,
            "password",
            &self.password,
            6,
            "Password must be at least 6 characters",
        );
        errors.check(|| RegisterRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

/// Home page search input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    pub title: Option<String>,
    pub category: Option<String>,
}

pub const MAX_FILTER_TITLE_CHARS: usize = 100;

impl FilterForm {
    /// Returns the `(title, category name)` filters, blank entries dropped.
    pub fn validate(&self) -> Result<(Option<String>, Option<String>), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            if title.chars().count() > MAX_FILTER_TITLE_CHARS {
                errors.add("title", "Title is too long");
            }
        }
        let keep = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());
        errors.check(|| (keep(&self.title), keep(&self.category)))
    }
}
