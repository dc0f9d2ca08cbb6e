/*!
Server-side page rendering.

Templates are compiled into the binary so the server does not depend on the
working directory it is started from. Every page wraps itself in the
`layout` partial, which renders the navigation bar and pending flash messages.
*/
use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;

use crate::error::AppError;

const LAYOUT: &str = include_str!("../templates/layout.hbs");

const PAGES: &[(&str, &str)] = &[
    ("login", include_str!("../templates/login.hbs")),
    ("register", include_str!("../templates/register.hbs")),
    ("index", include_str!("../templates/index.hbs")),
    ("dashboard", include_str!("../templates/dashboard.hbs")),
    ("profile", include_str!("../templates/profile.hbs")),
    ("upload", include_str!("../templates/upload.hbs")),
    ("about", include_str!("../templates/about.hbs")),
];

pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, AppError> {
        let mut registry = Handlebars::new();

        registry
            .register_partial("layout", LAYOUT)
            .map_err(|e| AppError::InternalServerError(format!("layout template: {}", e)))?;

        for (name, source) in PAGES {
            registry
                .register_template_string(name, source)
                .map_err(|e| AppError::InternalServerError(format!("template {}: {}", name, e)))?;
        }

        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<Html<String>, AppError> {
        Ok(Html(self.registry.render(name, data)?))
    }
}
