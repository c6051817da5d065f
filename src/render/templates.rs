//! Embedded HTML templates and stylesheet.

use minijinja::{context, AutoEscape, Environment, Error};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::error;

use crate::environment::build_info;
use crate::TARGET_RENDER;

/// Served at `/static/app.css`.
pub const STYLESHEET: &str = include_str!("../../static/app.css");

const TEMPLATES: [(&str, &str); 4] = [
    ("layout.html", include_str!("../../templates/layout.html")),
    ("listing.html", include_str!("../../templates/listing.html")),
    ("detail.html", include_str!("../../templates/detail.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();

    env.set_auto_escape_callback(|name| {
        if name.ends_with(".html") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });
    env.add_global("build", build_info());

    for (name, source) in TEMPLATES {
        if let Err(err) = env.add_template(name, source) {
            error!(target: TARGET_RENDER, "Failed to load template {}: {}", name, err);
        }
    }

    env
});

pub fn render_template<T: Serialize>(name: &str, ctx: T) -> Result<String, Error> {
    ENV.get_template(name)?.render(ctx)
}

pub fn render_error_page(status: u16, headline: &str, message: &str) -> Result<String, Error> {
    render_template(
        "error.html",
        context! { status => status, headline => headline, message => message },
    )
}
