pub mod client;
pub mod environment;
pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod render;
pub mod view_state;
pub mod web;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_RENDER: &str = "render";
pub const TARGET_HTTP: &str = "http";
