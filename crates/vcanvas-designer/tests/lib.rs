#![allow(dead_code)]

#[path = "designer/documents.rs"]
mod documents;
#[path = "designer/geometry_laws.rs"]
mod geometry_laws;
#[path = "designer/history_engine.rs"]
mod history_engine;
#[path = "designer/render_service.rs"]
mod render_service;
#[path = "designer/selection_engine.rs"]
mod selection_engine;
