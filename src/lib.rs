#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod code_view;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod export;
pub mod file_handler;
pub mod history;
pub mod layer;
pub mod optimize;
pub mod panels;
pub mod property;
pub mod selection;
pub mod studio;
pub mod svg;
pub mod tools;
pub mod util;
pub mod view;

pub use app::StudioApp;
pub use config::StudioConfig;
pub use document::{DocumentId, DocumentStore};
pub use error::{EditorError, EditorResult};
pub use event::{EditorEvent, EventBus, Topic};
pub use history::HistoryEngine;
pub use layer::{LayerId, LayerIndex};
pub use studio::Studio;
