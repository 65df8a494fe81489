//! UI building blocks composed by the app shell.

pub mod connect_dialog;
pub mod gallery;
pub mod mint_dialog;
pub mod toasts;
pub mod token_form;
pub mod toolbar;
