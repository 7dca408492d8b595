pub mod assembler;
pub mod catalog;
pub mod config;
pub mod game;
pub mod hud;
pub mod machine;
pub mod navigation;
pub mod persistence;
pub mod resolver;
pub mod script;
pub mod style;
pub mod templates;
