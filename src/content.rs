/// Built-in game content and directory overrides.
///
/// The shipped RON files are compiled into the crate; a content directory
/// may replace the twist catalog or the dialogue script, and extend the
/// conversation templates.

use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::core::catalog::{CatalogError, TwistCatalog};
use crate::core::script::{DialogueScript, ScriptError};
use crate::core::templates::{TemplateError, TemplateStore};

pub const BUILTIN_TWISTS: &str = include_str!("../content/twists.ron");
pub const BUILTIN_CONVERSATIONS: &str = include_str!("../content/conversations.ron");
pub const BUILTIN_SCRIPT: &str = include_str!("../content/script.ron");

pub const TWISTS_FILE: &str = "twists.ron";
pub const CONVERSATIONS_FILE: &str = "conversations.ron";
pub const SCRIPT_FILE: &str = "script.ron";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("twists: {0}")]
    Catalog(#[from] CatalogError),
    #[error("conversations: {0}")]
    Templates(#[from] TemplateError),
    #[error("script: {0}")]
    Script(#[from] ScriptError),
    #[error("content directory not found: {0}")]
    MissingDir(String),
}

/// Everything the assembler needs to build a loop's NPCs.
#[derive(Debug, Clone)]
pub struct Content {
    pub catalog: TwistCatalog,
    pub templates: TemplateStore,
    pub script: DialogueScript,
}

impl Content {
    pub fn builtin() -> Result<Content, ContentError> {
        Ok(Content {
            catalog: TwistCatalog::parse_ron(BUILTIN_TWISTS)?,
            templates: TemplateStore::parse_ron(BUILTIN_CONVERSATIONS)?,
            script: DialogueScript::parse_ron(BUILTIN_SCRIPT)?,
        })
    }

    /// Built-in content with whatever files `dir` provides layered on top.
    pub fn load_from_dir(dir: &Path) -> Result<Content, ContentError> {
        let mut content = Self::builtin()?;
        content.apply_dir(dir)?;
        Ok(content)
    }

    /// Layer a content directory over this content. Missing files keep the
    /// current value.
    pub fn apply_dir(&mut self, dir: &Path) -> Result<(), ContentError> {
        if !dir.is_dir() {
            return Err(ContentError::MissingDir(dir.display().to_string()));
        }

        let twists = dir.join(TWISTS_FILE);
        if twists.exists() {
            self.catalog = TwistCatalog::load_from_ron(&twists)?;
            info!(path = %twists.display(), twists = self.catalog.len(), "loaded twist catalog");
        }

        let conversations = dir.join(CONVERSATIONS_FILE);
        if conversations.exists() {
            self.templates.merge(TemplateStore::load_from_ron(&conversations)?);
            info!(path = %conversations.display(), "merged conversation templates");
        }

        let script = dir.join(SCRIPT_FILE);
        if script.exists() {
            self.script = DialogueScript::load_from_ron(&script)?;
            info!(path = %script.display(), "loaded dialogue script");
        }

        Ok(())
    }
}
