/// Twist catalog: the ordered, immutable list of per-loop re-skins.

use rand::Rng;
use rustc_hash::FxHashSet;
use std::path::Path;
use thiserror::Error;

use crate::schema::twist::{Role, Twist};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("twist catalog is empty")]
    Empty,
    #[error("duplicate twist id '{0}'")]
    DuplicateTwist(String),
    #[error("twist '{twist}' assigns npc id '{npc_id}' to more than one role")]
    DuplicateNpcId { twist: String, npc_id: String },
    #[error("loop numbers start at 1, got {0}")]
    LoopOutOfRange(u32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Ordered twist definitions. Loop `n` maps to entry `(n - 1) mod len`.
#[derive(Debug, Clone)]
pub struct TwistCatalog {
    twists: Vec<Twist>,
}

impl TwistCatalog {
    /// Build a catalog, rejecting empty lists and ambiguous NPC ids.
    pub fn from_twists(twists: Vec<Twist>) -> Result<TwistCatalog, CatalogError> {
        if twists.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = FxHashSet::default();
        for twist in &twists {
            if !seen.insert(twist.id.as_str()) {
                return Err(CatalogError::DuplicateTwist(twist.id.clone()));
            }

            let mut npc_ids = FxHashSet::default();
            for role in Role::ALL {
                let id = &twist.npc_assignments.for_role(role).id;
                if !npc_ids.insert(id.as_str()) {
                    return Err(CatalogError::DuplicateNpcId {
                        twist: twist.id.clone(),
                        npc_id: id.clone(),
                    });
                }
            }
        }

        Ok(TwistCatalog { twists })
    }

    /// Load a catalog from a RON file holding a list of twists.
    pub fn load_from_ron(path: &Path) -> Result<TwistCatalog, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<TwistCatalog, CatalogError> {
        let twists: Vec<Twist> = ron::from_str(input)?;
        Self::from_twists(twists)
    }

    pub fn twists(&self) -> &[Twist] {
        &self.twists
    }

    pub fn len(&self) -> usize {
        self.twists.len()
    }

    /// Always false for a constructed catalog; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.twists.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Twist> {
        self.twists.iter().find(|twist| twist.id == id)
    }

    /// Deterministic, cyclic lookup by loop number.
    pub fn twist_for_loop(&self, loop_number: u32) -> Result<&Twist, CatalogError> {
        if loop_number == 0 {
            return Err(CatalogError::LoopOutOfRange(loop_number));
        }
        let index = (loop_number as usize - 1) % self.twists.len();
        Ok(&self.twists[index])
    }

    /// Uniform pick, for previews outside the main loop.
    pub fn random_twist<R: Rng + ?Sized>(&self, rng: &mut R) -> &Twist {
        &self.twists[rng.gen_range(0..self.twists.len())]
    }
}
