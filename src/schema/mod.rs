pub mod npc;
pub mod player;
pub mod twist;
