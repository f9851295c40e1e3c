//! Game save and container formats.

pub mod alttp;
pub mod minish_cap;
pub mod skyward_sword;
pub mod sprite;
pub mod zquest;

pub use alttp::AlttpFile;
pub use minish_cap::MinishCapFile;
pub use skyward_sword::SkywardSwordFile;
pub use sprite::SpriteFile;
pub use zquest::ZQuestFile;
