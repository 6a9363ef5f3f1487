pub mod barrel;
pub mod contact;
pub mod entity;
pub mod geometry;
pub mod jump_score;
pub mod monkey;
pub mod player;
pub mod projectile;
pub mod terrain;
