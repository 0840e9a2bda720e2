pub mod add;
pub mod delete;
pub mod lifecycle;
pub mod list;
pub mod show;
pub mod update;
