pub mod backlog;
pub mod inventory;
pub mod month;
pub mod trial;
