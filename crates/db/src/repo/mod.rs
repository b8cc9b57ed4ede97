pub mod tracked_items;
pub mod users;
