pub mod state;
pub mod users;
