pub mod routes;

pub use routes::state::AppState;
pub use routes::users;
