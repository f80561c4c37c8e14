pub mod auth;
pub mod bookings;
pub mod equipment;
pub mod error;
pub mod health;
pub mod middleware;
pub mod notifications;
pub mod reports;
pub mod reviews;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, AppStateInner};
