mod feed;
mod health;
mod routes;
mod search;
mod votes;

pub use feed::top_routes;
pub use health::health_check;
pub use routes::{get_route, publish_route};
pub use search::{search_route, search_sequence};
pub use votes::vote;
