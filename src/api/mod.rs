use rocket::Route;

mod common;
mod party;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(party::routes());
    routes.extend(crate::cors::routes());
    routes
}
