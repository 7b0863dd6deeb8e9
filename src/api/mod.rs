use rocket::{routes, Build, Rocket};

use crate::verify::Verifier;

pub mod endpoints;
pub mod types;

pub fn setup_rocket(verifier: Verifier) -> Rocket<Build> {
    rocket::build()
        .mount(
            "/api/v1/",
            routes![endpoints::hello, endpoints::verify, endpoints::key],
        )
        .manage(verifier)
}
