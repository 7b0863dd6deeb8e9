use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::api::types::*;
use crate::envelope::SignedEnvelope;
use crate::errors as echain;
use crate::verify::Verifier;

#[get("/hello", format = "application/json")]
pub fn hello() -> Result<Json<String>, echain::Error> {
    Ok(Json("Hello!".into()))
}

#[post("/verify", format = "application/json", data = "<envelope>")]
pub fn verify(
    envelope: Json<SignedEnvelope>,
    verifier: &State<Verifier>,
) -> Result<Custom<Json<VerifyResponse>>, echain::Error> {
    let result = verifier.verify(&envelope)?;

    // 2xx means accepted; every validation failure is a 401 with the reason
    let status = if result.is_valid() {
        Status::Ok
    } else {
        Status::Unauthorized
    };

    Ok(Custom(status, Json(result.into())))
}

#[get("/key", format = "application/json")]
pub fn key(verifier: &State<Verifier>) -> Json<KeyResponse> {
    Json(KeyResponse {
        public_key: verifier.public_key_base64().to_owned(),
    })
}
