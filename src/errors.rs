use std::io::Cursor;

use error_chain::error_chain;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Json(::serde_json::Error);
    }

    errors {
        KeyNotFound(path: String) {
            display("key file not found: {}", path)
        }
        MalformedKey {
            display("key material could not be parsed")
        }
        InvalidSeedLength(len: usize) {
            display("seed must be exactly 32 bytes, got {}", len)
        }
        NonceGenerationFailure {
            display("entropy source failed while generating a nonce")
        }
        TransportTimeout {
            display("request to the verification endpoint timed out")
        }
        TransportError(detail: String) {
            display("transport failure: {}", detail)
        }
    }
}

// Render errors as a JSON failure body. Release builds get an opaque
// message; debug builds see the whole chain.
impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut rslt = String::new();

        #[cfg(debug_assertions)]
        {
            rslt += &format!("Error: {}", self);
            for ce in self.iter().skip(1) {
                rslt += &format!(", caused by: {}", ce);
            }
        }

        #[cfg(not(debug_assertions))]
        {
            rslt += "request failed";
        }

        let resp = serde_json::json!({
            "status": "failure",
            "message": rslt,
        })
        .to_string();

        Response::build()
            .status(Status::BadRequest)
            .header(ContentType::JSON)
            .sized_body(resp.len(), Cursor::new(resp))
            .ok()
    }
}
