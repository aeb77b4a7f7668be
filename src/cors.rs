use std::borrow::Cow;

use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Header, Status},
    Request, Response, Route,
};

use crate::config::Config;

const ALLOWED_METHODS: &str = "GET, POST, HEAD, PUT, DELETE, PATCH";
const DEFAULT_ALLOWED_HEADERS: &str = "Content-Type";

pub fn routes() -> Vec<Route> {
    routes![preflight]
}

/// Answer CORS preflight requests for any path; the headers themselves are
/// added by [`CorsFairing`].
#[options("/<_..>")]
fn preflight() -> Status {
    Status::NoContent
}

/// Decide the `Access-Control-Allow-Origin` value for a request.
///
/// With no configured origins any origin is allowed. Otherwise the request's
/// origin is echoed back if listed, and no header is sent if not.
fn allowed_origin<'a>(allowed: &[String], origin: Option<&'a str>) -> Option<Cow<'a, str>> {
    if allowed.is_empty() {
        return Some(Cow::Borrowed("*"));
    }
    let origin = origin?;
    allowed
        .iter()
        .any(|allowed| allowed == origin)
        .then_some(Cow::Borrowed(origin))
}

/// A fairing that adds CORS headers to every response.
#[derive(Debug, Copy, Clone)]
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let allowed: &[String] = req
            .rocket()
            .state::<Config>()
            .map(Config::cors_origins)
            .unwrap_or_default();
        let origin = req.headers().get_one("Origin");
        let Some(allow_origin) = allowed_origin(allowed, origin) else {
            return;
        };
        if !allowed.is_empty() {
            res.adjoin_header(Header::new("Vary", "Origin"));
        }
        res.set_header(Header::new(
            "Access-Control-Allow-Origin",
            allow_origin.into_owned(),
        ));
        res.set_header(Header::new("Access-Control-Allow-Methods", ALLOWED_METHODS));
        let allow_headers = req
            .headers()
            .get_one("Access-Control-Request-Headers")
            .unwrap_or(DEFAULT_ALLOWED_HEADERS)
            .to_string();
        res.set_header(Header::new("Access-Control-Allow-Headers", allow_headers));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rocket::{http::Method, local::asynchronous::Client};

    #[test]
    fn any_origin_when_unconfigured() {
        assert_eq!(allowed_origin(&[], None).as_deref(), Some("*"));
        assert_eq!(
            allowed_origin(&[], Some("https://evil.example")).as_deref(),
            Some("*")
        );
    }

    #[test]
    fn listed_origins_only() {
        let allowed = vec!["https://app.example".to_string()];
        assert_eq!(
            allowed_origin(&allowed, Some("https://app.example")).as_deref(),
            Some("https://app.example")
        );
        assert_eq!(allowed_origin(&allowed, Some("https://evil.example")), None);
        assert_eq!(allowed_origin(&allowed, None), None);
    }

    #[rocket::async_test]
    async fn preflight_gets_cors_headers() {
        let client = Client::tracked(crate::rocket_base()).await.unwrap();
        let response = client
            .req(Method::Options, "/party/507f1f77bcf86cd799439011/vote")
            .header(Header::new("Origin", "https://app.example"))
            .header(Header::new("Access-Control-Request-Method", "PUT"))
            .header(Header::new(
                "Access-Control-Request-Headers",
                "content-type, authorization",
            ))
            .dispatch()
            .await;
        assert_eq!(Status::NoContent, response.status());
        let headers = response.headers();
        assert_eq!(headers.get_one("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            headers.get_one("Access-Control-Allow-Methods"),
            Some(ALLOWED_METHODS)
        );
        assert_eq!(
            headers.get_one("Access-Control-Allow-Headers"),
            Some("content-type, authorization")
        );
    }
}
