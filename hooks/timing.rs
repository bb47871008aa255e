//! Stamps `x-response-time` on every dispatched response.

use std::time::Instant;

use axum::http::HeaderValue;

use thunder_dispatch::hooks::{post_fn, pre_fn, Hook};
use thunder_dispatch::http::{Request, Response};

#[derive(Debug, Clone, Copy)]
struct Started(Instant);

pub fn hook() -> Hook {
    Hook::new("timing")
        .with_pre(pre_fn(|_scope, req: &mut Request| {
            req.extensions_mut().insert(Started(Instant::now()));
            Ok(None)
        }))
        .with_post(post_fn(|_scope, req: &mut Request, res: &mut Response| {
            if let Some(Started(at)) = req.extensions().get::<Started>().copied() {
                let millis = at.elapsed().as_secs_f64() * 1000.0;
                if let Ok(value) = HeaderValue::from_str(&format!("{millis:.3}ms")) {
                    res.headers_mut().insert("x-response-time", value);
                }
            }
            Ok(None)
        }))
}
