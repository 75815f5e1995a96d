use axum::http::HeaderMap;
use serde_json::{Map, Value};

/// Raw, untyped form body as sent by the browser.
pub type RawForm = Map<String, Value>;

#[derive(Debug)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid request body: {}", self.0)
    }
}

/// Parse a submission body according to its Content-Type.
pub async fn parse(headers: &HeaderMap, body: bytes::Bytes) -> Result<RawForm, ParseError> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json");

    if content_type.contains("multipart/form-data") {
        parse_multipart(content_type, body).await
    } else if content_type.contains("application/x-www-form-urlencoded") {
        Ok(parse_form_urlencoded(&body))
    } else {
        parse_json(&body)
    }
}

fn parse_json(body: &[u8]) -> Result<RawForm, ParseError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ParseError("expected a JSON object".to_string())),
        Err(e) => Err(ParseError(format!("invalid JSON: {e}"))),
    }
}

fn parse_form_urlencoded(body: &[u8]) -> RawForm {
    form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

async fn parse_multipart(content_type: &str, body: bytes::Bytes) -> Result<RawForm, ParseError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| ParseError("missing multipart boundary".to_string()))?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut map = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ParseError(format!("multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| ParseError(format!("field read error: {e}")))?;
        map.insert(name, Value::String(value));
    }

    Ok(map)
}
