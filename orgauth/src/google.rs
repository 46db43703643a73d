use crate::data::{Config, GoogleClaims};
use crate::error::Error;
use log::{error, info};
use serde_derive::Deserialize;
use serde_json::Value;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Deserialize, Debug)]
struct TokenInfo {
  aud: Option<String>,
  email: Option<String>,
  email_verified: Option<Value>,
  given_name: Option<String>,
  family_name: Option<String>,
  picture: Option<String>,
}

fn is_verified(v: &Option<Value>) -> bool {
  match v {
    Some(Value::Bool(b)) => *b,
    Some(Value::String(s)) => s == "true",
    _ => false,
  }
}

// check a tokeninfo response against our client id.
fn claims_from_tokeninfo(client_id: &str, ti: TokenInfo) -> Result<GoogleClaims, Error> {
  if ti.aud.as_deref() != Some(client_id) {
    return Err(Error::Unauthorized("Invalid ID token".to_string()));
  }
  if !is_verified(&ti.email_verified) {
    return Err(Error::Unauthorized("Google email not verified".to_string()));
  }
  let email = match ti.email {
    Some(e) if !e.is_empty() => e,
    _ => return Err(Error::Unauthorized("Invalid ID token".to_string())),
  };

  let first_name = ti
    .given_name
    .unwrap_or_else(|| email.split('@').next().unwrap_or("").to_string());

  Ok(GoogleClaims {
    email,
    first_name,
    last_name: ti.family_name.unwrap_or_default(),
    picture: ti.picture,
  })
}

pub async fn verify_id_token(config: &Config, id_token: &str) -> Result<GoogleClaims, Error> {
  let client_id = match &config.google_client_id {
    Some(cid) => cid,
    None => return Err(Error::Validation("Google sign-in is not configured".to_string())),
  };

  let client = reqwest::Client::new();
  let resp = client
    .get(TOKENINFO_URL)
    .query(&[("id_token", id_token)])
    .send()
    .await?;

  if !resp.status().is_success() {
    info!("google tokeninfo rejected token: {}", resp.status());
    return Err(Error::Unauthorized("Invalid ID token".to_string()));
  }

  let body = resp.text().await?;
  let ti: TokenInfo = serde_json::from_str(body.as_str()).map_err(|e| {
    error!("bad tokeninfo response: {}", e);
    Error::from(e)
  })?;

  claims_from_tokeninfo(client_id.as_str(), ti)
}
