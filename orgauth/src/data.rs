use serde_derive::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
  pub db: PathBuf,
  pub login_token_expiration_ms: Option<i64>,
  pub google_client_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct User {
  pub id: String,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub phone: Option<String>,
  pub photo_url: Option<String>,
  pub hashwd: String,
  pub salt: String,
  pub createdate: i64,
}

impl User {
  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

// what clients get to see of a user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub id: String,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub phone: Option<String>,
  #[serde(rename = "photoURL")]
  pub photo_url: Option<String>,
  pub created_at: i64,
}

impl From<&User> for UserProfile {
  fn from(u: &User) -> Self {
    UserProfile {
      id: u.id.clone(),
      email: u.email.clone(),
      first_name: u.first_name.clone(),
      last_name: u.last_name.clone(),
      phone: u.phone.clone(),
      photo_url: u.photo_url.clone(),
      created_at: u.createdate,
    }
  }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
  pub email: Option<String>,
  pub password: Option<String>,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default, rename = "photoURL")]
  pub photo_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Login {
  pub email: Option<String>,
  pub password: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLogin {
  #[serde(alias = "credential")]
  pub id_token: Option<String>,
}

// returned from signin and google signin.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  #[serde(rename = "photoURL")]
  pub photo_url: Option<String>,
  pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub phone: Option<String>,
  #[serde(rename = "photoURL")]
  pub photo_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
  #[serde(alias = "currentPassword")]
  pub old_password: Option<String>,
  pub new_password: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccount {
  pub password: Option<String>,
  // google accounts have no usable password; they re-verify with google instead.
  pub id_token: Option<String>,
}

// identity established by a verified google id token.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GoogleClaims {
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub picture: Option<String>,
}

pub enum Credential {
  Password(String),
  Google(GoogleClaims),
}
