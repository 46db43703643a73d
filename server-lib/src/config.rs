use orgauth::data as orgauth_data;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
  pub ip: String,
  pub port: u16,
  pub mainsite: String,
  pub altmainsite: Vec<String>,
  pub orgauth_config: orgauth_data::Config,
}
