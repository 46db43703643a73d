#[macro_use]
extern crate serde_derive;

pub mod constants;
pub mod content;
pub mod messages;

// error bodies, and plain acknowledgements.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageReply {
  pub message: String,
}
