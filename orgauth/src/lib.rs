extern crate serde_derive;

pub mod data;
pub mod dbfun;
pub mod endpoints;
pub mod error;
pub mod google;
pub mod migrations;
pub mod util;
