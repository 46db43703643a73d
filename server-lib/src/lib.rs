pub mod comments;
pub mod config;
pub mod error;
pub mod interfaces;
mod migrations;
pub mod notifications;
pub mod plans;
pub mod posts;
pub mod progress;
pub mod reactions;
pub mod sqldata;
mod sqltest;
pub mod state;
pub mod templates;
#[cfg(test)]
mod webtest;
use crate::{error as sperr, state::State};
use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpServer};
use clap::Arg;
use config::Config;
use log::{error, info};
pub use orgauth;
use orgauth::util;
pub use rusqlite;
use std::env;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
pub use spprotocol;
use timer;
use tracing_actix_web::TracingLogger;

pub fn defcon() -> Config {
  let oc = orgauth::data::Config {
    db: PathBuf::from("./studyplan.db"),
    login_token_expiration_ms: Some(7 * 24 * 60 * 60 * 1000), // 7 days in milliseconds
    google_client_id: None,
  };
  Config {
    ip: "127.0.0.1".to_string(),
    port: 8000,
    mainsite: "http://localhost:3000".to_string(),
    altmainsite: [].to_vec(),
    orgauth_config: oc,
  }
}

pub fn load_config(filename: &str) -> Result<Config, Box<dyn Error>> {
  info!("loading config: {}", filename);
  let c = toml::from_str(
    util::load_string(filename)
      .map_err(|e| {
        sperr::annotate_string(
          format!("failed to load config: '{}'", filename),
          sperr::Error::String(e.to_string()),
        )
      })?
      .as_str(),
  )?;
  Ok(c)
}

#[actix_web::main]
pub async fn err_main(
  oconfig: Option<Config>,
  logfile: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
  match logfile {
    Some(lf) => {
      let target = Box::new(File::create(lf)?);
      env_logger::Builder::new()
        .target(env_logger::Target::Pipe(target))
        .filter(None, log::LevelFilter::Debug)
        .init();
    }
    None => env_logger::init(),
  };

  let matches = clap::App::new("studyplan server")
    .version("1.0")
    .about("learning plans, posts, and comments web server")
    .arg(
      Arg::with_name("config")
        .short("c")
        .long("config")
        .value_name("FILE")
        .help("specify config file")
        .takes_value(true),
    )
    .arg(
      Arg::with_name("write_config")
        .short("w")
        .long("write_config")
        .value_name("FILE")
        .help("write default config file")
        .takes_value(true),
    )
    .get_matches();

  // writing a config file?
  if let Some(filename) = matches.value_of("write_config") {
    util::write_string(filename, toml::to_string_pretty(&defcon())?.as_str())?;
    info!("default config written to file: {}", filename);
    return Ok(());
  }

  // specifying a config file?  otherwise try to load the default.
  let mut config = match oconfig {
    Some(c) => c,
    None => match matches.value_of("config") {
      Some(filename) => load_config(filename)?,
      None => load_config("config.toml")?,
    },
  };

  if let Ok(db) = env::var("STUDYPLAN_DB") {
    config.orgauth_config.db = PathBuf::from(db);
  }

  // dropping the guard cancels the purge, so both live as long as the server.
  let (_timer, _guard) = schedule_token_purge(&config);

  let server = init_server(config).await?;
  server.await?;

  Ok(())
}

pub fn schedule_token_purge(config: &Config) -> (timer::Timer, timer::Guard) {
  let timer = timer::Timer::new();

  let ptconfig = config.clone();

  let guard = timer.schedule_repeating(chrono::Duration::days(1), move || {
    match sqldata::purge_tokens(&ptconfig.orgauth_config) {
      Err(e) => error!("purge_tokens error: {}", e),
      Ok(_) => (),
    }
  });

  (timer, guard)
}

pub async fn init_server(config: Config) -> Result<Server, Box<dyn Error>> {
  info!("server init!");

  info!("config parameters:\n\n{}", toml::to_string_pretty(&config)?);

  sqldata::dbinit(
    config.orgauth_config.db.as_path(),
    config.orgauth_config.login_token_expiration_ms,
  )?;

  let state = web::Data::new(State {
    config: config.clone(),
  });

  let c = config.clone();
  let server = HttpServer::new(move || {
    let d = c.clone();
    let cors = Cors::default()
      .allowed_origin_fn(move |rv, rh| {
        if *rv == d.mainsite {
          true
        } else if d.altmainsite.iter().any(|am| *rv == am) {
          true
        } else {
          info!("cors denied: {:?}, {:?}", rv, rh);
          false
        }
      })
      .allow_any_header()
      .allow_any_method()
      .max_age(3600);

    App::new()
      .app_data(state.clone())
      .wrap(cors)
      .wrap(TracingLogger::default())
      .configure(interfaces::configure)
  })
  .bind(format!("{}:{}", config.ip, config.port))?
  .run();

  Ok(server)
}
