use barrel::backend::Sqlite;
use barrel::{types, Migration};
use crate::error::Error;
use rusqlite::Connection;
use std::path::Path;

pub fn udpate1(dbfile: &Path) -> Result<(), Error> {
  let conn = Connection::open(dbfile)?;
  let mut m = Migration::new();

  m.create_table("orgauth_user", |t| {
    t.add_column("id", types::text().primary(true).nullable(false));
    t.add_column("email", types::text().nullable(false).unique(true));
    t.add_column("hashwd", types::text().nullable(false));
    t.add_column("salt", types::text().nullable(false));
    t.add_column("firstname", types::text().nullable(false));
    t.add_column("lastname", types::text().nullable(false));
    t.add_column("phone", types::text().nullable(true));
    t.add_column("photourl", types::text().nullable(true));
    t.add_column("createdate", types::integer().nullable(false));
  });

  // multiple tokens per user to support multiple browsers and/or devices.
  m.create_table("orgauth_token", |t| {
    t.add_column(
      "user",
      types::custom("text references orgauth_user(id)").nullable(false),
    );
    t.add_column("token", types::text().nullable(false));
    t.add_column("tokendate", types::integer().nullable(false));
    t.add_index("tokenunq", types::index(vec!["user", "token"]).unique(true));
  });

  conn.execute_batch(m.make::<Sqlite>().as_str())?;

  Ok(())
}
