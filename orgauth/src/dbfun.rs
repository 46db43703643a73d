use crate::data::User;
use crate::error::Error;
use crate::util::{is_token_expired, now};
use log::info;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const USER_FIELDS: &str =
  "orgauth_user.id, email, firstname, lastname, phone, photourl, hashwd, salt, createdate";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
  Ok(User {
    id: row.get(0)?,
    email: row.get(1)?,
    first_name: row.get(2)?,
    last_name: row.get(3)?,
    phone: row.get(4)?,
    photo_url: row.get(5)?,
    hashwd: row.get(6)?,
    salt: row.get(7)?,
    createdate: row.get(8)?,
  })
}

pub fn new_user(
  conn: &Connection,
  email: &str,
  hashwd: &str,
  salt: &str,
  first_name: &str,
  last_name: &str,
  phone: Option<&str>,
  photo_url: Option<&str>,
) -> Result<User, Error> {
  let now = now()?;
  let id = Uuid::new_v4().to_string();

  conn.execute(
    "insert into orgauth_user (id, email, hashwd, salt, firstname, lastname, phone, photourl, createdate)
      values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    params![id, email, hashwd, salt, first_name, last_name, phone, photo_url, now],
  )?;

  read_user_by_id(conn, id.as_str())
}

pub fn read_user_by_id(conn: &Connection, id: &str) -> Result<User, Error> {
  let user = conn.query_row(
    format!("select {} from orgauth_user where id = ?1", USER_FIELDS).as_str(),
    params![id],
    user_from_row,
  )?;

  Ok(user)
}

pub fn read_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, Error> {
  match conn.query_row(
    format!(
      "select {} from orgauth_user where email = ?1 collate nocase",
      USER_FIELDS
    )
    .as_str(),
    params![email],
    user_from_row,
  ) {
    Ok(u) => Ok(Some(u)),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(e) => Err(e.into()),
  }
}

pub fn read_user_by_token(
  conn: &Connection,
  token: Uuid,
  token_expiration_ms: Option<i64>,
) -> Result<User, Error> {
  let (user, tokendate) = match conn.query_row(
    format!(
      "select {}, orgauth_token.tokendate
        from orgauth_user, orgauth_token
        where orgauth_user.id = orgauth_token.user and orgauth_token.token = ?1",
      USER_FIELDS
    )
    .as_str(),
    params![token.to_string()],
    |row| Ok((user_from_row(row)?, row.get::<usize, i64>(9)?)),
  ) {
    Ok(ut) => ut,
    Err(rusqlite::Error::QueryReturnedNoRows) => return Err(Error::NotLoggedIn),
    Err(e) => return Err(e.into()),
  };

  match token_expiration_ms {
    Some(texp) => {
      if is_token_expired(texp, tokendate) {
        Err(Error::NotLoggedIn)
      } else {
        Ok(user)
      }
    }
    None => Ok(user),
  }
}

pub fn add_token(conn: &Connection, user: &str, token: Uuid) -> Result<(), Error> {
  let now = now()?;
  conn.execute(
    "insert into orgauth_token (user, token, tokendate)
     values (?1, ?2, ?3)",
    params![user, token.to_string(), now],
  )?;

  Ok(())
}

pub fn remove_token(conn: &Connection, user: &str, token: Uuid) -> Result<(), Error> {
  conn.execute(
    "delete from orgauth_token where user = ?1 and token = ?2",
    params![user, token.to_string()],
  )?;

  Ok(())
}

pub fn purge_login_tokens(conn: &Connection, token_expiration_ms: i64) -> Result<(), Error> {
  let now = now()?;
  let expdt = now - token_expiration_ms;

  let count: i64 = conn.query_row(
    "select count(*) from
      orgauth_token where tokendate < ?1",
    params![expdt],
    |row| Ok(row.get(0)?),
  )?;

  if count > 0 {
    info!("removing {} expired token records", count);

    conn.execute(
      "delete from orgauth_token
        where tokendate < ?1",
      params![expdt],
    )?;
  }

  Ok(())
}

pub fn update_user(conn: &Connection, user: &User) -> Result<(), Error> {
  conn.execute(
    "update orgauth_user set email = ?1, hashwd = ?2, salt = ?3, firstname = ?4, lastname = ?5,
       phone = ?6, photourl = ?7
     where id = ?8",
    params![
      user.email,
      user.hashwd,
      user.salt,
      user.first_name,
      user.last_name,
      user.phone,
      user.photo_url,
      user.id,
    ],
  )?;

  Ok(())
}

// tokens go too, so outstanding logins stop working.
pub fn delete_user(conn: &Connection, id: &str) -> Result<(), Error> {
  conn.execute("delete from orgauth_token where user = ?1", params![id])?;
  conn.execute("delete from orgauth_user where id = ?1", params![id])?;
  Ok(())
}
