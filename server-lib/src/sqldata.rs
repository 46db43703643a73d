use crate::comments;
use crate::error as sperr;
use crate::error::to_orgauth_error;
use crate::migrations as spm;
use crate::plans;
use crate::posts;
use barrel::backend::Sqlite;
use log::info;
use orgauth::data::User;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::de::DeserializeOwned;
use spprotocol::constants::{ContentType, UnknownValue};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

pub fn new_id() -> String {
  Uuid::new_v4().to_string()
}

// enums are stored by name.
pub fn enum_col<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
  T: FromStr<Err = UnknownValue>,
{
  let s: String = row.get(idx)?;
  T::from_str(s.as_str())
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn json_col<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
  let s: String = row.get(idx)?;
  serde_json::from_str(s.as_str())
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn connection_open(dbfile: &Path) -> Result<Connection, sperr::Error> {
  let conn = Connection::open(dbfile)?;

  conn.busy_handler(Some(|count| {
    info!("busy_handler: {}", count);
    let d = Duration::from_millis(500);
    std::thread::sleep(d);
    true
  }))?;

  conn.execute("PRAGMA foreign_keys = true;", params![])?;

  Ok(conn)
}

pub fn get_single_value(conn: &Connection, name: &str) -> Result<Option<String>, sperr::Error> {
  match conn.query_row(
    "select value from singlevalue where name = ?1",
    params![name],
    |row| Ok(row.get(0)?),
  ) {
    Ok(v) => Ok(Some(v)),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(x) => Err(x.into()),
  }
}

pub fn set_single_value(conn: &Connection, name: &str, value: &str) -> Result<(), sperr::Error> {
  conn.execute(
    "insert into singlevalue (name, value) values (?1, ?2)
        on conflict (name) do update set value = ?2 where name = ?1",
    params![name, value],
  )?;
  Ok(())
}

pub fn dbinit(dbfile: &Path, token_expiration_ms: Option<i64>) -> Result<(), sperr::Error> {
  let exists = dbfile.exists();

  let conn = connection_open(dbfile)?;

  if !exists {
    info!("initialdb");
    conn.execute_batch(spm::initialdb().make::<Sqlite>().as_str())?;
  }

  let nlevel = match get_single_value(&conn, "migration_level") {
    Err(_) => 0,
    Ok(None) => 0,
    Ok(Some(level)) => {
      let l = match level.parse::<i32>() {
        Ok(l) => l,
        Err(e) => return Err(format!("{}", e).into()),
      };
      l
    }
  };

  if nlevel < 1 {
    info!("udpate1");
    spm::udpate1(&dbfile)?;
    set_single_value(&conn, "migration_level", "1")?;
  }

  if nlevel < 2 {
    info!("udpate2");
    conn.execute_batch(spm::udpate2().make::<Sqlite>().as_str())?;
    set_single_value(&conn, "migration_level", "2")?;
  }

  info!("db up to date.");

  if let Some(expms) = token_expiration_ms {
    orgauth::dbfun::purge_login_tokens(&conn, expms)?;
  }

  Ok(())
}

pub fn purge_tokens(config: &orgauth::data::Config) -> Result<(), sperr::Error> {
  if let Some(expms) = config.login_token_expiration_ms {
    let conn = connection_open(config.db.as_path())?;
    orgauth::dbfun::purge_login_tokens(&conn, expms)?;
  }
  Ok(())
}

pub fn studyplan_callbacks() -> orgauth::endpoints::Callbacks {
  orgauth::endpoints::Callbacks {
    on_delete_user: Box::new(|conn: &Connection, user: &User| {
      on_delete_user(conn, user).map_err(to_orgauth_error)
    }),
  }
}

// remove everything the user owns, and their marks on other people's things.
pub fn on_delete_user(conn: &Connection, user: &User) -> Result<(), sperr::Error> {
  let email = user.email.as_str();

  let mut pstmt = conn.prepare("select id from learningplan where owner = ?1")?;
  let planids = pstmt
    .query_map(params![email], |row| row.get::<usize, String>(0))?
    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
  for id in planids {
    plans::delete_plan_rows(&conn, id.as_str())?;
  }

  let mut pstmt = conn.prepare("select id from post where owner = ?1")?;
  let postids = pstmt
    .query_map(params![email], |row| row.get::<usize, String>(0))?
    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
  for id in postids {
    posts::delete_post_rows(&conn, id.as_str())?;
  }

  let mut pstmt = conn.prepare("select id from comment where owner = ?1")?;
  let commentids = pstmt
    .query_map(params![email], |row| row.get::<usize, String>(0))?
    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
  for id in commentids {
    comments::delete_comment_rows(&conn, id.as_str())?;
  }

  conn.execute("delete from planenrollment where user = ?1", params![email])?;
  conn.execute("delete from progresstemplate where owner = ?1", params![email])?;
  conn.execute("delete from reaction where owner = ?1", params![email])?;
  conn.execute("delete from notification where recipient = ?1", params![email])?;

  info!("removed content for user {}", email);
  Ok(())
}

// who owns a piece of content, and how to describe it in a notification.
#[derive(Debug, Clone)]
pub struct ContentOwner {
  pub content_type: ContentType,
  pub owner: String,
  pub title: String,
  pub course_id: Option<String>,
  // owner of the unshared learning plan this content belongs to.
  pub private_to: Option<String>,
}

impl ContentOwner {
  // unshared plans, and the comments on them, are for the plan owner only.
  pub fn check_visible(&self, caller: &User) -> Result<(), sperr::Error> {
    match &self.private_to {
      Some(owner) if *owner != caller.email => Err(sperr::Error::Unauthorized(
        "Unauthorized: This learning plan is private".to_string(),
      )),
      _ => Ok(()),
    }
  }
}

fn plan_owner(conn: &Connection, id: &str) -> Result<Option<ContentOwner>, sperr::Error> {
  match conn.query_row(
    "select owner, title, shared from learningplan where id = ?1",
    params![id],
    |row| {
      Ok((
        row.get::<usize, String>(0)?,
        row.get::<usize, String>(1)?,
        row.get::<usize, bool>(2)?,
      ))
    },
  ) {
    Ok((owner, title, shared)) => Ok(Some(ContentOwner {
      content_type: ContentType::Course,
      private_to: if shared { None } else { Some(owner.clone()) },
      owner,
      title,
      course_id: Some(id.to_string()),
    })),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(e) => Err(e.into()),
  }
}

fn post_owner(conn: &Connection, id: &str) -> Result<Option<ContentOwner>, sperr::Error> {
  match conn.query_row(
    "select owner, title from post where id = ?1",
    params![id],
    |row| Ok((row.get::<usize, String>(0)?, row.get::<usize, String>(1)?)),
  ) {
    Ok((owner, title)) => Ok(Some(ContentOwner {
      content_type: ContentType::Post,
      owner,
      title,
      course_id: None,
      private_to: None,
    })),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(e) => Err(e.into()),
  }
}

fn comment_owner(conn: &Connection, id: &str) -> Result<Option<ContentOwner>, sperr::Error> {
  match conn.query_row(
    "select owner, body, postid from comment where id = ?1",
    params![id],
    |row| {
      Ok((
        row.get::<usize, String>(0)?,
        row.get::<usize, String>(1)?,
        row.get::<usize, String>(2)?,
      ))
    },
  ) {
    Ok((owner, body, postid)) => {
      let (course_id, private_to) = match plan_owner(&conn, postid.as_str())? {
        Some(plan) => (Some(postid), plan.private_to),
        None => (None, None),
      };
      Ok(Some(ContentOwner {
        content_type: ContentType::Comment,
        owner,
        title: comments::truncate_for_notification(body.as_str()),
        course_id,
        private_to,
      }))
    }
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(e) => Err(e.into()),
  }
}

pub fn content_owner(
  conn: &Connection,
  ct: ContentType,
  id: &str,
) -> Result<ContentOwner, sperr::Error> {
  let co = match ct {
    ContentType::Course => plan_owner(&conn, id)?,
    ContentType::Post => post_owner(&conn, id)?,
    ContentType::Comment => comment_owner(&conn, id)?,
  };
  co.ok_or_else(|| sperr::Error::NotFound(format!("{} not found: {}", ct.noun(), id)))
}

// comments hang off of either a learning plan or a post.
pub fn commented_content(conn: &Connection, id: &str) -> Result<Option<ContentOwner>, sperr::Error> {
  match plan_owner(&conn, id)? {
    Some(co) => Ok(Some(co)),
    None => post_owner(&conn, id),
  }
}
