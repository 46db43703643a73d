use crate::comments;
use crate::error as sperr;
use crate::sqldata::new_id;
use orgauth::data::User;
use orgauth::util::now;
use rusqlite::{params, Connection, Row};
use spprotocol::content::Post;
use spprotocol::messages::{PostPatch, SavePost};

fn post_from_row(row: &Row) -> rusqlite::Result<Post> {
  Ok(Post {
    id: row.get(0)?,
    user_email: row.get(1)?,
    title: row.get(2)?,
    content: row.get(3)?,
    created_at: row.get(4)?,
    updated_at: row.get(5)?,
  })
}

fn nonempty(s: &Option<String>, what: &str) -> Result<String, sperr::Error> {
  match s {
    Some(s) if !s.trim().is_empty() => Ok(s.clone()),
    _ => Err(sperr::Error::Validation(format!("{} is required", what))),
  }
}

pub fn read_post(conn: &Connection, id: &str) -> Result<Post, sperr::Error> {
  match conn.query_row(
    "select id, owner, title, content, createdate, changeddate from post where id = ?1",
    params![id],
    post_from_row,
  ) {
    Ok(p) => Ok(p),
    Err(rusqlite::Error::QueryReturnedNoRows) => {
      Err(sperr::Error::NotFound(format!("Post not found: {}", id)))
    }
    Err(e) => Err(e.into()),
  }
}

fn owned_post(conn: &Connection, user: &User, id: &str) -> Result<Post, sperr::Error> {
  let post = read_post(&conn, id)?;
  if post.user_email != user.email {
    Err(sperr::Error::Unauthorized(
      "Unauthorized: You can only modify your own posts".to_string(),
    ))
  } else {
    Ok(post)
  }
}

pub fn create_post(conn: &Connection, caller: &User, sp: &SavePost) -> Result<Post, sperr::Error> {
  let title = nonempty(&sp.title, "Title")?;
  let content = nonempty(&sp.content, "Content")?;
  let now = now()?;
  let post = Post {
    id: new_id(),
    user_email: caller.email.clone(),
    title,
    content,
    created_at: now,
    updated_at: now,
  };
  conn.execute(
    "insert into post (id, owner, title, content, createdate, changeddate)
      values (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      post.id,
      post.user_email,
      post.title,
      post.content,
      post.created_at,
      post.updated_at
    ],
  )?;
  Ok(post)
}

fn query_posts(
  conn: &Connection,
  owner: Option<&str>,
) -> Result<Vec<Post>, sperr::Error> {
  let mut pstmt = conn.prepare(
    "select id, owner, title, content, createdate, changeddate from post
      where ?1 is null or owner = ?1
      order by createdate desc, rowid desc",
  )?;
  let rec_iter = pstmt.query_map(params![owner], post_from_row)?;

  let mut pv = Vec::new();
  for rsrec in rec_iter {
    pv.push(rsrec?);
  }
  Ok(pv)
}

pub fn all_posts(conn: &Connection) -> Result<Vec<Post>, sperr::Error> {
  query_posts(&conn, None)
}

pub fn user_posts(conn: &Connection, caller: &User) -> Result<Vec<Post>, sperr::Error> {
  query_posts(&conn, Some(caller.email.as_str()))
}

pub fn update_post(
  conn: &Connection,
  caller: &User,
  id: &str,
  pp: &PostPatch,
) -> Result<Post, sperr::Error> {
  let mut post = owned_post(&conn, caller, id)?;
  if pp.title.is_some() {
    post.title = nonempty(&pp.title, "Title")?;
  }
  if pp.content.is_some() {
    post.content = nonempty(&pp.content, "Content")?;
  }
  post.updated_at = now()?;
  conn.execute(
    "update post set title = ?1, content = ?2, changeddate = ?3 where id = ?4",
    params![post.title, post.content, post.updated_at, post.id],
  )?;
  Ok(post)
}

pub fn delete_post_rows(conn: &Connection, id: &str) -> Result<(), sperr::Error> {
  comments::delete_content_comments(&conn, id)?;
  conn.execute("delete from reaction where contentid = ?1", params![id])?;
  conn.execute("delete from post where id = ?1", params![id])?;
  Ok(())
}

pub fn delete_post(conn: &Connection, caller: &User, id: &str) -> Result<(), sperr::Error> {
  owned_post(&conn, caller, id)?;
  delete_post_rows(&conn, id)
}
