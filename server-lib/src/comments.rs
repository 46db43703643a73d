use crate::error as sperr;
use crate::notifications::notify;
use crate::sqldata::{commented_content, new_id, ContentOwner};
use orgauth::data::User;
use orgauth::util::now;
use rusqlite::{params, Connection, Row};
use spprotocol::constants::NotificationType;
use spprotocol::content::Comment;
use spprotocol::messages::{CommentUpdate, SaveComment};

const COMMENT_FIELDS: &str =
  "id, postid, owner, username, body, parentid, hidden, createdate, changeddate";

// notification excerpts.
const EXCERPT_MAX: usize = 50;
const EXCERPT_KEEP: usize = 47;

pub fn truncate_for_notification(text: &str) -> String {
  if text.chars().count() > EXCERPT_MAX {
    let mut s: String = text.chars().take(EXCERPT_KEEP).collect();
    s.push_str("...");
    s
  } else {
    text.to_string()
  }
}

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
  Ok(Comment {
    id: row.get(0)?,
    post_id: row.get(1)?,
    user_id: row.get(2)?,
    username: row.get(3)?,
    text: row.get(4)?,
    parent_id: row.get(5)?,
    hidden: row.get(6)?,
    created_at: row.get(7)?,
    updated_at: row.get(8)?,
    replies: Vec::new(),
  })
}

pub fn read_comment(conn: &Connection, id: &str) -> Result<Comment, sperr::Error> {
  match conn.query_row(
    format!("select {} from comment where id = ?1", COMMENT_FIELDS).as_str(),
    params![id],
    comment_from_row,
  ) {
    Ok(c) => Ok(c),
    Err(rusqlite::Error::QueryReturnedNoRows) => {
      Err(sperr::Error::NotFound(format!("Comment not found: {}", id)))
    }
    Err(e) => Err(e.into()),
  }
}

fn is_content_owner(content: &Option<ContentOwner>, user: &User) -> bool {
  match content {
    Some(co) => co.owner == user.email,
    None => false,
  }
}

fn required_content(conn: &Connection, postid: &str) -> Result<ContentOwner, sperr::Error> {
  match commented_content(&conn, postid)? {
    Some(co) => Ok(co),
    None => Err(sperr::Error::NotFound(format!(
      "Learning plan or post not found: {}",
      postid
    ))),
  }
}

pub fn create_comment(
  conn: &Connection,
  caller: &User,
  sc: &SaveComment,
) -> Result<Comment, sperr::Error> {
  let postid = match &sc.post_id {
    Some(p) if !p.trim().is_empty() => p.clone(),
    _ => return Err(sperr::Error::Validation("Post id is required".to_string())),
  };
  if let Some(uid) = &sc.user_id {
    if *uid != caller.email && *uid != caller.id {
      return Err(sperr::Error::Unauthorized(
        "User id does not match the logged in user".to_string(),
      ));
    }
  }
  match &sc.username {
    Some(u) if *u == caller.display_name() => (),
    Some(_) => {
      return Err(sperr::Error::Validation(
        "Username does not match user".to_string(),
      ))
    }
    None => return Err(sperr::Error::Validation("Username is required".to_string())),
  }
  let text = match &sc.text {
    Some(t) if !t.trim().is_empty() => t.clone(),
    _ => return Err(sperr::Error::Validation("Text is required".to_string())),
  };

  let content = required_content(&conn, postid.as_str())?;
  content.check_visible(caller)?;

  let parent = match sc.parent_id.as_deref() {
    None | Some("") => None,
    Some(pid) => match read_comment(&conn, pid) {
      Ok(p) if p.post_id == postid => Some(p),
      Ok(_) => {
        return Err(sperr::Error::Validation(
          "Parent comment is on a different post".to_string(),
        ))
      }
      Err(sperr::Error::NotFound(_)) => {
        return Err(sperr::Error::NotFound(
          "Parent comment not found".to_string(),
        ))
      }
      Err(e) => return Err(e),
    },
  };

  let now = now()?;
  let comment = Comment {
    id: new_id(),
    post_id: postid,
    user_id: caller.email.clone(),
    username: caller.display_name(),
    text,
    parent_id: parent.as_ref().map(|p| p.id.clone()),
    hidden: false,
    created_at: now,
    updated_at: now,
    replies: Vec::new(),
  };
  conn.execute(
    "insert into comment (id, postid, owner, username, body, parentid, hidden, createdate, changeddate)
      values (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)",
    params![
      comment.id,
      comment.post_id,
      comment.user_id,
      comment.username,
      comment.text,
      comment.parent_id,
      comment.created_at,
      comment.updated_at,
    ],
  )?;

  if let Some(p) = &parent {
    if p.user_id != caller.email {
      notify(
        &conn,
        p.user_id.as_str(),
        NotificationType::CommentReply,
        format!("{} replied to your comment", caller.display_name()).as_str(),
        comment.id.as_str(),
        content.course_id.as_deref(),
      );
    }
  }

  if content.owner != caller.email {
    notify(
      &conn,
      content.owner.as_str(),
      NotificationType::CourseComment,
      format!(
        "{} commented on your {} '{}': {}",
        caller.display_name(),
        content.content_type.noun(),
        content.title,
        truncate_for_notification(comment.text.as_str())
      )
      .as_str(),
      comment.id.as_str(),
      content.course_id.as_deref(),
    );
  }

  Ok(comment)
}

fn attach_replies(parent: Option<&str>, all: &[Comment]) -> Vec<Comment> {
  all
    .iter()
    .filter(|c| match (parent, c.parent_id.as_deref()) {
      (None, None) | (None, Some("")) => true,
      (Some(p), Some(cp)) => p == cp,
      _ => false,
    })
    .map(|c| {
      let mut c = c.clone();
      c.replies = attach_replies(Some(c.id.as_str()), all);
      c
    })
    .collect()
}

// top level comments, with replies nested beneath.
pub fn build_tree(comments: &[Comment]) -> Vec<Comment> {
  attach_replies(None, comments)
}

pub fn post_comments(
  conn: &Connection,
  caller: &User,
  postid: &str,
) -> Result<Vec<Comment>, sperr::Error> {
  let content = commented_content(&conn, postid)?;
  if let Some(co) = &content {
    co.check_visible(caller)?;
  }
  let show_hidden = is_content_owner(&content, caller);

  let mut pstmt = conn.prepare(
    format!(
      "select {} from comment where postid = ?1 order by createdate, rowid",
      COMMENT_FIELDS
    )
    .as_str(),
  )?;
  let rec_iter = pstmt.query_map(params![postid], comment_from_row)?;

  let mut pv = Vec::new();
  for rsrec in rec_iter {
    let c = rsrec?;
    if show_hidden || !c.hidden {
      pv.push(c);
    }
  }

  Ok(build_tree(&pv))
}

pub fn read_comment_for(
  conn: &Connection,
  caller: &User,
  id: &str,
) -> Result<Comment, sperr::Error> {
  let c = read_comment(&conn, id)?;
  let content = commented_content(&conn, c.post_id.as_str())?;
  if let Some(co) = &content {
    co.check_visible(caller)?;
  }
  if c.hidden && c.user_id != caller.email && !is_content_owner(&content, caller) {
    // hidden looks like gone.
    return Err(sperr::Error::NotFound(format!("Comment not found: {}", id)));
  }
  Ok(c)
}

pub fn update_comment(
  conn: &Connection,
  caller: &User,
  id: &str,
  cu: &CommentUpdate,
) -> Result<Comment, sperr::Error> {
  let mut c = read_comment(&conn, id)?;
  if c.user_id != caller.email {
    return Err(sperr::Error::Unauthorized(
      "Unauthorized: Only the comment owner can update it".to_string(),
    ));
  }
  c.text = match &cu.text {
    Some(t) if !t.trim().is_empty() => t.clone(),
    _ => return Err(sperr::Error::Validation("Text is required".to_string())),
  };
  c.updated_at = now()?;
  conn.execute(
    "update comment set body = ?1, changeddate = ?2 where id = ?3",
    params![c.text, c.updated_at, c.id],
  )?;
  Ok(c)
}

// a comment, its direct replies, and reactions on them.  one level only.
pub fn delete_comment_rows(conn: &Connection, id: &str) -> Result<(), sperr::Error> {
  conn.execute(
    "delete from reaction where contentid in (select id from comment where parentid = ?1)",
    params![id],
  )?;
  conn.execute("delete from comment where parentid = ?1", params![id])?;
  conn.execute("delete from reaction where contentid = ?1", params![id])?;
  conn.execute("delete from comment where id = ?1", params![id])?;
  Ok(())
}

pub fn delete_content_comments(conn: &Connection, postid: &str) -> Result<(), sperr::Error> {
  conn.execute(
    "delete from reaction where contentid in (select id from comment where postid = ?1)",
    params![postid],
  )?;
  conn.execute("delete from comment where postid = ?1", params![postid])?;
  Ok(())
}

pub fn delete_comment(conn: &Connection, caller: &User, id: &str) -> Result<(), sperr::Error> {
  let c = read_comment(&conn, id)?;
  if c.user_id != caller.email
    && !is_content_owner(&commented_content(&conn, c.post_id.as_str())?, caller)
  {
    return Err(sperr::Error::Unauthorized(
      "Unauthorized: Only the comment owner or course owner can delete it".to_string(),
    ));
  }
  delete_comment_rows(&conn, id)
}

pub fn toggle_visibility(
  conn: &Connection,
  caller: &User,
  id: &str,
) -> Result<Comment, sperr::Error> {
  let mut c = read_comment(&conn, id)?;
  if !is_content_owner(&commented_content(&conn, c.post_id.as_str())?, caller) {
    return Err(sperr::Error::Unauthorized(
      "Unauthorized: Only the course owner can change comment visibility".to_string(),
    ));
  }
  c.hidden = !c.hidden;
  c.updated_at = now()?;
  conn.execute(
    "update comment set hidden = ?1, changeddate = ?2 where id = ?3",
    params![c.hidden, c.updated_at, c.id],
  )?;
  Ok(c)
}
