use crate::error as sperr;
use crate::notifications::notify;
use crate::sqldata::{content_owner, enum_col, new_id, ContentOwner};
use log::info;
use orgauth::data::User;
use orgauth::util::now;
use rusqlite::{params, Connection};
use spprotocol::constants::{ContentType, NotificationType, ReactionType};
use spprotocol::content::ReactionCounts;

// the caller's current reaction, if any: (id, type).
fn existing_reaction(
  conn: &Connection,
  owner: &str,
  ct: ContentType,
  contentid: &str,
) -> Result<Option<(String, ReactionType)>, sperr::Error> {
  match conn.query_row(
    "select id, reactiontype from reaction
      where owner = ?1 and contentid = ?2 and contenttype = ?3",
    params![owner, contentid, ct.str()],
    |row| Ok((row.get::<usize, String>(0)?, enum_col(row, 1)?)),
  ) {
    Ok(r) => Ok(Some(r)),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(e) => Err(e.into()),
  }
}

fn notify_owner(
  conn: &Connection,
  caller: &User,
  content: &ContentOwner,
  contentid: &str,
  ntype: NotificationType,
  message: String,
) {
  if content.owner != caller.email {
    notify(
      &conn,
      content.owner.as_str(),
      ntype,
      message.as_str(),
      contentid,
      content.course_id.as_deref(),
    );
  }
}

fn removed_message(caller: &User, content: &ContentOwner, rt: ReactionType) -> String {
  format!(
    "{} removed their {} from your {} '{}'",
    caller.display_name(),
    rt.noun(),
    content.content_type.noun(),
    content.title
  )
}

pub fn add_reaction(
  conn: &Connection,
  caller: &User,
  ct: ContentType,
  contentid: &str,
  rt: ReactionType,
) -> Result<ReactionCounts, sperr::Error> {
  let content = content_owner(&conn, ct, contentid)?;
  content.check_visible(caller)?;

  match existing_reaction(&conn, caller.email.as_str(), ct, contentid)? {
    None => {
      conn.execute(
        "insert into reaction (id, owner, contentid, contenttype, reactiontype, createdate)
          values (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
          new_id(),
          caller.email,
          contentid,
          ct.str(),
          rt.str(),
          now()?
        ],
      )?;
      info!("{} {} {} {}", caller.email, rt.verb(), ct.str(), contentid);
      notify_owner(
        &conn,
        caller,
        &content,
        contentid,
        NotificationType::reaction_on(ct),
        format!(
          "{} {} your {} '{}'",
          caller.display_name(),
          rt.verb(),
          ct.noun(),
          content.title
        ),
      );
    }
    Some((id, existing)) if existing == rt => {
      conn.execute("delete from reaction where id = ?1", params![id])?;
      notify_owner(
        &conn,
        caller,
        &content,
        contentid,
        NotificationType::ReactionRemoved,
        removed_message(caller, &content, rt),
      );
    }
    Some((id, _)) => {
      conn.execute(
        "update reaction set reactiontype = ?1 where id = ?2",
        params![rt.str(), id],
      )?;
      notify_owner(
        &conn,
        caller,
        &content,
        contentid,
        NotificationType::ReactionChanged,
        format!(
          "{} changed their reaction on your {} '{}' to {}",
          caller.display_name(),
          ct.noun(),
          content.title,
          rt.noun()
        ),
      );
    }
  }

  reaction_counts(&conn, ct, contentid)
}

pub fn remove_reaction(
  conn: &Connection,
  caller: &User,
  ct: ContentType,
  contentid: &str,
) -> Result<ReactionCounts, sperr::Error> {
  if let Some((id, existing)) = existing_reaction(&conn, caller.email.as_str(), ct, contentid)? {
    conn.execute("delete from reaction where id = ?1", params![id])?;
    // content may already be gone; the reaction row goes regardless.
    if let Ok(content) = content_owner(&conn, ct, contentid) {
      notify_owner(
        &conn,
        caller,
        &content,
        contentid,
        NotificationType::ReactionRemoved,
        removed_message(caller, &content, existing),
      );
    }
  }
  reaction_counts(&conn, ct, contentid)
}

pub fn reaction_counts(
  conn: &Connection,
  ct: ContentType,
  contentid: &str,
) -> Result<ReactionCounts, sperr::Error> {
  let (likes, dislikes) = conn.query_row(
    "select
        coalesce(sum(case when reactiontype = 'LIKE' then 1 else 0 end), 0),
        coalesce(sum(case when reactiontype = 'DISLIKE' then 1 else 0 end), 0)
      from reaction where contentid = ?1 and contenttype = ?2",
    params![contentid, ct.str()],
    |row| Ok((row.get::<usize, i64>(0)?, row.get::<usize, i64>(1)?)),
  )?;
  Ok(ReactionCounts { likes, dislikes })
}

pub fn user_reaction(
  conn: &Connection,
  caller: &User,
  ct: ContentType,
  contentid: &str,
) -> Result<Option<ReactionType>, sperr::Error> {
  Ok(existing_reaction(&conn, caller.email.as_str(), ct, contentid)?.map(|(_, rt)| rt))
}
