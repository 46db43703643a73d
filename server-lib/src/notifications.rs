use crate::error as sperr;
use crate::sqldata::{enum_col, new_id};
use log::{error, info};
use orgauth::data::User;
use orgauth::util::now;
use rusqlite::{params, Connection, Row};
use spprotocol::constants::NotificationType;
use spprotocol::content::{Notification, UnreadCount};

const NOTIFICATION_FIELDS: &str =
  "id, recipient, ntype, message, relatedid, courseid, isread, createdate";

fn notification_from_row(row: &Row) -> rusqlite::Result<Notification> {
  Ok(Notification {
    id: row.get(0)?,
    user_id: row.get(1)?,
    notification_type: enum_col(row, 2)?,
    message: row.get(3)?,
    related_id: row.get(4)?,
    course_id: row.get(5)?,
    read: row.get(6)?,
    created_at: row.get(7)?,
  })
}

pub fn create_notification(
  conn: &Connection,
  recipient: &str,
  ntype: NotificationType,
  message: &str,
  relatedid: &str,
  courseid: Option<&str>,
) -> Result<Notification, sperr::Error> {
  let now = now()?;
  let id = new_id();
  conn.execute(
    "insert into notification (id, recipient, ntype, message, relatedid, courseid, isread, createdate)
      values (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
    params![id, recipient, ntype.str(), message, relatedid, courseid, now],
  )?;

  Ok(Notification {
    id,
    user_id: recipient.to_string(),
    notification_type: ntype,
    message: message.to_string(),
    related_id: relatedid.to_string(),
    course_id: courseid.map(|s| s.to_string()),
    read: false,
    created_at: now,
  })
}

// side-effect notifications never fail the operation that caused them.
pub fn notify(
  conn: &Connection,
  recipient: &str,
  ntype: NotificationType,
  message: &str,
  relatedid: &str,
  courseid: Option<&str>,
) {
  match create_notification(&conn, recipient, ntype, message, relatedid, courseid) {
    Ok(n) => info!("notified {}: {}", recipient, n.notification_type.str()),
    Err(e) => error!("failed to notify {}: {:?}", recipient, e),
  }
}

fn query_notifications(
  conn: &Connection,
  user: &User,
  unread_only: bool,
) -> Result<Vec<Notification>, sperr::Error> {
  let mut pstmt = conn.prepare(
    format!(
      "select {} from notification where recipient = ?1 {}
        order by createdate desc, rowid desc",
      NOTIFICATION_FIELDS,
      if unread_only { "and isread = 0" } else { "" }
    )
    .as_str(),
  )?;

  let rec_iter = pstmt.query_map(params![user.email], notification_from_row)?;

  let mut pv = Vec::new();
  for rsrec in rec_iter {
    pv.push(rsrec?);
  }
  Ok(pv)
}

pub fn user_notifications(conn: &Connection, user: &User) -> Result<Vec<Notification>, sperr::Error> {
  query_notifications(&conn, user, false)
}

pub fn unread_notifications(
  conn: &Connection,
  user: &User,
) -> Result<Vec<Notification>, sperr::Error> {
  query_notifications(&conn, user, true)
}

pub fn unread_count(conn: &Connection, user: &User) -> Result<UnreadCount, sperr::Error> {
  let count: i64 = conn.query_row(
    "select count(*) from notification where recipient = ?1 and isread = 0",
    params![user.email],
    |row| Ok(row.get(0)?),
  )?;
  Ok(UnreadCount { count })
}

pub fn read_notification(conn: &Connection, id: &str) -> Result<Notification, sperr::Error> {
  match conn.query_row(
    format!(
      "select {} from notification where id = ?1",
      NOTIFICATION_FIELDS
    )
    .as_str(),
    params![id],
    notification_from_row,
  ) {
    Ok(n) => Ok(n),
    Err(rusqlite::Error::QueryReturnedNoRows) => Err(sperr::Error::NotFound(format!(
      "Notification not found: {}",
      id
    ))),
    Err(e) => Err(e.into()),
  }
}

pub fn mark_read(conn: &Connection, user: &User, id: &str) -> Result<Notification, sperr::Error> {
  let mut n = read_notification(&conn, id)?;
  if n.user_id != user.email {
    return Err(sperr::Error::Unauthorized(
      "Unauthorized: You can only mark your own notifications as read".to_string(),
    ));
  }
  conn.execute(
    "update notification set isread = 1 where id = ?1",
    params![id],
  )?;
  n.read = true;
  Ok(n)
}

pub fn mark_all_read(conn: &Connection, user: &User) -> Result<usize, sperr::Error> {
  let count = conn.execute(
    "update notification set isread = 1 where recipient = ?1 and isread = 0",
    params![user.email],
  )?;
  Ok(count)
}
