use crate::error as sperr;
use crate::progress::{calculate_percentages, weight_sum};
use crate::sqldata::{enum_col, json_col, new_id};
use log::{info, warn};
use orgauth::data::User;
use orgauth::util::now;
use rusqlite::{params, Connection, Row};
use spprotocol::content::{CustomItem, ProgressTemplate, TopicProgress};
use spprotocol::messages::SaveProgressTemplate;
use std::collections::HashSet;

const TEMPLATE_FIELDS: &str = "id, owner, courseid, learningplanid, topics, customitems,
  weighting, totalprogress, active, createdate, changeddate";

fn template_from_row(row: &Row) -> rusqlite::Result<ProgressTemplate> {
  Ok(ProgressTemplate {
    id: row.get(0)?,
    user_id: row.get(1)?,
    course_id: row.get(2)?,
    learning_plan_id: row.get(3)?,
    topics: json_col(row, 4)?,
    custom_items: json_col(row, 5)?,
    weighting: enum_col(row, 6)?,
    total_progress: row.get(7)?,
    is_active: row.get(8)?,
    created_at: row.get(9)?,
    updated_at: row.get(10)?,
  })
}

// topic ids key the custom item groups, so they must be present and distinct.
fn check_topics(topics: &[TopicProgress]) -> Result<(), sperr::Error> {
  let mut seen = HashSet::new();
  for t in topics.iter() {
    if t.topic_id.trim().is_empty() {
      return Err(sperr::Error::Validation("Topic id is required".to_string()));
    }
    if !seen.insert(t.topic_id.as_str()) {
      return Err(sperr::Error::Validation(format!(
        "Duplicate topic id: {}",
        t.topic_id
      )));
    }
  }
  Ok(())
}

fn check_items(items: &[CustomItem]) -> Result<Vec<CustomItem>, sperr::Error> {
  items
    .iter()
    .map(|c| {
      if c.name.trim().is_empty() {
        Err(sperr::Error::Validation(
          "Custom item name is required".to_string(),
        ))
      } else {
        let mut c = c.clone();
        if c.id.is_empty() {
          c.id = new_id();
        }
        Ok(c)
      }
    })
    .collect()
}

fn recompute(t: &mut ProgressTemplate) {
  calculate_percentages(t);
  let ws = weight_sum(t);
  if !(t.topics.is_empty() && t.custom_items.is_empty()) && (ws - 100.0).abs() > 0.001 {
    warn!("template {} weights sum to {}", t.id, ws);
  }
}

fn write_template(conn: &Connection, t: &ProgressTemplate) -> Result<(), sperr::Error> {
  conn.execute(
    "insert into progresstemplate (id, owner, courseid, learningplanid, topics, customitems,
       weighting, totalprogress, active, createdate, changeddate)
     values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
     on conflict (id) do update set learningplanid = ?4, topics = ?5, customitems = ?6,
       weighting = ?7, totalprogress = ?8, active = ?9, changeddate = ?11",
    params![
      t.id,
      t.user_id,
      t.course_id,
      t.learning_plan_id,
      serde_json::to_string(&t.topics)?,
      serde_json::to_string(&t.custom_items)?,
      t.weighting.str(),
      t.total_progress,
      t.is_active,
      t.created_at,
      t.updated_at,
    ],
  )?;
  Ok(())
}

pub fn read_template(conn: &Connection, id: &str) -> Result<ProgressTemplate, sperr::Error> {
  match conn.query_row(
    format!("select {} from progresstemplate where id = ?1", TEMPLATE_FIELDS).as_str(),
    params![id],
    template_from_row,
  ) {
    Ok(t) => Ok(t),
    Err(rusqlite::Error::QueryReturnedNoRows) => Err(sperr::Error::NotFound(format!(
      "Progress template not found: {}",
      id
    ))),
    Err(e) => Err(e.into()),
  }
}

fn find_template(
  conn: &Connection,
  owner: &str,
  courseid: &str,
) -> Result<Option<ProgressTemplate>, sperr::Error> {
  match conn.query_row(
    format!(
      "select {} from progresstemplate where owner = ?1 and courseid = ?2",
      TEMPLATE_FIELDS
    )
    .as_str(),
    params![owner, courseid],
    template_from_row,
  ) {
    Ok(t) => Ok(Some(t)),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(e) => Err(e.into()),
  }
}

fn owned_template(
  conn: &Connection,
  user: &User,
  id: &str,
) -> Result<ProgressTemplate, sperr::Error> {
  let t = read_template(&conn, id)?;
  if t.user_id != user.email {
    Err(sperr::Error::Unauthorized(
      "Unauthorized: You can only modify your own progress templates".to_string(),
    ))
  } else {
    Ok(t)
  }
}

// one template per user and course; saving again replaces the existing one.
pub fn save_template(
  conn: &Connection,
  caller: &User,
  st: &SaveProgressTemplate,
) -> Result<ProgressTemplate, sperr::Error> {
  let courseid = match &st.course_id {
    Some(c) if !c.trim().is_empty() => c.trim().to_string(),
    _ => return Err(sperr::Error::Validation("Course id is required".to_string())),
  };
  check_topics(&st.topics)?;
  let items = check_items(&st.custom_items)?;

  let now = now()?;
  let mut t = match find_template(&conn, caller.email.as_str(), courseid.as_str())? {
    Some(t) => t,
    None => ProgressTemplate {
      id: new_id(),
      user_id: caller.email.clone(),
      course_id: courseid,
      learning_plan_id: None,
      topics: Vec::new(),
      custom_items: Vec::new(),
      weighting: st.weighting,
      total_progress: 0.0,
      is_active: true,
      created_at: now,
      updated_at: now,
    },
  };

  t.learning_plan_id = st.learning_plan_id.clone();
  t.topics = st.topics.clone();
  t.custom_items = items;
  t.weighting = st.weighting;
  t.is_active = true;
  t.updated_at = now;
  recompute(&mut t);
  write_template(&conn, &t)?;
  info!("saved progress template {} for {}", t.id, caller.email);

  Ok(t)
}

// new custom items, and new progress values for known topics.
pub fn update_template(
  conn: &Connection,
  caller: &User,
  id: &str,
  st: &SaveProgressTemplate,
) -> Result<ProgressTemplate, sperr::Error> {
  let mut t = owned_template(&conn, caller, id)?;
  t.custom_items = check_items(&st.custom_items)?;
  for tp in st.topics.iter() {
    if let Some(existing) = t.topics.iter_mut().find(|x| x.topic_id == tp.topic_id) {
      existing.current_progress = tp.current_progress;
    }
  }
  t.updated_at = now()?;
  recompute(&mut t);
  write_template(&conn, &t)?;

  Ok(t)
}

pub fn delete_template(conn: &Connection, caller: &User, id: &str) -> Result<(), sperr::Error> {
  owned_template(&conn, caller, id)?;
  conn.execute("delete from progresstemplate where id = ?1", params![id])?;
  Ok(())
}

pub fn user_templates(
  conn: &Connection,
  caller: &User,
) -> Result<Vec<ProgressTemplate>, sperr::Error> {
  let mut pstmt = conn.prepare(
    format!(
      "select {} from progresstemplate where owner = ?1 and active = 1
        order by changeddate desc",
      TEMPLATE_FIELDS
    )
    .as_str(),
  )?;
  let rec_iter = pstmt.query_map(params![caller.email], template_from_row)?;

  let mut pv = Vec::new();
  for rsrec in rec_iter {
    pv.push(rsrec?);
  }
  Ok(pv)
}

pub fn template_for_course(
  conn: &Connection,
  caller: &User,
  courseid: &str,
) -> Result<ProgressTemplate, sperr::Error> {
  match find_template(&conn, caller.email.as_str(), courseid)? {
    Some(t) => Ok(t),
    None => Err(sperr::Error::NotFound(format!(
      "No progress template for course: {}",
      courseid
    ))),
  }
}
