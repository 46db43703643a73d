use crate::comments;
use crate::error as sperr;
use crate::notifications::notify;
use crate::progress::{next_status, plan_progress};
use crate::sqldata::{enum_col, json_col, new_id};
use chrono::NaiveDate;
use log::info;
use orgauth::data::User;
use orgauth::util::now;
use rusqlite::{params, Connection, Row};
use spprotocol::constants::{NotificationType, PlanStatus};
use spprotocol::content::{LearningPlan, PlanProgress, Topic};
use spprotocol::messages::{LearningPlanPatch, SaveLearningPlan, TopicProgressUpdate};

const PLAN_FIELDS: &str = "id, owner, title, description, startdate, enddate, topics, progress,
  status, shared, sourceplan, createdate, changeddate";

fn plan_from_row(row: &Row) -> rusqlite::Result<LearningPlan> {
  Ok(LearningPlan {
    id: row.get(0)?,
    user_email: row.get(1)?,
    title: row.get(2)?,
    description: row.get(3)?,
    start_date: row.get(4)?,
    end_date: row.get(5)?,
    topics: json_col(row, 6)?,
    progress: row.get(7)?,
    status: enum_col(row, 8)?,
    shared: row.get(9)?,
    enrolled_users: Vec::new(),
    source_plan_id: row.get(10)?,
    created_at: row.get(11)?,
    updated_at: row.get(12)?,
  })
}

fn enrolled_users(conn: &Connection, planid: &str) -> Result<Vec<String>, sperr::Error> {
  let mut pstmt =
    conn.prepare("select user from planenrollment where plan = ?1 order by createdate, rowid")?;
  let users = pstmt
    .query_map(params![planid], |row| row.get::<usize, String>(0))?
    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
  Ok(users)
}

fn query_plans(
  conn: &Connection,
  whereclause: &str,
  email: &str,
) -> Result<Vec<LearningPlan>, sperr::Error> {
  let mut pstmt = conn.prepare(
    format!(
      "select {} from learningplan where {} order by createdate desc, rowid desc",
      PLAN_FIELDS, whereclause
    )
    .as_str(),
  )?;
  let rec_iter = pstmt.query_map(params![email], plan_from_row)?;

  let mut pv = Vec::new();
  for rsrec in rec_iter {
    let mut plan = rsrec?;
    plan.enrolled_users = enrolled_users(&conn, plan.id.as_str())?;
    pv.push(plan);
  }
  Ok(pv)
}

pub fn read_plan(conn: &Connection, id: &str) -> Result<LearningPlan, sperr::Error> {
  let mut plan = match conn.query_row(
    format!("select {} from learningplan where id = ?1", PLAN_FIELDS).as_str(),
    params![id],
    plan_from_row,
  ) {
    Ok(p) => p,
    Err(rusqlite::Error::QueryReturnedNoRows) => {
      return Err(sperr::Error::NotFound(format!(
        "Learning plan not found: {}",
        id
      )))
    }
    Err(e) => return Err(e.into()),
  };
  plan.enrolled_users = enrolled_users(&conn, id)?;
  Ok(plan)
}

// fetch scoped to the owner.
fn owned_plan(conn: &Connection, user: &User, id: &str) -> Result<LearningPlan, sperr::Error> {
  let plan = read_plan(&conn, id)?;
  if plan.user_email != user.email {
    Err(sperr::Error::Unauthorized(
      "Unauthorized: You can only modify your own learning plans".to_string(),
    ))
  } else {
    Ok(plan)
  }
}

fn insert_plan(conn: &Connection, plan: &LearningPlan) -> Result<(), sperr::Error> {
  conn.execute(
    "insert into learningplan (id, owner, title, description, startdate, enddate, topics,
       progress, status, shared, sourceplan, createdate, changeddate)
     values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    params![
      plan.id,
      plan.user_email,
      plan.title,
      plan.description,
      plan.start_date,
      plan.end_date,
      serde_json::to_string(&plan.topics)?,
      plan.progress,
      plan.status.str(),
      plan.shared,
      plan.source_plan_id,
      plan.created_at,
      plan.updated_at,
    ],
  )?;
  Ok(())
}

fn save_plan(conn: &Connection, plan: &LearningPlan) -> Result<(), sperr::Error> {
  conn.execute(
    "update learningplan set title = ?1, description = ?2, startdate = ?3, enddate = ?4,
       topics = ?5, progress = ?6, status = ?7, shared = ?8, changeddate = ?9
     where id = ?10",
    params![
      plan.title,
      plan.description,
      plan.start_date,
      plan.end_date,
      serde_json::to_string(&plan.topics)?,
      plan.progress,
      plan.status.str(),
      plan.shared,
      plan.updated_at,
      plan.id,
    ],
  )?;
  Ok(())
}

fn validate_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), sperr::Error> {
  match (start, end) {
    (Some(s), Some(e)) => {
      if s > e {
        Err(sperr::Error::Validation(
          "Start date must be before end date".to_string(),
        ))
      } else {
        Ok(())
      }
    }
    _ => Err(sperr::Error::Validation(
      "Start date and end date are required".to_string(),
    )),
  }
}

fn validate_title(title: &Option<String>) -> Result<String, sperr::Error> {
  match title {
    Some(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
    _ => Err(sperr::Error::Validation("Title is required".to_string())),
  }
}

fn validate_topics(topics: &[Topic]) -> Result<(), sperr::Error> {
  if topics.iter().any(|t| t.title.trim().is_empty()) {
    Err(sperr::Error::Validation(
      "Topic title is required".to_string(),
    ))
  } else {
    Ok(())
  }
}

fn recompute(plan: &mut LearningPlan) {
  plan.progress = plan_progress(&plan.topics);
  plan.status = next_status(plan.status, plan.progress);
}

pub fn create_plan(
  conn: &Connection,
  owner: &User,
  sp: &SaveLearningPlan,
) -> Result<LearningPlan, sperr::Error> {
  let title = validate_title(&sp.title)?;
  validate_dates(sp.start_date, sp.end_date)?;
  validate_topics(&sp.topics)?;

  let now = now()?;
  let mut plan = LearningPlan {
    id: new_id(),
    user_email: owner.email.clone(),
    title,
    description: sp.description.clone().unwrap_or_default(),
    start_date: sp.start_date,
    end_date: sp.end_date,
    topics: sp.topics.clone(),
    progress: 0,
    status: PlanStatus::Created,
    shared: sp.shared,
    enrolled_users: Vec::new(),
    source_plan_id: None,
    created_at: now,
    updated_at: now,
  };
  recompute(&mut plan);
  insert_plan(&conn, &plan)?;
  info!("created plan {} for {}", plan.id, owner.email);

  Ok(plan)
}

pub fn update_plan(
  conn: &Connection,
  owner: &User,
  id: &str,
  patch: &LearningPlanPatch,
) -> Result<LearningPlan, sperr::Error> {
  let mut plan = owned_plan(&conn, owner, id)?;

  if patch.title.is_some() {
    plan.title = validate_title(&patch.title)?;
  }
  if let Some(description) = &patch.description {
    plan.description = description.clone();
  }
  if patch.start_date.is_some() || patch.end_date.is_some() {
    let start = patch.start_date.or(plan.start_date);
    let end = patch.end_date.or(plan.end_date);
    validate_dates(start, end)?;
    plan.start_date = start;
    plan.end_date = end;
  }
  if let Some(topics) = &patch.topics {
    validate_topics(&topics)?;
    plan.topics = topics.clone();
  }
  if let Some(shared) = patch.shared {
    plan.shared = shared;
  }
  match patch.status {
    None => (),
    Some(PlanStatus::Abandoned) => plan.status = PlanStatus::Abandoned,
    Some(PlanStatus::InProgress) => {
      // resume.
      plan.status = PlanStatus::InProgress;
    }
    Some(s) => {
      return Err(sperr::Error::Validation(format!(
        "Status {} is set from topic progress",
        s.str()
      )))
    }
  }

  recompute(&mut plan);
  plan.updated_at = now()?;
  save_plan(&conn, &plan)?;

  Ok(plan)
}

// plan plus everything hanging off of it.
pub fn delete_plan_rows(conn: &Connection, id: &str) -> Result<(), sperr::Error> {
  comments::delete_content_comments(&conn, id)?;
  conn.execute("delete from reaction where contentid = ?1", params![id])?;
  conn.execute("delete from planenrollment where plan = ?1", params![id])?;
  conn.execute("delete from learningplan where id = ?1", params![id])?;
  Ok(())
}

pub fn delete_plan(conn: &Connection, owner: &User, id: &str) -> Result<(), sperr::Error> {
  owned_plan(&conn, owner, id)?;
  delete_plan_rows(&conn, id)?;
  info!("deleted plan {}", id);
  Ok(())
}

// enroll in a shared plan, getting a private copy to work through.
pub fn start_plan(
  conn: &Connection,
  caller: &User,
  planid: &str,
) -> Result<LearningPlan, sperr::Error> {
  let shared = read_plan(&conn, planid)?;
  if !shared.shared {
    return Err(sperr::Error::Conflict(
      "This learning plan is not shared".to_string(),
    ));
  }

  let existing = query_plans(&conn, "owner = ?1", caller.email.as_str())?
    .into_iter()
    .find(|p| p.title == shared.title);

  let plan = match existing {
    Some(p) => p,
    None => {
      let now = now()?;
      let plan = LearningPlan {
        id: new_id(),
        user_email: caller.email.clone(),
        title: shared.title.clone(),
        description: shared.description.clone(),
        start_date: shared.start_date,
        end_date: shared.end_date,
        topics: shared
          .topics
          .iter()
          .map(|t| Topic {
            title: t.title.clone(),
            resources: t.resources.clone(),
            completed: false,
          })
          .collect(),
        progress: 0,
        status: PlanStatus::Created,
        shared: false,
        enrolled_users: Vec::new(),
        source_plan_id: Some(shared.id.clone()),
        created_at: now,
        updated_at: now,
      };
      insert_plan(&conn, &plan)?;
      info!("{} started plan {} as {}", caller.email, shared.id, plan.id);
      plan
    }
  };

  if shared.user_email != caller.email {
    let added = conn.execute(
      "insert or ignore into planenrollment (plan, user, createdate) values (?1, ?2, ?3)",
      params![shared.id, caller.email, now()?],
    )?;
    if added > 0 {
      notify(
        &conn,
        shared.user_email.as_str(),
        NotificationType::PlanEnrollment,
        format!(
          "{} enrolled in your learning plan '{}'",
          caller.display_name(),
          shared.title
        )
        .as_str(),
        shared.id.as_str(),
        Some(shared.id.as_str()),
      );
    }
  }

  Ok(plan)
}

pub fn update_topic_progress(
  conn: &Connection,
  caller: &User,
  tpu: &TopicProgressUpdate,
) -> Result<LearningPlan, sperr::Error> {
  let mut plan = owned_plan(&conn, caller, tpu.plan_id.as_str())?;

  if tpu.topic_index < 0 || tpu.topic_index as usize >= plan.topics.len() {
    return Err(sperr::Error::Validation(format!(
      "Invalid topic index: {}",
      tpu.topic_index
    )));
  }
  plan.topics[tpu.topic_index as usize].completed = tpu.completed;

  let before = plan.status;
  recompute(&mut plan);
  plan.updated_at = now()?;
  save_plan(&conn, &plan)?;

  if before != PlanStatus::Completed && plan.status == PlanStatus::Completed {
    if let Some(srcid) = &plan.source_plan_id {
      notify_completion(&conn, caller, srcid.as_str());
    }
  }

  Ok(plan)
}

fn notify_completion(conn: &Connection, caller: &User, srcid: &str) {
  // the source may be gone by now; that's fine.
  if let Ok(src) = read_plan(&conn, srcid) {
    if src.user_email != caller.email {
      notify(
        &conn,
        src.user_email.as_str(),
        NotificationType::PlanCompleted,
        format!(
          "{} completed your learning plan '{}'",
          caller.display_name(),
          src.title
        )
        .as_str(),
        src.id.as_str(),
        Some(src.id.as_str()),
      );
    }
  }
}

// shared plans the caller owns or is enrolled in.
pub fn shared_plans(conn: &Connection, caller: &User) -> Result<Vec<LearningPlan>, sperr::Error> {
  query_plans(
    &conn,
    "shared = 1 and (owner = ?1 or id in (select plan from planenrollment where user = ?1))",
    caller.email.as_str(),
  )
}

pub fn user_plans(conn: &Connection, caller: &User) -> Result<Vec<LearningPlan>, sperr::Error> {
  query_plans(&conn, "owner = ?1", caller.email.as_str())
}

// owners can read their plans; anyone can read a shared one.
pub fn read_plan_for(
  conn: &Connection,
  caller: &User,
  id: &str,
) -> Result<LearningPlan, sperr::Error> {
  let plan = read_plan(&conn, id)?;
  if plan.user_email == caller.email || plan.shared {
    Ok(plan)
  } else {
    Err(sperr::Error::Unauthorized(
      "Unauthorized: This learning plan is private".to_string(),
    ))
  }
}

pub fn progress_for(
  conn: &Connection,
  caller: &User,
  id: &str,
) -> Result<PlanProgress, sperr::Error> {
  let plan = read_plan_for(&conn, caller, id)?;
  Ok(PlanProgress {
    plan_id: plan.id.clone(),
    progress: plan.progress,
    completed_topics: plan.topics.iter().filter(|t| t.completed).count(),
    total_topics: plan.topics.len(),
    status: plan.status,
  })
}
