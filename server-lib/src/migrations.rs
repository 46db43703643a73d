use crate::error as sperr;
use barrel::{types, Migration};
use std::path::Path;
use tracing::info;

pub fn initialdb() -> Migration {
  let mut m = Migration::new();

  // table for storing single values.
  m.create_table("singlevalue", |t| {
    t.add_column("name", types::text().nullable(false).unique(true));
    t.add_column("value", types::text().nullable(false));
  });

  m
}

// user and token tables.
pub fn udpate1(dbfile: &Path) -> Result<(), sperr::Error> {
  info!("orgauth tables");
  orgauth::migrations::udpate1(dbfile)?;
  Ok(())
}

pub fn udpate2() -> Migration {
  let mut m = Migration::new();

  m.create_table("learningplan", |t| {
    t.add_column("id", types::text().primary(true).nullable(false));
    t.add_column("owner", types::text().nullable(false));
    t.add_column("title", types::text().nullable(false));
    t.add_column("description", types::text().nullable(false));
    t.add_column("startdate", types::text().nullable(true));
    t.add_column("enddate", types::text().nullable(true));
    // json list of topics.
    t.add_column("topics", types::text().nullable(false));
    t.add_column("progress", types::integer().nullable(false));
    t.add_column("status", types::text().nullable(false));
    t.add_column("shared", types::boolean().nullable(false));
    t.add_column("sourceplan", types::text().nullable(true));
    t.add_column("createdate", types::integer().nullable(false));
    t.add_column("changeddate", types::integer().nullable(false));
    t.add_index("learningplanowner", types::index(vec!["owner"]));
  });

  m.create_table("planenrollment", |t| {
    t.add_column(
      "plan",
      types::custom("text references learningplan(id)").nullable(false),
    );
    t.add_column("user", types::text().nullable(false));
    t.add_column("createdate", types::integer().nullable(false));
    t.add_index(
      "planenrollmentunq",
      types::index(vec!["plan", "user"]).unique(true),
    );
  });

  m.create_table("progresstemplate", |t| {
    t.add_column("id", types::text().primary(true).nullable(false));
    t.add_column("owner", types::text().nullable(false));
    t.add_column("courseid", types::text().nullable(false));
    t.add_column("learningplanid", types::text().nullable(true));
    // json lists.
    t.add_column("topics", types::text().nullable(false));
    t.add_column("customitems", types::text().nullable(false));
    t.add_column("weighting", types::text().nullable(false));
    t.add_column("totalprogress", types::double().nullable(false));
    t.add_column("active", types::boolean().nullable(false));
    t.add_column("createdate", types::integer().nullable(false));
    t.add_column("changeddate", types::integer().nullable(false));
    t.add_index(
      "progresstemplateunq",
      types::index(vec!["owner", "courseid"]).unique(true),
    );
  });

  m.create_table("post", |t| {
    t.add_column("id", types::text().primary(true).nullable(false));
    t.add_column("owner", types::text().nullable(false));
    t.add_column("title", types::text().nullable(false));
    t.add_column("content", types::text().nullable(false));
    t.add_column("createdate", types::integer().nullable(false));
    t.add_column("changeddate", types::integer().nullable(false));
  });

  m.create_table("comment", |t| {
    t.add_column("id", types::text().primary(true).nullable(false));
    // learning plan or post.
    t.add_column("postid", types::text().nullable(false));
    t.add_column("owner", types::text().nullable(false));
    t.add_column("username", types::text().nullable(false));
    t.add_column("body", types::text().nullable(false));
    t.add_column("parentid", types::text().nullable(true));
    t.add_column("hidden", types::boolean().nullable(false));
    t.add_column("createdate", types::integer().nullable(false));
    t.add_column("changeddate", types::integer().nullable(false));
    t.add_index("commentpost", types::index(vec!["postid"]));
  });

  m.create_table("reaction", |t| {
    t.add_column("id", types::text().primary(true).nullable(false));
    t.add_column("owner", types::text().nullable(false));
    t.add_column("contentid", types::text().nullable(false));
    t.add_column("contenttype", types::text().nullable(false));
    t.add_column("reactiontype", types::text().nullable(false));
    t.add_column("createdate", types::integer().nullable(false));
    t.add_index(
      "reactionunq",
      types::index(vec!["owner", "contentid", "contenttype"]).unique(true),
    );
  });

  m.create_table("notification", |t| {
    t.add_column("id", types::text().primary(true).nullable(false));
    t.add_column("recipient", types::text().nullable(false));
    t.add_column("ntype", types::text().nullable(false));
    t.add_column("message", types::text().nullable(false));
    t.add_column("relatedid", types::text().nullable(false));
    t.add_column("courseid", types::text().nullable(true));
    t.add_column("isread", types::boolean().nullable(false));
    t.add_column("createdate", types::integer().nullable(false));
    t.add_index("notificationrecipient", types::index(vec!["recipient"]));
  });

  m
}
