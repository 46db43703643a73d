#[cfg(test)]
mod tests {
  use crate::comments;
  use crate::notifications;
  use crate::plans;
  use crate::posts;
  use crate::progress::weight_sum;
  use crate::reactions;
  use crate::sqldata::*;
  use crate::templates;
  use orgauth::data::{Credential, User};
  use orgauth::util::{hash_password, salt_string};
  use rusqlite::Connection;
  use spprotocol::constants::{ContentType, NotificationType, PlanStatus, ReactionType, WeightMode};
  use spprotocol::content::{CustomItem, Topic, TopicProgress};
  use spprotocol::messages::{
    CommentUpdate, LearningPlanPatch, SaveComment, SaveLearningPlan, SavePost,
    SaveProgressTemplate, TopicProgressUpdate,
  };
  use std::error::Error;
  use std::fs;
  use std::path::Path;

  fn fresh_db(name: &str) -> Result<Connection, Box<dyn Error>> {
    let dbp = Path::new(name);
    match fs::remove_file(dbp) {
      Ok(_) => (),
      Err(e) => {
        println!("error removing {}: {}", name, e);
      }
    }
    dbinit(dbp, None)?;
    Ok(connection_open(dbp)?)
  }

  fn make_user(conn: &Connection, email: &str, first: &str, last: &str) -> Result<User, Box<dyn Error>> {
    let salt = salt_string();
    Ok(orgauth::dbfun::new_user(
      &conn,
      email,
      hash_password("pwd", salt.as_str()).as_str(),
      salt.as_str(),
      first,
      last,
      None,
      None,
    )?)
  }

  fn topics(n: usize) -> Vec<Topic> {
    (0..n)
      .map(|i| Topic {
        title: format!("topic {}", i),
        resources: "".to_string(),
        completed: false,
      })
      .collect()
  }

  fn plan_req(title: &str, start: &str, end: &str, ntopics: usize, shared: bool) -> SaveLearningPlan {
    SaveLearningPlan {
      title: Some(title.to_string()),
      description: Some("a plan".to_string()),
      start_date: start.parse().ok(),
      end_date: end.parse().ok(),
      topics: topics(ntopics),
      shared,
    }
  }

  fn run(f: fn() -> Result<(), Box<dyn Error>>) {
    let res = match f() {
      Ok(()) => true,
      Err(e) => {
        println!("error {:?}", e);
        false
      }
    };
    assert_eq!(res, true);
  }

  #[test]
  fn test_plans() {
    run(plans_test);
  }

  fn plans_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("plans-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;
    let bob = make_user(&conn, "bob@example.com", "Bob", "Baker")?;

    let plan = plans::create_plan(&conn, &alice, &plan_req("rust", "2024-01-01", "2024-02-01", 4, false))?;
    assert_eq!(plan.progress, 0);
    assert_eq!(plan.status, PlanStatus::Created);

    let p = plans::update_topic_progress(
      &conn,
      &alice,
      &TopicProgressUpdate {
        plan_id: plan.id.clone(),
        topic_index: 0,
        completed: true,
      },
    )?;
    assert_eq!(p.progress, 25);
    assert_eq!(p.status, PlanStatus::InProgress);

    for i in 1..3 {
      plans::update_topic_progress(
        &conn,
        &alice,
        &TopicProgressUpdate {
          plan_id: plan.id.clone(),
          topic_index: i,
          completed: true,
        },
      )?;
    }
    let pp = plans::progress_for(&conn, &alice, plan.id.as_str())?;
    assert_eq!(pp.progress, 75);
    assert_eq!(pp.completed_topics, 3);
    assert_eq!(pp.total_topics, 4);

    // out of range index.
    match plans::update_topic_progress(
      &conn,
      &alice,
      &TopicProgressUpdate {
        plan_id: plan.id.clone(),
        topic_index: 4,
        completed: true,
      },
    ) {
      Err(crate::error::Error::Validation(_)) => (),
      x => return Err(format!("expected validation error, got {:?}", x.map(|p| p.id)).into()),
    }

    // bob can't touch alice's private plan.
    assert!(plans::read_plan_for(&conn, &bob, plan.id.as_str()).is_err());
    match plans::delete_plan(&conn, &bob, plan.id.as_str()) {
      Err(crate::error::Error::Unauthorized(_)) => (),
      _ => return Err("expected unauthorized".into()),
    }

    // abandon, then resume.
    let ab = plans::update_plan(
      &conn,
      &alice,
      plan.id.as_str(),
      &LearningPlanPatch {
        status: Some(PlanStatus::Abandoned),
        ..Default::default()
      },
    )?;
    assert_eq!(ab.status, PlanStatus::Abandoned);
    let re = plans::update_plan(
      &conn,
      &alice,
      plan.id.as_str(),
      &LearningPlanPatch {
        status: Some(PlanStatus::InProgress),
        ..Default::default()
      },
    )?;
    assert_eq!(re.status, PlanStatus::InProgress);

    plans::delete_plan(&conn, &alice, plan.id.as_str())?;
    match plans::read_plan(&conn, plan.id.as_str()) {
      Err(crate::error::Error::NotFound(_)) => (),
      _ => return Err("expected not found".into()),
    }

    Ok(())
  }

  #[test]
  fn test_plan_dates() {
    run(plan_dates_test);
  }

  fn plan_dates_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("plan-dates-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;

    match plans::create_plan(&conn, &alice, &plan_req("backwards", "2024-03-01", "2024-02-01", 2, false)) {
      Err(crate::error::Error::Validation(_)) => (),
      _ => return Err("expected validation error".into()),
    }
    match plans::create_plan(&conn, &alice, &plan_req("no dates", "", "", 2, false)) {
      Err(crate::error::Error::Validation(_)) => (),
      _ => return Err("expected validation error".into()),
    }
    assert_eq!(plans::user_plans(&conn, &alice)?.len(), 0);

    // a bad date patch leaves the stored plan alone.
    let plan = plans::create_plan(&conn, &alice, &plan_req("ok", "2024-01-01", "2024-02-01", 2, false))?;
    assert!(plans::update_plan(
      &conn,
      &alice,
      plan.id.as_str(),
      &LearningPlanPatch {
        start_date: "2024-06-01".parse().ok(),
        ..Default::default()
      },
    )
    .is_err());
    let stored = plans::read_plan(&conn, plan.id.as_str())?;
    assert_eq!(stored.start_date, plan.start_date);

    Ok(())
  }

  #[test]
  fn test_enrollment() {
    run(enrollment_test);
  }

  fn enrollment_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("enrollment-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;
    let bob = make_user(&conn, "bob@example.com", "Bob", "Baker")?;

    let private = plans::create_plan(&conn, &alice, &plan_req("private", "2024-01-01", "2024-02-01", 2, false))?;
    match plans::start_plan(&conn, &bob, private.id.as_str()) {
      Err(crate::error::Error::Conflict(_)) => (),
      _ => return Err("expected conflict".into()),
    }

    let shared = plans::create_plan(&conn, &alice, &plan_req("shared", "2024-01-01", "2024-02-01", 2, true))?;
    let copy1 = plans::start_plan(&conn, &bob, shared.id.as_str())?;
    let copy2 = plans::start_plan(&conn, &bob, shared.id.as_str())?;
    assert_eq!(copy1.id, copy2.id);
    assert_eq!(copy1.user_email, bob.email);
    assert_eq!(copy1.source_plan_id, Some(shared.id.clone()));
    assert_eq!(copy1.shared, false);

    let s = plans::read_plan(&conn, shared.id.as_str())?;
    assert_eq!(s.enrolled_users, vec![bob.email.clone()]);

    // one enrollment notification for alice.
    let an = notifications::user_notifications(&conn, &alice)?;
    assert_eq!(an.len(), 1);
    assert_eq!(an[0].notification_type, NotificationType::PlanEnrollment);

    // bob sees the shared plan he's enrolled in.
    let bs = plans::shared_plans(&conn, &bob)?;
    assert_eq!(bs.len(), 1);
    assert_eq!(bs[0].id, shared.id);

    // finishing the copy tells alice.
    for i in 0..2 {
      plans::update_topic_progress(
        &conn,
        &bob,
        &TopicProgressUpdate {
          plan_id: copy1.id.clone(),
          topic_index: i,
          completed: true,
        },
      )?;
    }
    let done = plans::read_plan(&conn, copy1.id.as_str())?;
    assert_eq!(done.status, PlanStatus::Completed);
    let an = notifications::user_notifications(&conn, &alice)?;
    assert_eq!(an.len(), 2);
    assert_eq!(an[0].notification_type, NotificationType::PlanCompleted);

    Ok(())
  }

  #[test]
  fn test_reactions() {
    run(reactions_test);
  }

  fn reactions_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("reactions-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;
    let bob = make_user(&conn, "bob@example.com", "Bob", "Baker")?;

    let post = posts::create_post(
      &conn,
      &bob,
      &SavePost {
        title: Some("hello".to_string()),
        content: Some("world".to_string()),
      },
    )?;

    let c = reactions::add_reaction(&conn, &alice, ContentType::Post, post.id.as_str(), ReactionType::Like)?;
    assert_eq!(c.likes, 1);
    let bn = notifications::user_notifications(&conn, &bob)?;
    assert_eq!(bn.len(), 1);
    assert_eq!(bn[0].notification_type, NotificationType::PostReaction);
    assert_eq!(bn[0].message, "Alice Able liked your post 'hello'");

    // same again toggles it off.
    let c = reactions::add_reaction(&conn, &alice, ContentType::Post, post.id.as_str(), ReactionType::Like)?;
    assert_eq!(c.likes, 0);
    let bn = notifications::user_notifications(&conn, &bob)?;
    assert_eq!(bn.len(), 2);
    assert_eq!(bn[0].notification_type, NotificationType::ReactionRemoved);
    assert_eq!(
      reactions::user_reaction(&conn, &alice, ContentType::Post, post.id.as_str())?,
      None
    );

    // like, then dislike switches.
    reactions::add_reaction(&conn, &alice, ContentType::Post, post.id.as_str(), ReactionType::Like)?;
    let c = reactions::add_reaction(&conn, &alice, ContentType::Post, post.id.as_str(), ReactionType::Dislike)?;
    assert_eq!(c.likes, 0);
    assert_eq!(c.dislikes, 1);
    let bn = notifications::user_notifications(&conn, &bob)?;
    assert_eq!(bn[0].notification_type, NotificationType::ReactionChanged);
    assert_eq!(
      reactions::user_reaction(&conn, &alice, ContentType::Post, post.id.as_str())?,
      Some(ReactionType::Dislike)
    );

    // reacting to your own content notifies nobody.
    let before = notifications::user_notifications(&conn, &bob)?.len();
    reactions::add_reaction(&conn, &bob, ContentType::Post, post.id.as_str(), ReactionType::Like)?;
    assert_eq!(notifications::user_notifications(&conn, &bob)?.len(), before);
    let c = reactions::reaction_counts(&conn, ContentType::Post, post.id.as_str())?;
    assert_eq!((c.likes, c.dislikes), (1, 1));

    let c = reactions::remove_reaction(&conn, &alice, ContentType::Post, post.id.as_str())?;
    assert_eq!((c.likes, c.dislikes), (1, 0));

    // missing content.
    match reactions::add_reaction(&conn, &alice, ContentType::Course, "nope", ReactionType::Like) {
      Err(crate::error::Error::NotFound(_)) => (),
      _ => return Err("expected not found".into()),
    }

    Ok(())
  }

  fn comment_req(user: &User, postid: &str, text: &str, parent: Option<&str>) -> SaveComment {
    SaveComment {
      post_id: Some(postid.to_string()),
      user_id: Some(user.email.clone()),
      username: Some(user.display_name()),
      text: Some(text.to_string()),
      parent_id: parent.map(|s| s.to_string()),
    }
  }

  #[test]
  fn test_comments() {
    run(comments_test);
  }

  fn comments_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("comments-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;
    let bob = make_user(&conn, "bob@example.com", "Bob", "Baker")?;
    let carol = make_user(&conn, "carol@example.com", "Carol", "Cole")?;

    let plan = plans::create_plan(&conn, &alice, &plan_req("course", "2024-01-01", "2024-02-01", 1, true))?;
    let pid = plan.id.as_str();

    let long = "z".repeat(80);
    let top = comments::create_comment(&conn, &bob, &comment_req(&bob, pid, long.as_str(), None))?;
    let an = notifications::user_notifications(&conn, &alice)?;
    assert_eq!(an.len(), 1);
    assert_eq!(an[0].notification_type, NotificationType::CourseComment);
    assert_eq!(an[0].course_id, Some(plan.id.clone()));
    assert!(an[0].message.ends_with(format!("{}...", "z".repeat(47)).as_str()));

    let reply = comments::create_comment(&conn, &carol, &comment_req(&carol, pid, "me too", Some(top.id.as_str())))?;
    let bn = notifications::user_notifications(&conn, &bob)?;
    assert_eq!(bn.len(), 1);
    assert_eq!(bn[0].notification_type, NotificationType::CommentReply);
    let sibling = comments::create_comment(&conn, &carol, &comment_req(&carol, pid, "another", None))?;

    // wrong username.
    let mut bad = comment_req(&bob, pid, "hi", None);
    bad.username = Some("Somebody Else".to_string());
    match comments::create_comment(&conn, &bob, &bad) {
      Err(crate::error::Error::Validation(_)) => (),
      _ => return Err("expected validation error".into()),
    }
    // missing parent.
    match comments::create_comment(&conn, &bob, &comment_req(&bob, pid, "hi", Some("gone"))) {
      Err(crate::error::Error::NotFound(_)) => (),
      _ => return Err("expected not found".into()),
    }

    let tree = comments::post_comments(&conn, &bob, pid)?;
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].id, top.id);
    assert_eq!(tree[0].replies[0].id, reply.id);

    // only the author edits.
    assert!(comments::update_comment(
      &conn,
      &carol,
      top.id.as_str(),
      &CommentUpdate {
        text: Some("mine now".to_string())
      }
    )
    .is_err());
    let edited = comments::update_comment(
      &conn,
      &bob,
      top.id.as_str(),
      &CommentUpdate {
        text: Some("edited".to_string()),
      },
    )?;
    assert_eq!(edited.text, "edited");

    // hidden comments are visible to the course owner only.
    assert!(comments::toggle_visibility(&conn, &bob, sibling.id.as_str()).is_err());
    let hidden = comments::toggle_visibility(&conn, &alice, sibling.id.as_str())?;
    assert!(hidden.hidden);
    assert_eq!(comments::post_comments(&conn, &bob, pid)?.len(), 1);
    assert_eq!(comments::post_comments(&conn, &alice, pid)?.len(), 2);

    // deleting the parent takes the reply, not the sibling.
    reactions::add_reaction(&conn, &alice, ContentType::Comment, reply.id.as_str(), ReactionType::Like)?;
    comments::delete_comment(&conn, &bob, top.id.as_str())?;
    assert!(comments::read_comment(&conn, reply.id.as_str()).is_err());
    assert!(comments::read_comment(&conn, sibling.id.as_str()).is_ok());
    let c = reactions::reaction_counts(&conn, ContentType::Comment, reply.id.as_str())?;
    assert_eq!(c.likes, 0);

    Ok(())
  }

  #[test]
  fn test_templates() {
    run(templates_test);
  }

  fn templates_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("templates-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;
    let bob = make_user(&conn, "bob@example.com", "Bob", "Baker")?;

    let req = SaveProgressTemplate {
      course_id: Some("course1".to_string()),
      learning_plan_id: None,
      topics: vec![
        TopicProgress {
          topic_id: "t1".to_string(),
          topic_name: "one".to_string(),
          percentage: 0.0,
          current_progress: 100.0,
        },
        TopicProgress {
          topic_id: "t2".to_string(),
          topic_name: "two".to_string(),
          percentage: 0.0,
          current_progress: 0.0,
        },
      ],
      custom_items: Vec::new(),
      weighting: Default::default(),
    };

    let t1 = templates::save_template(&conn, &alice, &req)?;
    assert!((t1.total_progress - 50.0).abs() < 1e-9);

    // same course again updates in place.
    let mut req2 = req.clone();
    req2.custom_items = vec![CustomItem {
      id: "".to_string(),
      name: "project".to_string(),
      topic_id: None,
      percentage: 0.0,
      current_progress: 0.0,
    }];
    let t2 = templates::save_template(&conn, &alice, &req2)?;
    assert_eq!(t1.id, t2.id);
    assert_eq!(t2.custom_items.len(), 1);
    assert!(!t2.custom_items[0].id.is_empty());
    assert_eq!(templates::user_templates(&conn, &alice)?.len(), 1);

    assert!(templates::template_for_course(&conn, &alice, "course1").is_ok());
    match templates::template_for_course(&conn, &bob, "course1") {
      Err(crate::error::Error::NotFound(_)) => (),
      _ => return Err("expected not found".into()),
    }
    assert!(templates::delete_template(&conn, &bob, t1.id.as_str()).is_err());
    templates::delete_template(&conn, &alice, t1.id.as_str())?;
    assert_eq!(templates::user_templates(&conn, &alice)?.len(), 0);

    Ok(())
  }

  fn topic_progress(id: &str) -> TopicProgress {
    TopicProgress {
      topic_id: id.to_string(),
      topic_name: format!("topic {}", id),
      percentage: 0.0,
      current_progress: 0.0,
    }
  }

  #[test]
  fn test_template_topics() {
    run(template_topics_test);
  }

  fn template_topics_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("template-topics-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;

    let item = CustomItem {
      id: "".to_string(),
      name: "project".to_string(),
      topic_id: Some("a".to_string()),
      percentage: 0.0,
      current_progress: 100.0,
    };
    let mut req = SaveProgressTemplate {
      course_id: Some("course1".to_string()),
      learning_plan_id: None,
      topics: vec![topic_progress("a"), topic_progress("a")],
      custom_items: vec![item],
      weighting: WeightMode::TopicTopDown,
    };

    // repeated topic ids would count the same items twice.
    match templates::save_template(&conn, &alice, &req) {
      Err(crate::error::Error::Validation(_)) => (),
      _ => return Err("expected validation error for duplicate topic ids".into()),
    }
    req.topics = vec![topic_progress("a"), topic_progress(" ")];
    match templates::save_template(&conn, &alice, &req) {
      Err(crate::error::Error::Validation(_)) => (),
      _ => return Err("expected validation error for blank topic id".into()),
    }
    assert_eq!(templates::user_templates(&conn, &alice)?.len(), 0);

    req.topics = vec![topic_progress("a"), topic_progress("b")];
    let t = templates::save_template(&conn, &alice, &req)?;
    assert!((weight_sum(&t) - 100.0).abs() < 1e-9);
    assert!((t.total_progress - 50.0).abs() < 1e-9);

    Ok(())
  }

  #[test]
  fn test_notification_failure() {
    run(notification_failure_test);
  }

  fn notification_failure_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("notification-failure-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;
    let bob = make_user(&conn, "bob@example.com", "Bob", "Baker")?;

    let plan = plans::create_plan(&conn, &bob, &plan_req("course", "2024-01-01", "2024-02-01", 2, true))?;
    let post = posts::create_post(
      &conn,
      &bob,
      &SavePost {
        title: Some("hello".to_string()),
        content: Some("world".to_string()),
      },
    )?;

    // every notification write fails from here on.
    conn.execute_batch("drop table notification")?;

    let c = reactions::add_reaction(&conn, &alice, ContentType::Post, post.id.as_str(), ReactionType::Like)?;
    assert_eq!(c.likes, 1);
    let cm = comments::create_comment(&conn, &alice, &comment_req(&alice, plan.id.as_str(), "hi", None))?;
    assert_eq!(comments::read_comment(&conn, cm.id.as_str())?.text, "hi");
    let copy = plans::start_plan(&conn, &alice, plan.id.as_str())?;
    assert_eq!(copy.user_email, alice.email);
    let p = plans::read_plan(&conn, plan.id.as_str())?;
    assert_eq!(p.enrolled_users, vec![alice.email.clone()]);

    Ok(())
  }

  #[test]
  fn test_private_plan() {
    run(private_plan_test);
  }

  fn private_plan_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("private-plan-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;
    let bob = make_user(&conn, "bob@example.com", "Bob", "Baker")?;

    let plan = plans::create_plan(&conn, &alice, &plan_req("diary", "2024-01-01", "2024-02-01", 1, false))?;
    let pid = plan.id.as_str();

    // the owner can use an unshared plan.
    let mine = comments::create_comment(&conn, &alice, &comment_req(&alice, pid, "note to self", None))?;
    assert_eq!(comments::post_comments(&conn, &alice, pid)?.len(), 1);
    let c = reactions::add_reaction(&conn, &alice, ContentType::Course, pid, ReactionType::Like)?;
    assert_eq!(c.likes, 1);

    // nobody else can see or touch it.
    match comments::create_comment(&conn, &bob, &comment_req(&bob, pid, "hello", None)) {
      Err(crate::error::Error::Unauthorized(_)) => (),
      _ => return Err("expected unauthorized comment".into()),
    }
    match comments::post_comments(&conn, &bob, pid) {
      Err(crate::error::Error::Unauthorized(_)) => (),
      _ => return Err("expected unauthorized comment list".into()),
    }
    match comments::read_comment_for(&conn, &bob, mine.id.as_str()) {
      Err(crate::error::Error::Unauthorized(_)) => (),
      _ => return Err("expected unauthorized comment read".into()),
    }
    match reactions::add_reaction(&conn, &bob, ContentType::Course, pid, ReactionType::Like) {
      Err(crate::error::Error::Unauthorized(_)) => (),
      _ => return Err("expected unauthorized reaction".into()),
    }
    let c = reactions::reaction_counts(&conn, ContentType::Course, pid)?;
    assert_eq!(c.likes, 1);

    // sharing opens it up.
    plans::update_plan(
      &conn,
      &alice,
      pid,
      &LearningPlanPatch {
        shared: Some(true),
        ..Default::default()
      },
    )?;
    comments::create_comment(&conn, &bob, &comment_req(&bob, pid, "hello", None))?;
    assert_eq!(comments::post_comments(&conn, &bob, pid)?.len(), 2);

    Ok(())
  }

  #[test]
  fn test_notifications() {
    run(notifications_test);
  }

  fn notifications_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("notifications-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;
    let bob = make_user(&conn, "bob@example.com", "Bob", "Baker")?;

    let n1 = notifications::create_notification(
      &conn,
      alice.email.as_str(),
      NotificationType::PostReaction,
      "one",
      "x",
      None,
    )?;
    notifications::create_notification(
      &conn,
      alice.email.as_str(),
      NotificationType::PostReaction,
      "two",
      "x",
      None,
    )?;
    assert_eq!(notifications::unread_count(&conn, &alice)?.count, 2);

    match notifications::mark_read(&conn, &bob, n1.id.as_str()) {
      Err(crate::error::Error::Unauthorized(_)) => (),
      _ => return Err("expected unauthorized".into()),
    }
    assert!(notifications::mark_read(&conn, &alice, n1.id.as_str())?.read);
    assert_eq!(notifications::unread_notifications(&conn, &alice)?.len(), 1);
    assert_eq!(notifications::mark_all_read(&conn, &alice)?, 1);
    assert_eq!(notifications::unread_count(&conn, &alice)?.count, 0);
    assert_eq!(notifications::user_notifications(&conn, &alice)?.len(), 2);

    Ok(())
  }

  #[test]
  fn test_delete_account() {
    run(delete_account_test);
  }

  fn delete_account_test() -> Result<(), Box<dyn Error>> {
    let conn = fresh_db("delete-account-test.db")?;
    let alice = make_user(&conn, "alice@example.com", "Alice", "Able")?;
    let bob = make_user(&conn, "bob@example.com", "Bob", "Baker")?;

    let plan = plans::create_plan(&conn, &alice, &plan_req("course", "2024-01-01", "2024-02-01", 1, true))?;
    let post = posts::create_post(
      &conn,
      &alice,
      &SavePost {
        title: Some("t".to_string()),
        content: Some("c".to_string()),
      },
    )?;
    let bobs = comments::create_comment(
      &conn,
      &bob,
      &comment_req(&bob, plan.id.as_str(), "nice", None),
    )?;
    reactions::add_reaction(&conn, &alice, ContentType::Comment, bobs.id.as_str(), ReactionType::Like)?;
    reactions::add_reaction(&conn, &bob, ContentType::Post, post.id.as_str(), ReactionType::Like)?;

    let mut cb = studyplan_callbacks();
    assert!(orgauth::endpoints::delete_account(
      &conn,
      &alice,
      &Credential::Password("wrong".to_string()),
      &mut cb
    )
    .is_err());
    orgauth::endpoints::delete_account(
      &conn,
      &alice,
      &Credential::Password("pwd".to_string()),
      &mut cb,
    )?;

    assert!(orgauth::dbfun::read_user_by_email(&conn, "alice@example.com")?.is_none());
    assert!(plans::read_plan(&conn, plan.id.as_str()).is_err());
    assert!(posts::read_post(&conn, post.id.as_str()).is_err());
    assert!(comments::read_comment(&conn, bobs.id.as_str()).is_err());
    let c = reactions::reaction_counts(&conn, ContentType::Post, post.id.as_str())?;
    assert_eq!(c.likes, 0);

    Ok(())
  }
}
