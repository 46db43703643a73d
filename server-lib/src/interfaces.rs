use crate::comments;
use crate::error as sperr;
use crate::notifications;
use crate::plans;
use crate::posts;
use crate::reactions;
use crate::sqldata;
use crate::state::State;
use crate::templates;
use actix_web::http::header;
use actix_web::{error as awe, web, HttpRequest, HttpResponse};
use log::info;
use orgauth::data::{
  ChangePassword, Credential, DeleteAccount, GoogleLogin, Login, ProfileUpdate, RegistrationData,
  User, UserProfile,
};
use rusqlite::Connection;
use spprotocol::constants::ContentType;
use spprotocol::content::{MarkedRead, UserReaction};
use spprotocol::messages::{
  CommentUpdate, EmailQuery, LearningPlanPatch, PostPatch, ReactionQuery, SaveComment,
  SaveLearningPlan, SavePost, SaveProgressTemplate, StartPlan, TopicProgressUpdate,
};
use spprotocol::MessageReply;
use std::str::FromStr;
use uuid::Uuid;

type HandlerResult = Result<HttpResponse, sperr::Error>;

fn open(state: &State) -> Result<Connection, sperr::Error> {
  sqldata::connection_open(state.config.orgauth_config.db.as_path())
}

fn bearer_token(req: &HttpRequest) -> Result<Uuid, sperr::Error> {
  let header = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|h| h.to_str().ok());
  Ok(orgauth::endpoints::parse_bearer(header)?)
}

pub fn request_user(
  conn: &Connection,
  state: &State,
  req: &HttpRequest,
) -> Result<User, sperr::Error> {
  let token = bearer_token(req)?;
  Ok(orgauth::endpoints::user_for_token(
    &conn,
    &state.config.orgauth_config,
    token,
  )?)
}

// identity comes from the token; a client supplied email can only agree with it.
fn check_email(user: &User, eq: &EmailQuery) -> Result<(), sperr::Error> {
  match &eq.email {
    Some(e) if e.to_lowercase() != user.email.to_lowercase() => Err(sperr::Error::Unauthorized(
      "Unauthorized: email does not match the logged in user".to_string(),
    )),
    _ => Ok(()),
  }
}

fn check_user_id(user: &User, userid: &str) -> Result<(), sperr::Error> {
  if userid == user.id || userid.to_lowercase() == user.email.to_lowercase() {
    Ok(())
  } else {
    Err(sperr::Error::Unauthorized(
      "Unauthorized: You can only access your own progress templates".to_string(),
    ))
  }
}

fn message(s: &str) -> HttpResponse {
  HttpResponse::Ok().json(MessageReply {
    message: s.to_string(),
  })
}

// ------------------------------------------------------------
// auth

async fn signup(state: web::Data<State>, rd: web::Json<RegistrationData>) -> HandlerResult {
  let conn = open(&state)?;
  let profile = orgauth::endpoints::signup(&conn, &rd)?;
  Ok(HttpResponse::Created().json(profile))
}

async fn signin(state: web::Data<State>, login: web::Json<Login>) -> HandlerResult {
  let conn = open(&state)?;
  Ok(HttpResponse::Ok().json(orgauth::endpoints::signin(&conn, &login)?))
}

async fn google_signin(state: web::Data<State>, gl: web::Json<GoogleLogin>) -> HandlerResult {
  let id_token = match &gl.id_token {
    Some(t) if !t.is_empty() => t.clone(),
    _ => return Err(sperr::Error::Validation("ID token is required".to_string())),
  };
  // verify before touching the db; the connection isn't held across the await.
  let claims =
    orgauth::google::verify_id_token(&state.config.orgauth_config, id_token.as_str()).await?;
  let conn = open(&state)?;
  Ok(HttpResponse::Ok().json(orgauth::endpoints::google_signin(&conn, &claims)?))
}

async fn logout(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  let token = bearer_token(&req)?;
  let user = orgauth::endpoints::user_for_token(&conn, &state.config.orgauth_config, token)?;
  orgauth::endpoints::logout(&conn, &user, token)?;
  Ok(message("Logged out"))
}

async fn get_profile(
  state: web::Data<State>,
  req: HttpRequest,
  eq: web::Query<EmailQuery>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  check_email(&user, &eq)?;
  Ok(HttpResponse::Ok().json(UserProfile::from(&user)))
}

async fn update_profile(
  state: web::Data<State>,
  req: HttpRequest,
  eq: web::Query<EmailQuery>,
  pu: web::Json<ProfileUpdate>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  check_email(&user, &eq)?;
  Ok(HttpResponse::Ok().json(orgauth::endpoints::update_profile(&conn, &user, &pu)?))
}

async fn change_password(
  state: web::Data<State>,
  req: HttpRequest,
  eq: web::Query<EmailQuery>,
  cp: web::Json<ChangePassword>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  check_email(&user, &eq)?;
  orgauth::endpoints::change_password(&conn, &user, &cp)?;
  Ok(message("Password changed successfully"))
}

async fn delete_profile(
  state: web::Data<State>,
  req: HttpRequest,
  eq: web::Query<EmailQuery>,
  da: web::Json<DeleteAccount>,
) -> HandlerResult {
  let credential = match (&da.password, &da.id_token) {
    (Some(p), _) if !p.is_empty() => Credential::Password(p.clone()),
    (_, Some(t)) if !t.is_empty() => Credential::Google(
      orgauth::google::verify_id_token(&state.config.orgauth_config, t.as_str()).await?,
    ),
    _ => {
      return Err(sperr::Error::Validation(
        "Password is required".to_string(),
      ))
    }
  };
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  check_email(&user, &eq)?;
  let mut cb = sqldata::studyplan_callbacks();
  orgauth::endpoints::delete_account(&conn, &user, &credential, &mut cb)?;
  Ok(message("Account deleted successfully"))
}

// ------------------------------------------------------------
// learning plans

async fn create_plan(
  state: web::Data<State>,
  req: HttpRequest,
  sp: web::Json<SaveLearningPlan>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Created().json(plans::create_plan(&conn, &user, &sp)?))
}

async fn user_plans(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(plans::user_plans(&conn, &user)?))
}

async fn update_plan_body(
  state: web::Data<State>,
  req: HttpRequest,
  patch: web::Json<LearningPlanPatch>,
) -> HandlerResult {
  let id = match &patch.id {
    Some(id) if !id.is_empty() => id.clone(),
    _ => {
      return Err(sperr::Error::Validation(
        "Learning plan id is required".to_string(),
      ))
    }
  };
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(plans::update_plan(&conn, &user, id.as_str(), &patch)?))
}

async fn get_plan(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(plans::read_plan_for(&conn, &user, path.as_str())?))
}

async fn update_plan(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
  patch: web::Json<LearningPlanPatch>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  if let Some(bodyid) = &patch.id {
    if bodyid != path.as_str() {
      return Err(sperr::Error::Validation(
        "Learning plan id does not match".to_string(),
      ));
    }
  }
  Ok(HttpResponse::Ok().json(plans::update_plan(&conn, &user, path.as_str(), &patch)?))
}

async fn delete_plan(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  plans::delete_plan(&conn, &user, path.as_str())?;
  Ok(message("Learning plan deleted successfully"))
}

async fn start_plan(
  state: web::Data<State>,
  req: HttpRequest,
  sp: web::Json<StartPlan>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(plans::start_plan(&conn, &user, sp.plan_id.as_str())?))
}

async fn topic_progress(
  state: web::Data<State>,
  req: HttpRequest,
  tpu: web::Json<TopicProgressUpdate>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(plans::update_topic_progress(&conn, &user, &tpu)?))
}

async fn plan_progress(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(plans::progress_for(&conn, &user, path.as_str())?))
}

async fn shared_plans(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(plans::shared_plans(&conn, &user)?))
}

// ------------------------------------------------------------
// progress templates

async fn save_template(
  state: web::Data<State>,
  req: HttpRequest,
  st: web::Json<SaveProgressTemplate>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(templates::save_template(&conn, &user, &st)?))
}

async fn user_templates(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(templates::user_templates(&conn, &user)?))
}

async fn update_template(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
  st: web::Json<SaveProgressTemplate>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(templates::update_template(
    &conn,
    &user,
    path.as_str(),
    &st,
  )?))
}

async fn delete_template(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  templates::delete_template(&conn, &user, path.as_str())?;
  Ok(message("Progress template deleted successfully"))
}

async fn templates_for_user(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  check_user_id(&user, path.as_str())?;
  Ok(HttpResponse::Ok().json(templates::user_templates(&conn, &user)?))
}

async fn template_for_course(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<(String, String)>,
) -> HandlerResult {
  let (userid, courseid) = path.into_inner();
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  check_user_id(&user, userid.as_str())?;
  Ok(HttpResponse::Ok().json(templates::template_for_course(
    &conn,
    &user,
    courseid.as_str(),
  )?))
}

// ------------------------------------------------------------
// posts

async fn create_post(
  state: web::Data<State>,
  req: HttpRequest,
  sp: web::Json<SavePost>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Created().json(posts::create_post(&conn, &user, &sp)?))
}

async fn all_posts(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(posts::all_posts(&conn)?))
}

async fn user_posts(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(posts::user_posts(&conn, &user)?))
}

async fn get_post(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(posts::read_post(&conn, path.as_str())?))
}

async fn update_post(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
  pp: web::Json<PostPatch>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(posts::update_post(&conn, &user, path.as_str(), &pp)?))
}

async fn delete_post(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  posts::delete_post(&conn, &user, path.as_str())?;
  Ok(message("Post deleted successfully"))
}

// ------------------------------------------------------------
// comments

async fn create_comment(
  state: web::Data<State>,
  req: HttpRequest,
  sc: web::Json<SaveComment>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Created().json(comments::create_comment(&conn, &user, &sc)?))
}

async fn get_comment(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(comments::read_comment_for(&conn, &user, path.as_str())?))
}

async fn update_comment(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
  cu: web::Json<CommentUpdate>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(comments::update_comment(&conn, &user, path.as_str(), &cu)?))
}

async fn delete_comment(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  comments::delete_comment(&conn, &user, path.as_str())?;
  Ok(message("Comment deleted successfully"))
}

async fn post_comments(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(comments::post_comments(&conn, &user, path.as_str())?))
}

async fn comment_visibility(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(comments::toggle_visibility(&conn, &user, path.as_str())?))
}

// ------------------------------------------------------------
// reactions

fn content_path(path: web::Path<(String, String)>) -> Result<(ContentType, String), sperr::Error> {
  let (ct, id) = path.into_inner();
  Ok((ContentType::from_str(ct.as_str())?, id))
}

async fn add_reaction(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<(String, String)>,
  rq: web::Query<ReactionQuery>,
) -> HandlerResult {
  let (ct, id) = content_path(path)?;
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(reactions::add_reaction(
    &conn,
    &user,
    ct,
    id.as_str(),
    rq.reaction_type,
  )?))
}

async fn reaction_counts(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<(String, String)>,
) -> HandlerResult {
  let (ct, id) = content_path(path)?;
  let conn = open(&state)?;
  request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(reactions::reaction_counts(&conn, ct, id.as_str())?))
}

async fn remove_reaction(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<(String, String)>,
) -> HandlerResult {
  let (ct, id) = content_path(path)?;
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(reactions::remove_reaction(&conn, &user, ct, id.as_str())?))
}

async fn user_reaction(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<(String, String)>,
) -> HandlerResult {
  let (ct, id) = content_path(path)?;
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(UserReaction {
    reaction_type: reactions::user_reaction(&conn, &user, ct, id.as_str())?,
  }))
}

// ------------------------------------------------------------
// notifications

async fn user_notifications(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(notifications::user_notifications(&conn, &user)?))
}

async fn unread_notifications(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(notifications::unread_notifications(&conn, &user)?))
}

async fn unread_count(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(notifications::unread_count(&conn, &user)?))
}

async fn mark_read(
  state: web::Data<State>,
  req: HttpRequest,
  path: web::Path<String>,
) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  Ok(HttpResponse::Ok().json(notifications::mark_read(&conn, &user, path.as_str())?))
}

async fn mark_all_read(state: web::Data<State>, req: HttpRequest) -> HandlerResult {
  let conn = open(&state)?;
  let user = request_user(&conn, &state, &req)?;
  let count = notifications::mark_all_read(&conn, &user)?;
  info!("marked {} notifications read for {}", count, user.email);
  Ok(HttpResponse::Ok().json(MarkedRead {
    count: count as i64,
  }))
}

// ------------------------------------------------------------

fn json_error(err: awe::JsonPayloadError, _req: &HttpRequest) -> awe::Error {
  sperr::Error::Validation(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: awe::QueryPayloadError, _req: &HttpRequest) -> awe::Error {
  sperr::Error::Validation(format!("Invalid query: {}", err)).into()
}

// literal segments are registered before the {id} routes they would otherwise match.
pub fn configure(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error))
    .app_data(web::QueryConfig::default().error_handler(query_error))
    .service(web::resource("/api/auth/signup").route(web::post().to(signup)))
    .service(web::resource("/api/auth/signin").route(web::post().to(signin)))
    .service(web::resource("/api/auth/google").route(web::post().to(google_signin)))
    .service(web::resource("/api/auth/logout").route(web::post().to(logout)))
    .service(
      web::resource("/api/auth/profile")
        .route(web::get().to(get_profile))
        .route(web::put().to(update_profile))
        .route(web::delete().to(delete_profile)),
    )
    .service(web::resource("/api/auth/change-password").route(web::put().to(change_password)))
    .service(
      web::resource("/api/learning-plan")
        .route(web::post().to(create_plan))
        .route(web::get().to(user_plans))
        .route(web::put().to(update_plan_body)),
    )
    .service(web::resource("/api/learning-plan/shared").route(web::get().to(shared_plans)))
    .service(web::resource("/api/learning-plan/start").route(web::post().to(start_plan)))
    .service(
      web::resource("/api/learning-plan/progress/topic").route(web::put().to(topic_progress)),
    )
    .service(
      web::resource("/api/learning-plan/{id}/progress").route(web::get().to(plan_progress)),
    )
    .service(
      web::resource("/api/learning-plan/{id}")
        .route(web::get().to(get_plan))
        .route(web::put().to(update_plan))
        .route(web::delete().to(delete_plan)),
    )
    .service(
      web::resource("/api/progress-templates")
        .route(web::post().to(save_template))
        .route(web::get().to(user_templates)),
    )
    .service(
      web::resource("/api/progress-templates/user/{userId}/course/{courseId}")
        .route(web::get().to(template_for_course)),
    )
    .service(
      web::resource("/api/progress-templates/user/{userId}")
        .route(web::get().to(templates_for_user)),
    )
    .service(
      web::resource("/api/progress-templates/{id}")
        .route(web::put().to(update_template))
        .route(web::delete().to(delete_template)),
    )
    .service(
      web::resource("/api/posts")
        .route(web::post().to(create_post))
        .route(web::get().to(all_posts)),
    )
    .service(web::resource("/api/posts/user").route(web::get().to(user_posts)))
    .service(
      web::resource("/api/posts/{id}")
        .route(web::get().to(get_post))
        .route(web::put().to(update_post))
        .route(web::delete().to(delete_post)),
    )
    .service(web::resource("/api/comments").route(web::post().to(create_comment)))
    .service(web::resource("/api/comments/post/{postId}").route(web::get().to(post_comments)))
    .service(
      web::resource("/api/comments/{id}/visibility").route(web::put().to(comment_visibility)),
    )
    .service(
      web::resource("/api/comments/{id}")
        .route(web::get().to(get_comment))
        .route(web::put().to(update_comment))
        .route(web::delete().to(delete_comment)),
    )
    .service(
      web::resource("/api/reactions/user/{contentType}/{contentId}")
        .route(web::get().to(user_reaction)),
    )
    .service(
      web::resource("/api/reactions/{contentType}/{contentId}")
        .route(web::post().to(add_reaction))
        .route(web::get().to(reaction_counts))
        .route(web::delete().to(remove_reaction)),
    )
    .service(
      web::resource("/api/notifications/user/unread/count").route(web::get().to(unread_count)),
    )
    .service(
      web::resource("/api/notifications/user/unread").route(web::get().to(unread_notifications)),
    )
    .service(
      web::resource("/api/notifications/user/read-all").route(web::put().to(mark_all_read)),
    )
    .service(web::resource("/api/notifications/user").route(web::get().to(user_notifications)))
    .service(web::resource("/api/notifications/{id}/read").route(web::put().to(mark_read)));
}
