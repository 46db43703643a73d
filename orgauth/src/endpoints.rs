use crate::data::{
  ChangePassword, Config, Credential, GoogleClaims, Login, LoginData, ProfileUpdate,
  RegistrationData, User, UserProfile,
};
use crate::dbfun;
use crate::error::Error;
use crate::util::{get_rand_string, hash_password, salt_string};
use log::info;
use rusqlite::Connection;
use uuid::Uuid;

// app-side cleanup that runs before a user record goes away.
pub struct Callbacks {
  pub on_delete_user: Box<dyn FnMut(&Connection, &User) -> Result<(), Error>>,
}

fn required(field: &Option<String>, msg: &str) -> Result<String, Error> {
  match field {
    Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
    _ => Err(Error::Validation(msg.to_string())),
  }
}

fn login_data(conn: &Connection, user: &User) -> Result<LoginData, Error> {
  let token = Uuid::new_v4();
  dbfun::add_token(&conn, user.id.as_str(), token)?;
  Ok(LoginData {
    id: user.id.clone(),
    first_name: user.first_name.clone(),
    last_name: user.last_name.clone(),
    email: user.email.clone(),
    photo_url: user.photo_url.clone(),
    token: token.to_string(),
  })
}

fn check_password(user: &User, pwd: &str, msg: &str) -> Result<(), Error> {
  if hash_password(pwd, user.salt.as_str()) != user.hashwd {
    Err(Error::Validation(msg.to_string()))
  } else {
    Ok(())
  }
}

pub fn signup(conn: &Connection, rd: &RegistrationData) -> Result<UserProfile, Error> {
  let email = required(&rd.email, "Email is required")?;
  if !email.contains('@') {
    return Err(Error::Validation("Invalid email".to_string()));
  }
  let password = match &rd.password {
    Some(p) if !p.is_empty() => p.clone(),
    _ => return Err(Error::Validation("Password is required".to_string())),
  };
  let first_name = required(&rd.first_name, "First name is required")?;
  let last_name = required(&rd.last_name, "Last name is required")?;

  if dbfun::read_user_by_email(&conn, email.as_str())?.is_some() {
    return Err(Error::Conflict("Email already exists".to_string()));
  }

  let salt = salt_string();
  let user = dbfun::new_user(
    &conn,
    email.as_str(),
    hash_password(password.as_str(), salt.as_str()).as_str(),
    salt.as_str(),
    first_name.as_str(),
    last_name.as_str(),
    rd.phone.as_deref(),
    rd.photo_url.as_deref(),
  )?;
  info!("new user: {}", user.email);

  Ok(UserProfile::from(&user))
}

pub fn signin(conn: &Connection, login: &Login) -> Result<LoginData, Error> {
  let (email, pwd) = match (&login.email, &login.password) {
    (Some(e), Some(p)) => (e, p),
    _ => {
      return Err(Error::Validation(
        "Email and password are required".to_string(),
      ))
    }
  };

  // don't distinguish between bad email and bad pwd!
  let user = match dbfun::read_user_by_email(&conn, email.trim())? {
    Some(u) => u,
    None => return Err(Error::Validation("Invalid email or password".to_string())),
  };
  check_password(&user, pwd.as_str(), "Invalid email or password")?;

  info!("logged in, user: {:?}", user.email);
  login_data(&conn, &user)
}

// find-or-create the user for a verified google identity, then log in.
pub fn google_signin(conn: &Connection, claims: &GoogleClaims) -> Result<LoginData, Error> {
  let user = match dbfun::read_user_by_email(&conn, claims.email.as_str())? {
    Some(u) => u,
    None => {
      // no password login for these; a random one nobody knows.
      let salt = salt_string();
      let user = dbfun::new_user(
        &conn,
        claims.email.as_str(),
        hash_password(get_rand_string(32).as_str(), salt.as_str()).as_str(),
        salt.as_str(),
        claims.first_name.as_str(),
        claims.last_name.as_str(),
        None,
        claims.picture.as_deref(),
      )?;
      info!("new google user: {}", user.email);
      user
    }
  };

  login_data(&conn, &user)
}

pub fn logout(conn: &Connection, user: &User, token: Uuid) -> Result<(), Error> {
  dbfun::remove_token(&conn, user.id.as_str(), token)
}

pub fn update_profile(
  conn: &Connection,
  user: &User,
  pu: &ProfileUpdate,
) -> Result<UserProfile, Error> {
  let mut u = user.clone();
  if let Some(first_name) = &pu.first_name {
    u.first_name = required(&Some(first_name.clone()), "First name can't be empty")?;
  }
  if let Some(last_name) = &pu.last_name {
    u.last_name = required(&Some(last_name.clone()), "Last name can't be empty")?;
  }
  if let Some(phone) = &pu.phone {
    u.phone = Some(phone.clone());
  }
  if let Some(photo_url) = &pu.photo_url {
    u.photo_url = Some(photo_url.clone());
  }
  dbfun::update_user(&conn, &u)?;

  Ok(UserProfile::from(&u))
}

pub fn change_password(conn: &Connection, user: &User, cp: &ChangePassword) -> Result<(), Error> {
  let (oldpwd, newpwd) = match (&cp.old_password, &cp.new_password) {
    (Some(o), Some(n)) => (o, n),
    _ => {
      return Err(Error::Validation(
        "Old password and new password are required".to_string(),
      ))
    }
  };
  if newpwd.is_empty() {
    return Err(Error::Validation("Password is required".to_string()));
  }
  check_password(&user, oldpwd.as_str(), "Invalid current password")?;

  let mut u = user.clone();
  u.salt = salt_string();
  u.hashwd = hash_password(newpwd.as_str(), u.salt.as_str());
  dbfun::update_user(&conn, &u)?;
  info!("changed password for {}", u.email);

  Ok(())
}

pub fn delete_account(
  conn: &Connection,
  user: &User,
  credential: &Credential,
  callbacks: &mut Callbacks,
) -> Result<(), Error> {
  match credential {
    Credential::Password(pwd) => check_password(&user, pwd.as_str(), "Invalid password")?,
    Credential::Google(claims) => {
      if claims.email.to_lowercase() != user.email.to_lowercase() {
        return Err(Error::Unauthorized(
          "Google account does not match user".to_string(),
        ));
      }
    }
  }

  // app cleanup and the user row go together or not at all.
  let tx = conn.unchecked_transaction()?;
  let txconn: &Connection = &tx;
  (callbacks.on_delete_user)(txconn, &user)?;
  dbfun::delete_user(txconn, user.id.as_str())?;
  tx.commit()?;
  info!("deleted user {}", user.email);

  Ok(())
}

// token from an 'Authorization: Bearer <token>' header value.
pub fn parse_bearer(header: Option<&str>) -> Result<Uuid, Error> {
  match header.and_then(|h| h.strip_prefix("Bearer ")) {
    Some(t) => Uuid::parse_str(t.trim()).map_err(|_| Error::NotLoggedIn),
    None => Err(Error::NotLoggedIn),
  }
}

pub fn user_for_token(conn: &Connection, config: &Config, token: Uuid) -> Result<User, Error> {
  dbfun::read_user_by_token(&conn, token, config.login_token_expiration_ms)
}
