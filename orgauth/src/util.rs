use crate::error::Error;
use rand;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::convert::TryInto;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

pub fn load_string(file_name: &str) -> Result<String, Box<dyn std::error::Error>> {
  let path = &Path::new(&file_name);
  let mut inf = File::open(path)?;
  let mut result = String::new();
  inf.read_to_string(&mut result)?;
  Ok(result)
}

pub fn write_string(file_name: &str, text: &str) -> Result<usize, Box<dyn std::error::Error>> {
  let path = &Path::new(&file_name);
  let mut outf = File::create(path)?;
  Ok(outf.write(text.as_bytes())?)
}

pub fn salt_string() -> String {
  get_rand_string(10)
}

pub fn get_rand_string(len: usize) -> String {
  let mut rng = rand::thread_rng();
  let mut rstr = String::with_capacity(len);

  for _ in 0..len {
    let c: char = rng.sample(Alphanumeric);
    rstr.push(c);
  }

  rstr
}

pub fn hash_password(pwd: &str, salt: &str) -> String {
  sha256::digest(format!("{}{}", pwd, salt).as_str())
}

// milliseconds since the epoch.
pub fn now() -> Result<i64, Error> {
  let nowms = SystemTime::now()
    .duration_since(SystemTime::UNIX_EPOCH)
    .map(|n| n.as_millis())?;
  let s: i64 = nowms
    .try_into()
    .map_err(|e: std::num::TryFromIntError| Error::String(e.to_string()))?;
  Ok(s)
}

pub fn is_token_expired(token_expiration_ms: i64, tokendate: i64) -> bool {
  match now() {
    Ok(now) => now < tokendate || (now - tokendate) > token_expiration_ms,
    _ => true,
  }
}
